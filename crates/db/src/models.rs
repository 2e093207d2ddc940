use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
}

impl Author {
    /// Display name, `"<family name>, <first name>"`.
    pub fn name(&self) -> String {
        format!("{}, {}", self.family_name, self.first_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

/// A book as stored: author and genres by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: Uuid,
    pub title: String,
    pub author: Uuid,
    pub genre: Vec<Uuid>,
}

/// A book with its author and genres resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: Author,
    pub genre: Vec<Genre>,
}

/// Lending state of one physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyStatus {
    Available,
    Maintenance,
    Loaned,
    Reserved,
}

/// One physical copy (book instance) of a catalog title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopy {
    pub id: Uuid,
    pub book: Uuid,
    pub imprint: String,
    pub status: CopyStatus,
    pub due_back: Option<Date>,
}
