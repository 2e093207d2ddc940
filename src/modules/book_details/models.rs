use catalog_db::BookCopy;
use serde::{Deserialize, Serialize};

/// Query string of the details route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDetailsQuery {
    pub id: Option<String>,
}

impl BookDetailsQuery {
    /// Build from raw query pairs. A repeated `id` keeps its first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let id = pairs
            .into_iter()
            .find_map(|(key, value)| (key == "id").then_some(value));
        Self { id }
    }
}

/// Title, author display name and every copy of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetailsResponse {
    pub title: String,
    pub author: String,
    pub copies: Vec<BookCopy>,
}
