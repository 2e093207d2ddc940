//! Scripted `BookStore` for route tests.

use std::sync::Mutex;

use async_trait::async_trait;
use catalog_db::{Author, Book, BookCopy, BookRecord, BookStore, StoreError, StoreResult};
use tokio::sync::Barrier;

/// Store whose answers are fixed up front. Every call is recorded.
#[derive(Default)]
pub(crate) struct ScriptedStore {
    pub book: Option<Book>,
    pub copies: Vec<BookCopy>,
    pub book_error: Option<fn() -> StoreError>,
    pub copies_error: Option<fn() -> StoreError>,
    pub save_error: Option<fn() -> StoreError>,
    /// When set, both lookups wait on it, so they only finish if issued together.
    pub rendezvous: Option<Barrier>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub fn with_book(book: Book, copies: Vec<BookCopy>) -> Self {
        Self {
            book: Some(book),
            copies,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn meet(&self) {
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
    }
}

pub(crate) fn sample_book() -> Book {
    Book {
        id: "6a2f41a3-c54c-4bd1-8e0e-2b1d3d8a6f70".parse().unwrap(),
        title: "A Wizard of Earthsea".to_string(),
        author: Author {
            id: "0b0c9f54-3f3e-4c8a-9d7e-51cb1f1c2a11".parse().unwrap(),
            first_name: "Ursula".to_string(),
            family_name: "Le Guin".to_string(),
        },
        genre: Vec::new(),
    }
}

#[async_trait]
impl BookStore for ScriptedStore {
    async fn get_book(&self, id: &str) -> StoreResult<Option<Book>> {
        self.record(format!("get_book({id})"));
        self.meet().await;
        match self.book_error {
            Some(error) => Err(error()),
            None => Ok(self.book.clone()),
        }
    }

    async fn get_book_details(&self, id: &str) -> StoreResult<Vec<BookCopy>> {
        self.record(format!("get_book_details({id})"));
        self.meet().await;
        match self.copies_error {
            Some(error) => Err(error()),
            None => Ok(self.copies.clone()),
        }
    }

    async fn save_book_of_existing_author_and_genre(
        &self,
        family_name: &str,
        first_name: &str,
        genre_name: &str,
        title: &str,
    ) -> StoreResult<BookRecord> {
        self.record(format!(
            "save({family_name}|{first_name}|{genre_name}|{title})"
        ));
        if let Some(error) = self.save_error {
            return Err(error());
        }
        Ok(BookRecord {
            id: "9d8c1e0f-7b6a-4e5d-8c3b-2a1f0e9d8c7b".parse().unwrap(),
            title: title.to_string(),
            author: sample_book().author.id,
            genre: Vec::new(),
        })
    }
}
