//! Persistence seam for the catalog routes.
//!
//! Route handlers only see [`BookStore`]. [`MemoryStore`] is the in-process
//! backend used by the service binary and by tests; a database-backed store
//! implements the same trait.

pub mod error;
pub mod memory;
pub mod models;

use async_trait::async_trait;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use models::{Author, Book, BookCopy, BookRecord, CopyStatus, Genre};

pub type StoreResult<T> = Result<T, StoreError>;

/// Book and copy lookups plus book creation against existing authors and genres.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Fetch a book with its author resolved. `Ok(None)` when no book has this id.
    async fn get_book(&self, id: &str) -> StoreResult<Option<Book>>;

    /// Fetch every physical copy of the book, in catalog order.
    async fn get_book_details(&self, id: &str) -> StoreResult<Vec<BookCopy>>;

    /// Create a book for an author and a genre that must already exist.
    ///
    /// The author is resolved by family and first name, the genre by name.
    async fn save_book_of_existing_author_and_genre(
        &self,
        family_name: &str,
        first_name: &str,
        genre_name: &str,
        title: &str,
    ) -> StoreResult<BookRecord>;
}
