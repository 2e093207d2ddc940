use async_trait::async_trait;
use parking_lot::RwLock;
use time::macros::date;
use time::Date;
use uuid::Uuid;

use crate::models::{Author, Book, BookCopy, BookRecord, CopyStatus, Genre};
use crate::{BookStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Catalog {
    authors: Vec<Author>,
    genres: Vec<Genre>,
    books: Vec<BookRecord>,
    copies: Vec<BookCopy>,
}

impl Catalog {
    fn resolve(&self, record: &BookRecord) -> StoreResult<Book> {
        let author = self
            .authors
            .iter()
            .find(|author| author.id == record.author)
            .cloned()
            .ok_or_else(|| {
                StoreError::Storage(format!(
                    "book {} references missing author {}",
                    record.id, record.author
                ))
            })?;

        let genre = self
            .genres
            .iter()
            .filter(|genre| record.genre.contains(&genre.id))
            .cloned()
            .collect();

        Ok(Book {
            id: record.id,
            title: record.title.clone(),
            author,
            genre,
        })
    }
}

/// Process-local catalog guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small catalog with two authors, two genres, two books and their copies.
    pub fn demo() -> Self {
        let store = Self::new();

        let le_guin = store.insert_author("Ursula", "Le Guin");
        let rothfuss = store.insert_author("Patrick", "Rothfuss");
        let fantasy = store.insert_genre("Fantasy");
        let science_fiction = store.insert_genre("Science Fiction");

        let earthsea = store.insert_book("A Wizard of Earthsea", le_guin.id, &[fantasy.id]);
        let dispossessed = store.insert_book("The Dispossessed", le_guin.id, &[science_fiction.id]);
        let wind = store.insert_book("The Name of the Wind", rothfuss.id, &[fantasy.id]);

        store.insert_copy(earthsea.id, "Parnassus Press, 1968", CopyStatus::Available, None);
        store.insert_copy(
            earthsea.id,
            "Puffin, 1971",
            CopyStatus::Loaned,
            Some(date!(2026 - 11 - 02)),
        );
        store.insert_copy(dispossessed.id, "Harper & Row, 1974", CopyStatus::Maintenance, None);
        store.insert_copy(wind.id, "DAW Books, 2007", CopyStatus::Reserved, None);

        tracing::debug!(books = 3, copies = 4, "seeded demo catalog");
        store
    }

    pub fn insert_author(&self, first_name: &str, family_name: &str) -> Author {
        let author = Author {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            family_name: family_name.to_string(),
        };
        self.catalog.write().authors.push(author.clone());
        author
    }

    pub fn insert_genre(&self, name: &str) -> Genre {
        let genre = Genre {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.catalog.write().genres.push(genre.clone());
        genre
    }

    pub fn insert_book(&self, title: &str, author: Uuid, genre: &[Uuid]) -> BookRecord {
        let record = BookRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author,
            genre: genre.to_vec(),
        };
        self.catalog.write().books.push(record.clone());
        record
    }

    pub fn insert_copy(
        &self,
        book: Uuid,
        imprint: &str,
        status: CopyStatus,
        due_back: Option<Date>,
    ) -> BookCopy {
        let copy = BookCopy {
            id: Uuid::new_v4(),
            book,
            imprint: imprint.to_string(),
            status,
            due_back,
        };
        self.catalog.write().copies.push(copy.clone());
        copy
    }

    pub fn book_count(&self) -> usize {
        self.catalog.read().books.len()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn get_book(&self, id: &str) -> StoreResult<Option<Book>> {
        // An id that is not a UUID cannot name any stored book.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let catalog = self.catalog.read();
        catalog
            .books
            .iter()
            .find(|record| record.id == id)
            .map(|record| catalog.resolve(record))
            .transpose()
    }

    async fn get_book_details(&self, id: &str) -> StoreResult<Vec<BookCopy>> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(Vec::new());
        };

        Ok(self
            .catalog
            .read()
            .copies
            .iter()
            .filter(|copy| copy.book == id)
            .cloned()
            .collect())
    }

    async fn save_book_of_existing_author_and_genre(
        &self,
        family_name: &str,
        first_name: &str,
        genre_name: &str,
        title: &str,
    ) -> StoreResult<BookRecord> {
        let mut catalog = self.catalog.write();

        let author = catalog
            .authors
            .iter()
            .find(|author| author.family_name == family_name && author.first_name == first_name)
            .map(|author| author.id)
            .ok_or_else(|| StoreError::AuthorNotFound {
                family_name: family_name.to_string(),
                first_name: first_name.to_string(),
            })?;

        let genre = catalog
            .genres
            .iter()
            .find(|genre| genre.name == genre_name)
            .map(|genre| genre.id)
            .ok_or_else(|| StoreError::GenreNotFound {
                name: genre_name.to_string(),
            })?;

        let record = BookRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author,
            genre: vec![genre],
        };
        catalog.books.push(record.clone());

        tracing::debug!(book_id = %record.id, "book saved");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_book_resolves_author_and_genres() {
        let store = MemoryStore::new();
        let author = store.insert_author("Ursula", "Le Guin");
        let genre = store.insert_genre("Fantasy");
        let record = store.insert_book("Tehanu", author.id, &[genre.id]);

        let book = store
            .get_book(&record.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(book.title, "Tehanu");
        assert_eq!(book.author, author);
        assert_eq!(book.genre, vec![genre]);
    }

    #[tokio::test]
    async fn unknown_or_malformed_ids_find_nothing() {
        let store = MemoryStore::demo();
        assert!(store
            .get_book(&Uuid::new_v4().to_string())
            .await
            .unwrap()
            .is_none());
        assert!(store.get_book("<script>").await.unwrap().is_none());
        assert!(store.get_book("").await.unwrap().is_none());
        assert!(store.get_book_details("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn copies_come_back_in_insertion_order() {
        let store = MemoryStore::new();
        let author = store.insert_author("Patrick", "Rothfuss");
        let book = store.insert_book("The Wise Man's Fear", author.id, &[]);
        let other = store.insert_book("The Slow Regard of Silent Things", author.id, &[]);

        let first = store.insert_copy(book.id, "DAW, 2011", CopyStatus::Available, None);
        store.insert_copy(other.id, "DAW, 2014", CopyStatus::Available, None);
        let second = store.insert_copy(
            book.id,
            "Gollancz, 2011",
            CopyStatus::Loaned,
            Some(date!(2026 - 12 - 01)),
        );

        let copies = store.get_book_details(&book.id.to_string()).await.unwrap();
        assert_eq!(copies, vec![first, second]);
    }

    #[tokio::test]
    async fn save_links_existing_author_and_genre() {
        let store = MemoryStore::new();
        let author = store.insert_author("Ursula", "Le Guin");
        let genre = store.insert_genre("Fantasy");

        let saved = store
            .save_book_of_existing_author_and_genre("Le Guin", "Ursula", "Fantasy", "The Farthest Shore")
            .await
            .unwrap();

        assert_eq!(saved.title, "The Farthest Shore");
        assert_eq!(saved.author, author.id);
        assert_eq!(saved.genre, vec![genre.id]);
        assert_eq!(store.book_count(), 1);
    }

    #[tokio::test]
    async fn save_twice_creates_two_books() {
        let store = MemoryStore::new();
        store.insert_author("Ursula", "Le Guin");
        store.insert_genre("Fantasy");

        let first = store
            .save_book_of_existing_author_and_genre("Le Guin", "Ursula", "Fantasy", "Tales from Earthsea")
            .await
            .unwrap();
        let second = store
            .save_book_of_existing_author_and_genre("Le Guin", "Ursula", "Fantasy", "Tales from Earthsea")
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.book_count(), 2);
    }

    #[tokio::test]
    async fn save_rejects_unknown_author_or_genre() {
        let store = MemoryStore::new();
        store.insert_author("Ursula", "Le Guin");
        store.insert_genre("Fantasy");

        let err = store
            .save_book_of_existing_author_and_genre("Le Guin", "U.", "Fantasy", "Tehanu")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AuthorNotFound { .. }));

        let err = store
            .save_book_of_existing_author_and_genre("Le Guin", "Ursula", "Poetry", "Tehanu")
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "genre not found");
        assert_eq!(store.book_count(), 0);
    }
}
