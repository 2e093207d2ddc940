use thiserror::Error;

/// Failures surfaced by a [`crate::BookStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("author not found: {family_name}, {first_name}")]
    AuthorNotFound {
        family_name: String,
        first_name: String,
    },

    #[error("genre not found: {name}")]
    GenreNotFound { name: String },

    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    /// Fixed, client-safe description of the failure.
    ///
    /// The `Display` output may carry backend detail and is meant for logs only.
    pub fn public_message(&self) -> &'static str {
        match self {
            StoreError::AuthorNotFound { .. } => "author not found",
            StoreError::GenreNotFound { .. } => "genre not found",
            StoreError::Storage(_) => "storage unavailable",
        }
    }
}
