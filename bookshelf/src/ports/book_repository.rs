use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::book::{Book, BookData};

/// Books collection of the document store
///
/// Last write wins, there is no concurrency control.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// `None` when no book has this id, or when the id is not a valid store id
    async fn read(&self, id: &str) -> Result<Option<Book>, BookRepositoryError>;

    /// Stores a new book under an id generated by the store
    async fn create(&self, data: &BookData) -> Result<Book, BookRepositoryError>;

    /// Overwrites the whole book stored under `id`
    async fn update(&self, id: &str, data: &BookData) -> Result<Book, BookRepositoryError>;

    async fn delete(&self, id: &str) -> Result<(), BookRepositoryError>;

    /// Every book, ordered by title
    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum BookRepositoryError {
    #[error("{0} is not a valid book id")]
    InvalidId(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for BookRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
