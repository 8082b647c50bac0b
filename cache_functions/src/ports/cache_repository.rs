use async_trait::async_trait;
use common::helper::error_chain_fmt;

/// Key-value store used as a cache: no expiration, last write wins
#[async_trait]
pub trait CacheRepository: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheRepositoryError>;

    /// Returns `None` when nothing is stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum CacheRepositoryError {
    #[error("The cache store could not be reached: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for CacheRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
