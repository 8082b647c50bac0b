use async_trait::async_trait;
use common::helper::error_chain_fmt;
use secrecy::Secret;

pub const LATEST_VERSION: &str = "latest";

#[async_trait]
pub trait SecretRepository: Send + Sync {
    /// Payload of a version of a secret, use `LATEST_VERSION` for the current one
    async fn get_secret(
        &self,
        secret_id: &str,
        version: &str,
    ) -> Result<Secret<String>, SecretRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum SecretRepositoryError {
    #[error("Unknown secret: {0}")]
    NotFound(String),
    #[error("The payload of the secret {0} is not valid UTF-8 text")]
    InvalidPayload(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for SecretRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
