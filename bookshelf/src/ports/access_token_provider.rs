use async_trait::async_trait;
use common::helper::error_chain_fmt;
use secrecy::Secret;

/// OAuth2 access tokens for the service's own identity, used to call the Google APIs
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<Secret<String>, AccessTokenError>;
}

#[derive(thiserror::Error)]
pub enum AccessTokenError {
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for AccessTokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
