use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::{credentials::Credentials, user_info::UserInfo};

/// OAuth2 authorization code flow against an identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to redirect the user to, so they can grant access
    ///
    /// `state` is sent back untouched to `callback_uri`.
    fn authorize(&self, callback_uri: &str, state: &str) -> Result<String, IdentityProviderError>;

    /// Exchanges the authorization code received on `callback_uri` for credentials
    async fn exchange_code(
        &self,
        callback_uri: &str,
        code: &str,
    ) -> Result<Credentials, IdentityProviderError>;

    async fn fetch_user_info(
        &self,
        credentials: &Credentials,
    ) -> Result<UserInfo, IdentityProviderError>;
}

#[derive(thiserror::Error)]
pub enum IdentityProviderError {
    #[error("Invalid authorization URL: {0}")]
    InvalidAuthorizationUrl(String),
    #[error("The token request was refused: {0}")]
    TokenRequestRefused(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for IdentityProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
