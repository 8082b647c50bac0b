use common::helper::error_chain_fmt;
use secrecy::Secret;
use serde::Deserialize;

/// OAuth2 client registration, in the identity provider's client secrets file format
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    web: Option<OAuthClientConfig>,
    installed: Option<OAuthClientConfig>,
}

impl OAuthClientConfig {
    /// Parses a client secrets file: `{"web": {...}}`, or `{"installed": {...}}`
    pub fn try_parsing(json: &str) -> Result<Self, ClientSecretsError> {
        let file: ClientSecretsFile = serde_json::from_str(json)?;

        file.web
            .or(file.installed)
            .ok_or(ClientSecretsError::MissingClient)
    }
}

#[derive(thiserror::Error)]
pub enum ClientSecretsError {
    #[error("The client secrets are not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("The client secrets have neither a 'web' nor an 'installed' client")]
    MissingClient,
}

impl std::fmt::Debug for ClientSecretsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
