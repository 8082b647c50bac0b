use serde::{Deserialize, Serialize};

/// OAuth2 credentials of the logged in user, kept in their session
///
/// The client secret is never part of it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub scopes: Vec<String>,
    pub id_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}
