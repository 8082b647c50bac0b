use anyhow::Context;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use url::Url;

use crate::{
    domain::entities::{
        client_secrets::OAuthClientConfig, credentials::Credentials, user_info::UserInfo,
    },
    ports::identity_provider::{IdentityProvider, IdentityProviderError},
};

/// Google OAuth2 web server flow
pub struct IdentityGoogleRepository {
    http_client: reqwest::Client,
    client: OAuthClientConfig,
    scopes: Vec<String>,
    userinfo_endpoint: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    id_token: Option<String>,
    /// Space separated, the granted scopes may differ from the requested ones
    scope: Option<String>,
}

impl IdentityGoogleRepository {
    pub fn new(
        http_client: reqwest::Client,
        client: OAuthClientConfig,
        scopes: Vec<String>,
        userinfo_endpoint: &str,
    ) -> Self {
        Self {
            http_client,
            client,
            scopes,
            userinfo_endpoint: userinfo_endpoint.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityGoogleRepository {
    fn authorize(&self, callback_uri: &str, state: &str) -> Result<String, IdentityProviderError> {
        let scope = self.scopes.join(" ");

        let url = Url::parse_with_params(
            &self.client.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.client.client_id.as_str()),
                ("redirect_uri", callback_uri),
                ("scope", scope.as_str()),
                ("state", state),
                // Online access forces the user to log in again once the token expires
                ("access_type", "online"),
                ("prompt", "consent"),
                ("include_granted_scopes", "false"),
            ],
        )
        .map_err(|e| IdentityProviderError::InvalidAuthorizationUrl(e.to_string()))?;

        Ok(url.into())
    }

    #[tracing::instrument(name = "Exchanging authorization code", skip(self, code))]
    async fn exchange_code(
        &self,
        callback_uri: &str,
        code: &str,
    ) -> Result<Credentials, IdentityProviderError> {
        let response = self
            .http_client
            .post(&self.client.token_uri)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", callback_uri),
                ("client_id", self.client.client_id.as_str()),
                ("client_secret", self.client.client_secret.expose_secret()),
            ])
            .send()
            .await
            .context("Failed to request a token")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityProviderError::TokenRequestRefused(format!(
                "{} {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Invalid token response")?;

        let scopes = match token.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => self.scopes.clone(),
        };

        Ok(Credentials {
            token: token.access_token,
            refresh_token: token.refresh_token,
            token_uri: self.client.token_uri.clone(),
            scopes,
            id_token: token.id_token,
        })
    }

    #[tracing::instrument(name = "Fetching user info", skip(self, credentials))]
    async fn fetch_user_info(
        &self,
        credentials: &Credentials,
    ) -> Result<UserInfo, IdentityProviderError> {
        let user_info = self
            .http_client
            .get(&self.userinfo_endpoint)
            .bearer_auth(&credentials.token)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .context("Failed to request the user info")?
            .json()
            .await
            .context("Invalid user info response")?;

        Ok(user_info)
    }
}
