use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::ports::{
    access_token_provider::AccessTokenProvider,
    secret_repository::{SecretRepository, SecretRepositoryError},
};

/// Secret Manager REST client
pub struct SecretManagerRepository {
    http_client: reqwest::Client,
    endpoint: String,
    project_id: String,
    token_provider: Arc<dyn AccessTokenProvider>,
}

#[derive(Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Deserialize)]
struct SecretPayload {
    /// Base64 encoded
    data: String,
}

impl SecretManagerRepository {
    pub fn new(
        http_client: reqwest::Client,
        endpoint: &str,
        project_id: &str,
        token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            token_provider,
        }
    }

    fn secret_version_url(&self, secret_id: &str, version: &str) -> String {
        format!(
            "{}/v1/projects/{}/secrets/{}/versions/{}:access",
            self.endpoint, self.project_id, secret_id, version
        )
    }
}

#[async_trait]
impl SecretRepository for SecretManagerRepository {
    #[tracing::instrument(name = "Accessing secret from Secret Manager", skip(self))]
    async fn get_secret(
        &self,
        secret_id: &str,
        version: &str,
    ) -> Result<Secret<String>, SecretRepositoryError> {
        let token = self
            .token_provider
            .access_token()
            .await
            .context("Failed to get an access token for Secret Manager")?;

        let response = self
            .http_client
            .get(self.secret_version_url(secret_id, version))
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .context(format!("Failed to request the secret {}", secret_id))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SecretRepositoryError::NotFound(secret_id.to_string()));
        }

        let response: AccessSecretVersionResponse = response
            .error_for_status()
            .context(format!("Secret Manager refused to give the secret {}", secret_id))?
            .json()
            .await
            .context(format!("Invalid Secret Manager response for {}", secret_id))?;

        let payload = general_purpose::STANDARD
            .decode(response.payload.data)
            .map_err(|_| SecretRepositoryError::InvalidPayload(secret_id.to_string()))?;
        let payload = String::from_utf8(payload)
            .map_err(|_| SecretRepositoryError::InvalidPayload(secret_id.to_string()))?;

        Ok(Secret::new(payload))
    }
}
