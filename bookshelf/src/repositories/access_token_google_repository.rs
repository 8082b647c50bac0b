use anyhow::Context;
use async_trait::async_trait;
use secrecy::Secret;
use serde::Deserialize;

use crate::ports::access_token_provider::{AccessTokenError, AccessTokenProvider};

/// Gets the access tokens of the attached service account from the metadata server
pub struct MetadataServerTokenProvider {
    http_client: reqwest::Client,
    metadata_endpoint: String,
}

#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: Secret<String>,
}

impl MetadataServerTokenProvider {
    pub fn new(http_client: reqwest::Client, metadata_endpoint: &str) -> Self {
        Self {
            http_client,
            metadata_endpoint: metadata_endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for MetadataServerTokenProvider {
    #[tracing::instrument(name = "Requesting access token from metadata server", skip(self))]
    async fn access_token(&self) -> Result<Secret<String>, AccessTokenError> {
        let response: MetadataTokenResponse = self
            .http_client
            .get(format!(
                "{}/computeMetadata/v1/instance/service-accounts/default/token",
                self.metadata_endpoint
            ))
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .context("Failed to request an access token from the metadata server")?
            .json()
            .await
            .context("Invalid access token response from the metadata server")?;

        Ok(response.access_token)
    }
}

/// Always gives the same, configured, access token
///
/// For local runs, ex with a token from `gcloud auth print-access-token`.
pub struct StaticTokenProvider {
    token: Secret<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Secret<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<Secret<String>, AccessTokenError> {
        Ok(self.token.clone())
    }
}
