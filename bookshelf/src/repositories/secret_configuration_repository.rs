use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::Secret;

use crate::ports::secret_repository::{SecretRepository, SecretRepositoryError};

/// Secrets read from the settings, for local runs
///
/// Secrets are not versioned: every version is the configured value.
pub struct SecretConfigurationRepository {
    values: HashMap<String, Secret<String>>,
}

impl SecretConfigurationRepository {
    pub fn new(values: HashMap<String, Secret<String>>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl SecretRepository for SecretConfigurationRepository {
    #[tracing::instrument(name = "Reading secret from settings", skip(self))]
    async fn get_secret(
        &self,
        secret_id: &str,
        _version: &str,
    ) -> Result<Secret<String>, SecretRepositoryError> {
        self.values
            .get(secret_id)
            .cloned()
            .ok_or_else(|| SecretRepositoryError::NotFound(secret_id.to_string()))
    }
}
