use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::profile::Profile;

/// Profiles collection of the document store, keyed by user email
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// The default profile when none is stored. Reading never stores anything.
    async fn read(&self, email: &str) -> Result<Profile, ProfileRepositoryError>;

    /// Stores the whole profile, replacing any previous one
    async fn update(&self, email: &str, profile: &Profile) -> Result<Profile, ProfileRepositoryError>;

    /// A single entry of the profile, `default` when the profile has no such entry
    async fn read_entry(
        &self,
        email: &str,
        key: &str,
        default: &str,
    ) -> Result<String, ProfileRepositoryError> {
        let profile = self.read(email).await?;

        Ok(profile.entry(key).unwrap_or_else(|| default.to_string()))
    }
}

#[derive(thiserror::Error)]
pub enum ProfileRepositoryError {
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for ProfileRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
