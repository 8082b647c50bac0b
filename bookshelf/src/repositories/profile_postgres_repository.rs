use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    domain::entities::profile::Profile,
    ports::profile_repository::{ProfileRepository, ProfileRepositoryError},
};

/// Profiles repository implemented using Postgres
pub struct ProfilePostgresRepository {
    pool: PgPool,
}

impl ProfilePostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfilePostgresRepository {
    #[tracing::instrument(name = "Reading profile from database", skip(self))]
    async fn read(&self, email: &str) -> Result<Profile, ProfileRepositoryError> {
        let preferred_language: Option<String> =
            sqlx::query_scalar("SELECT preferred_language FROM profiles WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .context(format!("Failed to read the profile of {}", email))?;

        Ok(preferred_language
            .map(|preferred_language| Profile { preferred_language })
            .unwrap_or_default())
    }

    #[tracing::instrument(name = "Saving profile in database", skip(self))]
    async fn update(&self, email: &str, profile: &Profile) -> Result<Profile, ProfileRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO profiles (email, preferred_language)
    VALUES ($1, $2)
    ON CONFLICT (email) DO UPDATE SET preferred_language = EXCLUDED.preferred_language
            "#,
        )
        .bind(email)
        .bind(&profile.preferred_language)
        .execute(&self.pool)
        .await
        .context(format!("Failed to store the profile of {}", email))?;

        Ok(profile.clone())
    }
}
