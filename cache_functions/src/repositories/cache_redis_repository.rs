use anyhow::Context;
use async_once_cell::OnceCell;
use async_trait::async_trait;
use common::helper::error_chain_fmt;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use secrecy::ExposeSecret;

use crate::{
    configuration::RedisSettings,
    ports::cache_repository::{CacheRepository, CacheRepositoryError},
};

// A single connection attempt: an unreachable Redis fails the request right away
const CONNECTION_RETRIES: usize = 0;
const CONNECTION_BACKOFF_BASE: u64 = 2;
const CONNECTION_BACKOFF_FACTOR_MS: u64 = 100;

/// Cache repository implemented with Redis
///
/// The connection manager is created on first use, so an unreachable Redis
/// fails the call and not the application start. A failed connection is retried
/// on the next call.
pub struct CacheRedisRepository {
    client: Client,
    connection_manager: OnceCell<ConnectionManager>,
}

impl CacheRedisRepository {
    pub fn try_new(settings: &RedisSettings) -> Result<Self, CacheRedisRepositoryError> {
        let client = Client::open(settings.get_uri().expose_secret().as_str())?;

        Ok(Self {
            client,
            connection_manager: OnceCell::new(),
        })
    }

    /// Handle on the shared multiplexed connection, reconnecting by itself once created
    async fn connection(&self) -> Result<ConnectionManager, CacheRepositoryError> {
        let connection_manager = self
            .connection_manager
            .get_or_try_init(ConnectionManager::new_with_backoff(
                self.client.clone(),
                CONNECTION_BACKOFF_BASE,
                CONNECTION_BACKOFF_FACTOR_MS,
                CONNECTION_RETRIES,
            ))
            .await
            .map_err(|e| CacheRepositoryError::Unavailable(e.to_string()))?;

        Ok(connection_manager.clone())
    }
}

#[async_trait]
impl CacheRepository for CacheRedisRepository {
    #[tracing::instrument(name = "Setting value in Redis", skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheRepositoryError> {
        let mut connection = self.connection().await?;

        connection
            .set::<_, _, ()>(key, value)
            .await
            .context(format!("Failed to set the Redis key {}", key))?;

        Ok(())
    }

    #[tracing::instrument(name = "Getting value from Redis", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, CacheRepositoryError> {
        let mut connection = self.connection().await?;

        let value: Option<String> = connection
            .get(key)
            .await
            .context(format!("Failed to get the Redis key {}", key))?;

        Ok(value)
    }
}

#[derive(thiserror::Error)]
pub enum CacheRedisRepositoryError {
    #[error("Invalid Redis connection settings: {0}")]
    InvalidSettings(#[from] redis::RedisError),
}

impl std::fmt::Debug for CacheRedisRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
