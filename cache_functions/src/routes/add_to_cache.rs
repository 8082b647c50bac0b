use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use tracing::{info, warn};

use crate::{
    domain::entities::{
        cached_entry::{CachedEntry, CachedEntryError},
        pubsub_event::{PubSubEvent, PubSubEventError},
    },
    ports::cache_repository::{CacheRepository, CacheRepositoryError},
};

/// Caches the JSON document carried by a pub/sub push message under its `id`
///
/// Invalid messages are logged and acknowledged so they are not redelivered.
/// Only a failing store answers an error, letting the subscription retry.
#[tracing::instrument(name = "Add to cache handler", skip(cache_repository, body))]
pub async fn add_to_cache(
    cache_repository: web::Data<dyn CacheRepository>,
    body: web::Bytes,
) -> Result<HttpResponse, AddToCacheError> {
    let entry = match decode_entry(&body) {
        Ok(entry) => entry,
        Err(error) => {
            warn!(
                ?error,
                "Message is invalid, or missing an 'id' attribute. Dropping it"
            );
            return Ok(HttpResponse::NoContent().finish());
        }
    };

    cache_repository.set(&entry.id, &entry.value).await?;
    let stored = cache_repository.get(&entry.id).await?;

    info!(id = entry.id, ?stored, "Added data to the cache");
    Ok(HttpResponse::NoContent().finish())
}

fn decode_entry(body: &[u8]) -> Result<CachedEntry, InvalidCacheMessageError> {
    let event = PubSubEvent::try_parsing(body)?;
    info!(message_id = ?event.message().message_id, "Received pub/sub message");

    let data = event.decode_data()?;
    let entry = CachedEntry::try_parsing(data)?;

    Ok(entry)
}

#[derive(thiserror::Error)]
pub enum InvalidCacheMessageError {
    #[error(transparent)]
    InvalidEvent(#[from] PubSubEventError),
    #[error(transparent)]
    InvalidEntry(#[from] CachedEntryError),
}

impl std::fmt::Debug for InvalidCacheMessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(thiserror::Error)]
pub enum AddToCacheError {
    #[error("Error while writing to the cache: {0}")]
    CacheRepositoryError(#[from] CacheRepositoryError),
}

impl std::fmt::Debug for AddToCacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for AddToCacheError {
    fn status_code(&self) -> StatusCode {
        match self {
            AddToCacheError::CacheRepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
