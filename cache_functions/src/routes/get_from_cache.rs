use actix_web::{http::header::ContentType, web, HttpResponse};
use serde::Deserialize;
use tracing::{info, warn};

use crate::ports::cache_repository::CacheRepository;

#[derive(Debug, Deserialize)]
pub struct GetFromCacheQuery {
    pub id: Option<String>,
}

/// Returns the raw value cached under `id`
///
/// Always answers 200: a missing id, an unknown key and an unreachable store
/// all give an empty body.
#[tracing::instrument(name = "Get from cache handler", skip(cache_repository))]
pub async fn get_from_cache(
    cache_repository: web::Data<dyn CacheRepository>,
    query: Option<web::Query<GetFromCacheQuery>>,
) -> HttpResponse {
    let id = query.and_then(|query| query.into_inner().id);

    let value = match id {
        None => {
            info!("No id provided");
            String::new()
        }
        Some(id) => match cache_repository.get(&id).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                info!(id, "Nothing cached");
                String::new()
            }
            Err(error) => {
                warn!(?error, id, "Cache lookup failed, answering an empty value");
                String::new()
            }
        },
    };

    HttpResponse::Ok()
        .insert_header(ContentType::plaintext())
        .body(value)
}
