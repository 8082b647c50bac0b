use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use std::{net::TcpListener, sync::Arc};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::Settings,
    ports::cache_repository::CacheRepository,
    repositories::cache_redis_repository::{CacheRedisRepository, CacheRedisRepositoryError},
    routes::{add_to_cache, get_from_cache, health_check},
};

/// Pub/sub messages can carry up to 10 MB of data
const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    CacheRedisRepositoryError(#[from] CacheRedisRepositoryError),
}

impl Application {
    /// Builds the application on top of Redis
    ///
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application")]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let cache_repository = CacheRedisRepository::try_new(&settings.redis)?;

        Self::build_with_repository(settings, nb_workers, Arc::new(cache_repository))
    }

    /// Builds the application on top of any cache store
    pub fn build_with_repository(
        settings: Settings,
        nb_workers: Option<usize>,
        cache_repository: Arc<dyn CacheRepository>,
    ) -> Result<Self, ApplicationBuildError> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, nb_workers, cache_repository)?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// `GET /` reads from the cache, `POST /` receives the pub/sub push messages to cache
///
/// TracingLogger middleware: generates a `request_id` for each incoming request
/// and opens a span around its handling.
pub fn run(
    listener: TcpListener,
    nb_workers: Option<usize>,
    cache_repository: Arc<dyn CacheRepository>,
) -> Result<Server, std::io::Error> {
    // Shared among all workers
    let cache_repository: Data<dyn CacheRepository> = Data::from(cache_repository);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/")
                    .route(web::get().to(get_from_cache))
                    .route(web::post().to(add_to_cache)),
            )
            .app_data(web::PayloadConfig::new(MAX_MESSAGE_SIZE))
            .app_data(cache_repository.clone())
    })
    .listen(listener)?;

    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    Ok(server.run())
}
