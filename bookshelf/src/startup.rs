use actix_multipart::form::MultipartFormConfig;
use actix_session::{
    config::CookieContentSecurity, storage::CookieSessionStore, SessionMiddleware,
};
use actix_web::{
    cookie::Key,
    dev::{Server, ServiceRequest},
    web::{self, Data},
    App, HttpServer,
};
use s3::{creds::Credentials, Bucket, BucketConfiguration, Region};
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha512};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::TcpListener, sync::Arc};
use tera::Tera;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{DatabaseSettings, ObjectStorageSettings, SecretsBackend, Settings},
    controllers::{
        add_book, add_book_form, delete_book, edit_book, edit_book_form, error_page,
        health_check, list_books, login, logout, oauth2callback, profile_form, update_profile,
        view_book,
    },
    domain::{
        entities::client_secrets::{ClientSecretsError, OAuthClientConfig},
        services::{image_uploader::ImageUploader, translator::Translator},
    },
    middlewares::login_required::RequireLogin,
    ports::{
        access_token_provider::AccessTokenProvider,
        book_repository::BookRepository,
        identity_provider::IdentityProvider,
        image_repository::ImageRepository,
        profile_repository::ProfileRepository,
        secret_repository::{SecretRepository, SecretRepositoryError, LATEST_VERSION},
        translation_service::TranslationService,
    },
    repositories::{
        access_token_google_repository::{MetadataServerTokenProvider, StaticTokenProvider},
        book_postgres_repository::BookPostgresRepository,
        identity_google_repository::IdentityGoogleRepository,
        image_s3_repository::ImageS3Repository,
        profile_postgres_repository::ProfilePostgresRepository,
        secret_configuration_repository::SecretConfigurationRepository,
        secret_manager_repository::SecretManagerRepository,
        translation_google_repository::TranslationGoogleRepository,
    },
    templates::build_templates,
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

/// Implementations of the external services the app depends on
pub struct Dependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub profile_repository: Arc<dyn ProfileRepository>,
    pub image_repository: Arc<dyn ImageRepository>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub translation_service: Arc<dyn TranslationService>,
    /// Any length: it is derived into the key encrypting the session cookies
    pub session_secret: Secret<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error("S3 credentials error: {0}")]
    S3CredentialsError(#[from] s3::creds::error::CredentialsError),
    #[error(transparent)]
    S3Error(#[from] s3::error::S3Error),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    SecretRepositoryError(#[from] SecretRepositoryError),
    #[error(transparent)]
    ClientSecretsError(#[from] ClientSecretsError),
    #[error(transparent)]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    TemplateError(#[from] tera::Error),
    #[error(transparent)]
    HttpClientError(#[from] reqwest::Error),
}

impl Application {
    /// Builds the application on top of the Google APIs, Postgres and S3
    ///
    /// Fetches the secrets, migrates the database and checks the bucket.
    ///
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application")]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let http_client = reqwest::Client::builder().build()?;

        let token_provider: Arc<dyn AccessTokenProvider> =
            match &settings.google.static_access_token {
                Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
                None => Arc::new(MetadataServerTokenProvider::new(
                    http_client.clone(),
                    &settings.google.metadata_endpoint,
                )),
            };

        let secret_repository: Arc<dyn SecretRepository> = match settings.secrets.backend {
            SecretsBackend::SecretManager => Arc::new(SecretManagerRepository::new(
                http_client.clone(),
                &settings.google.secret_manager_endpoint,
                &settings.google.project_id,
                token_provider.clone(),
            )),
            SecretsBackend::Configuration => Arc::new(SecretConfigurationRepository::new(
                settings.secrets.values.clone(),
            )),
        };

        let session_secret = secret_repository
            .get_secret(&settings.secrets.session_key_id, LATEST_VERSION)
            .await?;
        let client_secrets = secret_repository
            .get_secret(&settings.secrets.client_secrets_id, LATEST_VERSION)
            .await?;
        let oauth_client = OAuthClientConfig::try_parsing(client_secrets.expose_secret())?;

        let connection_pool = get_connection_pool(&settings.database);
        sqlx::migrate!("../migrations").run(&connection_pool).await?;

        let bucket = set_up_s3(&settings.object_storage, &settings.google.project_id).await?;

        let dependencies = Dependencies {
            book_repository: Arc::new(BookPostgresRepository::new(connection_pool.clone())),
            profile_repository: Arc::new(ProfilePostgresRepository::new(connection_pool)),
            image_repository: Arc::new(ImageS3Repository::new(
                bucket,
                &settings.object_storage.public_url_base,
            )),
            identity_provider: Arc::new(IdentityGoogleRepository::new(
                http_client.clone(),
                oauth_client,
                settings.oauth.scopes.clone(),
                &settings.oauth.userinfo_endpoint,
            )),
            translation_service: Arc::new(TranslationGoogleRepository::new(
                http_client,
                &settings.google.translate_endpoint,
                &settings.google.project_id,
                token_provider,
            )),
            session_secret,
        };

        Self::build_with_dependencies(settings, nb_workers, dependencies)
    }

    /// Builds the application on top of any implementation of the external services
    pub fn build_with_dependencies(
        settings: Settings,
        nb_workers: Option<usize>,
        dependencies: Dependencies,
    ) -> Result<Self, ApplicationBuildError> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let templates = build_templates()?;

        let server = run(listener, settings, nb_workers, dependencies, templates)?;

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

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
///
/// SessionMiddleware: the session lives in a private (encrypted) cookie.
///
/// # Parameters
/// - nb_workers: number of actix-web workers
///   if `None`, the number of available physical CPUs is used as the worker count.
pub fn run(
    listener: TcpListener,
    settings: Settings,
    nb_workers: Option<usize>,
    dependencies: Dependencies,
    templates: Tera,
) -> Result<Server, std::io::Error> {
    let session_key = session_key(&dependencies.session_secret);
    let cookie_secure = settings.application.session_cookie_secure;
    let max_upload_size = settings.uploads.max_size_bytes;

    // Wraps the services in a `actix_web::Data` (`Arc`) to be able to register them
    // and access them from handlers.
    // They are shared among all threads.
    let book_repository: Data<dyn BookRepository> = Data::from(dependencies.book_repository);
    let profile_repository: Data<dyn ProfileRepository> =
        Data::from(dependencies.profile_repository);
    let identity_provider: Data<dyn IdentityProvider> =
        Data::from(dependencies.identity_provider);
    let image_uploader = Data::new(ImageUploader::new(
        dependencies.image_repository,
        settings.uploads.allowed_extensions.clone(),
    ));
    let translator = Data::new(Translator::new(dependencies.translation_service));
    let templates = Data::new(templates);
    let application_settings = Data::new(settings.application);

    // `move` to capture variables from the surrounding environment
    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(cookie_secure)
                    .cookie_content_security(CookieContentSecurity::Private)
                    .build(),
            )
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/", web::get().to(list_books))
            // Registered before `/books/{id}` so that `add` is not taken for an id
            .service(
                web::resource("/books/add")
                    .wrap(RequireLogin::new())
                    .route(web::get().to(add_book_form))
                    .route(web::post().to(add_book)),
            )
            .route("/books/{id}", web::get().to(view_book))
            .service(
                web::resource("/books/{id}/edit")
                    .wrap(RequireLogin::new())
                    .route(web::get().to(edit_book_form))
                    .route(web::post().to(edit_book)),
            )
            .service(
                web::resource("/books/{id}/delete")
                    .wrap(RequireLogin::returning_to(book_view_path))
                    .route(web::get().to(delete_book)),
            )
            .service(
                web::resource("/profile")
                    .wrap(RequireLogin::new())
                    .route(web::get().to(profile_form))
                    .route(web::post().to(update_profile)),
            )
            .route("/login", web::get().to(login))
            .route("/oauth2callback", web::get().to(oauth2callback))
            .route("/logout", web::get().to(logout))
            .route("/error", web::get().to(error_page))
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(max_upload_size)
                    .memory_limit(max_upload_size),
            )
            .app_data(book_repository.clone())
            .app_data(profile_repository.clone())
            .app_data(identity_provider.clone())
            .app_data(image_uploader.clone())
            .app_data(translator.clone())
            .app_data(templates.clone())
            .app_data(application_settings.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    // No await
    Ok(server.run())
}

/// Deleting a book requires to be logged in, then goes back to the book page
fn book_view_path(req: &ServiceRequest) -> String {
    format!("/books/{}", req.match_info().query("id"))
}

/// Derives a 64 bytes cookie key from a secret of any length
fn session_key(secret: &Secret<String>) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());

    Key::from(digest.as_slice())
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}

/// Sets up the S3 object storage holding the cover images
///
/// The bucket is created if it does not exist yet.
///
/// # Returns
/// An initialized bucket
#[tracing::instrument(name = "Setting up S3 object store")]
pub async fn set_up_s3(
    settings: &ObjectStorageSettings,
    project_id: &str,
) -> Result<Bucket, ApplicationBuildError> {
    let bucket_name = settings.bucket_name(project_id);
    let region = Region::Custom {
        region: settings.region.to_owned(),
        endpoint: settings.endpoint.to_owned(),
    };

    let credentials = Credentials::new(
        Some(&settings.access_key),
        Some(settings.secret_key.expose_secret()),
        None,
        None,
        None,
    )?;

    // Instantiates/gets the bucket if it exists
    let bucket = Bucket::new(&bucket_name, region.clone(), credentials.clone())?.with_path_style();

    // Checks if the bucket exist
    if let Err(error) = bucket.head_object("/").await {
        // Only continues if the error is a bucket not found (404)
        match error {
            s3::error::S3Error::Http(code, _) => {
                if code != 404 {
                    return Err(ApplicationBuildError::S3Error(error));
                }
            }
            _ => return Err(ApplicationBuildError::S3Error(error)),
        }

        info!("Unknown bucket {}, creating it ...", bucket_name);

        Bucket::create_with_path_style(
            &bucket_name,
            region,
            credentials,
            BucketConfiguration::public(),
        )
        .await?;
    }

    info!("Bucket {} has been correctly instantiated", bucket_name);
    Ok(bucket)
}
