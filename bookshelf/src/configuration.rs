use std::collections::HashMap;

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub google: GoogleSettings,
    pub secrets: SecretsSettings,
    pub oauth: OAuthSettings,
    pub database: DatabaseSettings,
    pub object_storage: ObjectStorageSettings,
    pub uploads: UploadSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Scheme and host the app is reached through, when it differs from the one it listens on
    pub external_host_url: Option<String>,
    /// Only sends the session cookie over https
    pub session_cookie_secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleSettings {
    pub project_id: String,
    pub metadata_endpoint: String,
    pub translate_endpoint: String,
    pub secret_manager_endpoint: String,
    /// When set, used instead of asking the metadata server for access tokens
    pub static_access_token: Option<Secret<String>>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SecretsBackend {
    SecretManager,
    Configuration,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretsSettings {
    pub backend: SecretsBackend,
    pub session_key_id: String,
    pub client_secrets_id: String,
    /// Secrets by id, read by the `configuration` backend
    #[serde(default)]
    pub values: HashMap<String, Secret<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthSettings {
    pub userinfo_endpoint: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    // Determines if we demand the connection to be encrypted or not
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            // Try an encrypted connection, fallback to unencrypted if it fails
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        let mut options = self.without_db().database(&self.database_name);
        // Lowers sqlx logs from INFO to TRACE level.
        options.log_statements(tracing::log::LevelFilter::Trace);
        options
    }
}

/// S3 compatible object storage, the GCS interoperability API in production
#[derive(Deserialize, Debug, Clone)]
pub struct ObjectStorageSettings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: Secret<String>,
    /// Defaults to `<project_id>-covers`
    pub bucket_name: Option<String>,
    /// Public objects are served from `<public_url_base>/<bucket>/<object>`
    pub public_url_base: String,
}

impl ObjectStorageSettings {
    pub fn bucket_name(&self, project_id: &str) -> String {
        self.bucket_name
            .clone()
            .unwrap_or_else(|| format!("{}-covers", project_id))
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct UploadSettings {
    pub allowed_extensions: Vec<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_size_bytes: usize,
}

/// Extracts app settings from configuration files and env variables
///
/// `base.yaml` should contain shared settings for all environments.
/// A specific env file should be created for each environment: `local.yaml` and `production.yaml`
/// The environment is set with the env var `APP_ENVIRONMENT`.
/// If `APP_ENVIRONMENT` is not set, `local.yaml` is the default.
///
/// Settings are also taken from environment variables: with a prefix of APP and '__' as separator
/// For ex: `APP_APPLICATION__PORT=5001 would set `Settings.application.port`
///
/// `GOOGLE_CLOUD_PROJECT`, `EXTERNAL_HOST_URL` and `PORT`, set by the hosting platform, win over everything.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    // Detects the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Adds in settings from environment variables (with a prefix of APP and '__' as separator)
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("google.project_id", std::env::var("GOOGLE_CLOUD_PROJECT").ok())?
        .set_override_option(
            "application.external_host_url",
            std::env::var("EXTERNAL_HOST_URL").ok(),
        )?
        .set_override_option("application.port", std::env::var("PORT").ok())?
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
