use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub redis: RedisSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    #[serde(default)]
    pub password: Option<Secret<String>>,
}

impl RedisSettings {
    pub fn get_uri(&self) -> Secret<String> {
        let uri = match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}",
                password.expose_secret(),
                self.host,
                self.port
            ),
            None => format!("redis://{}:{}", self.host, self.port),
        };

        Secret::new(uri)
    }
}

/// Extracts the settings from configuration files and env variables
///
/// `base.yaml` holds the settings shared by all environments, `local.yaml` or `production.yaml`
/// the environment specific ones. The environment is chosen with `APP_ENVIRONMENT` (default: `local`).
///
/// Env variables prefixed with `APP` and using `__` as separator override the files,
/// ex: `APP_REDIS__PORT=6380` sets `Settings.redis.port`.
///
/// The variables set by the serverless platform (`REDISHOST`, `REDISPORT`, `PORT`) take precedence.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

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
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("redis.host", std::env::var("REDISHOST").ok())?
        .set_override_option("redis.port", std::env::var("REDISPORT").ok())?
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
