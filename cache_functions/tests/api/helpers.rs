use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use cache_functions::{
    configuration::{get_configuration, Settings},
    ports::cache_repository::{CacheRepository, CacheRepositoryError},
    startup::Application,
};
use common::telemetry::{get_tracing_subscriber, init_tracing_subscriber};
use once_cell::sync::Lazy;
use serde_json::json;

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // The sink is part of the subscriber type, hence the 2 branches
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber).expect("Failed to init tracing");
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber).expect("Failed to init tracing");
    };
});

/// Cache store living in the test process
#[derive(Default)]
pub struct InMemoryCacheRepository {
    entries: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl InMemoryCacheRepository {
    pub fn stored(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn nb_writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl CacheRepository for InMemoryCacheRepository {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheRepositoryError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheRepositoryError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }
}

pub struct TestApp {
    pub address: String,
    pub cache: Arc<InMemoryCacheRepository>,
}

impl TestApp {
    /// Pushes a pub/sub message whose data is `payload`, as the push subscription would
    pub async fn push_message(&self, payload: &str) -> reqwest::Response {
        let body = json!({
            "message": {
                "data": general_purpose::STANDARD.encode(payload),
                "messageId": uuid::Uuid::new_v4().to_string(),
            },
            "subscription": "projects/test/subscriptions/cache",
        });

        self.post_raw(body.to_string()).await
    }

    pub async fn post_raw(&self, body: String) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_from_cache(&self, id: &str) -> reqwest::Response {
        reqwest::Client::new()
            .get(&format!("{}/", &self.address))
            .query(&[("id", id)])
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Settings read from the configuration files, listening on a random port
pub fn test_configuration() -> Settings {
    let mut c = get_configuration().expect("Failed to read configuration.");
    // Port 0: the OS picks an available port
    c.application.port = 0;
    c.application.host = "127.0.0.1".to_string();
    c
}

/// Launches the server as a background task, on top of an in-memory cache
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let cache = Arc::new(InMemoryCacheRepository::default());
    let application =
        Application::build_with_repository(test_configuration(), Some(1), cache.clone())
            .expect("Failed to build application.");

    TestApp {
        address: launch(application),
        cache,
    }
}

/// Settings pointing to a Redis host where nothing listens
pub fn unreachable_store_configuration() -> Settings {
    let mut settings = test_configuration();
    settings.redis.host = "127.0.0.1".to_string();
    settings.redis.port = 1;
    settings
}

/// Launches the server as a background task, on top of the real Redis repository
pub async fn spawn_app_with_settings(settings: Settings) -> String {
    Lazy::force(&TRACING);

    let application = Application::build(settings, Some(1))
        .await
        .expect("Failed to build application.");

    launch(application)
}

fn launch(application: Application) -> String {
    let address = format!("http://127.0.0.1:{}", application.port());
    let _ = tokio::spawn(application.run_until_stopped());
    address
}
