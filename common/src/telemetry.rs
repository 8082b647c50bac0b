use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

use crate::helper::error_chain_fmt;

/// Builds the `tracing` subscriber shared by every service of the workspace.
///
/// Spans and events are filtered by `RUST_LOG` (or `fallback_env_filter` when it is not set),
/// stored as JSON by `JsonStorageLayer` so that children inherit their parents' fields,
/// and written in the bunyan format to `sink`.
///
/// # Arguments
/// - `name`: name of the service, added to every record
/// - `fallback_env_filter`: filter used when `RUST_LOG` has not been set, ex: "info"
/// - `sink`: where the records are written, ex: `std::io::stdout` or `std::io::sink` in tests
pub fn get_tracing_subscriber<Sink>(
    name: String,
    fallback_env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_env_filter));

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(name, sink))
}

/// Registers `subscriber` as the global default and redirects `log` records to it.
///
/// Can only succeed once per process.
pub fn init_tracing_subscriber(
    subscriber: impl Subscriber + Send + Sync,
) -> Result<(), TelemetryError> {
    LogTracer::init().map_err(|e| TelemetryError::LogTracerError(e.to_string()))?;
    set_global_default(subscriber)?;

    Ok(())
}

#[derive(thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to redirect log records to tracing: {0}")]
    LogTracerError(String),
    #[error("Failed to set the global tracing subscriber: {0}")]
    SubscriberError(#[from] SetGlobalDefaultError),
}

impl std::fmt::Debug for TelemetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
