//! Subscriber setup.

use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Name of the span file inside the data directory.
pub const TRACE_FILE_NAME: &str = "country-explorer-trace.json";

/// Filter used when `trace_level` is unset or not a valid directive.
pub const DEFAULT_TRACE_LEVEL: &str = "info";

/// Installs the global `tracing` subscriber exporting spans to
/// [`Config::trace_file_path`].
///
/// `config.trace_level` accepts any `EnvFilter` directive; a missing or
/// unparsable one falls back to [`DEFAULT_TRACE_LEVEL`]. [`crate::initialize`]
/// only calls this when `trace_level` is set.
///
/// Returns `true` if this call installed the subscriber. It returns `false`
/// when another subscriber is already active or the data directory cannot be
/// created; tracing then stays as it was.
///
/// # Examples
///
/// ```no_run
/// use country_explorer::observability::init_tracing;
/// use country_explorer::Config;
///
/// let config = Config {
///     trace_level: Some("country_explorer=debug".to_string()),
///     ..Config::default()
/// };
/// if init_tracing(&config) {
///     tracing::debug!(path = ?config.trace_file_path(), "tracing is now active");
/// }
/// ```
pub fn init_tracing(config: &Config) -> bool {
    let data_dir = config.data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return false;
    }

    let service = env!("CARGO_PKG_NAME");
    let resource = Resource::new(vec![opentelemetry::KeyValue::new("service.name", service)]);
    let provider = tracer::create_tracer_provider(config.trace_file_path(), resource);

    tracing_subscriber::registry()
        .with(trace_filter(config.trace_level.as_deref()))
        .with(OpenTelemetryLayer::new(provider.tracer(service)))
        .try_init()
        .is_ok()
}

fn trace_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_TRACE_LEVEL))
}
