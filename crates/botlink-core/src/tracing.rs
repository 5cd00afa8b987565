use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default directive used when `RUST_LOG` is unset or unparseable.
const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Initialize structured JSON tracing on stdout. Call once at service startup.
///
/// Honors `RUST_LOG`; falls back to [`DEFAULT_FILTER`]. Subsequent calls are
/// silently ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .try_init();
}
