//! Logging initialization for store binaries and embedders
//!
//! EnvFilter-based setup with JSON or human-readable output. `RUST_LOG`
//! overrides the configured default filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// Safe to call more than once (e.g. from test harnesses); only the first
/// call installs.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    if result.is_ok() {
        tracing::info!(
            level = %config.level,
            json = config.json,
            "Logging initialized"
        );
    }

    Ok(())
}
