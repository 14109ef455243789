//! Configuration loading
//!
//! Layered sources, later entries winning: built-in defaults, an optional
//! `stratum.toml` in the working directory, then `STRATUM_`-prefixed
//! environment variables (`STRATUM_DATABASE__URL`,
//! `STRATUM_HISTORY__VERSION_ORDER`, ...). A `.env` file is honored when
//! present.
//!
//! The store handle is opened from this config at process start and passed
//! explicitly to whatever owns it; there is no process-wide connection
//! singleton.

use serde::Deserialize;
use stratum_meta::VersionOrder;

use crate::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,

    pub pool_min_size: u32,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,

    /// Overrides `url` in test runs when set.
    pub test_database_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter, overridable via `RUST_LOG`.
    pub level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Ordering applied when listing version history. `lexical` preserves
    /// the native string-sort behavior; `numeric` sorts by parsed
    /// `(major, minor, patch)`.
    pub version_order: VersionOrder,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("database.url", "postgres://localhost:5432/stratum")?
            .set_default("database.pool_min_size", 0_i64)?
            .set_default("database.pool_max_size", 10_i64)?
            .set_default("database.pool_timeout_seconds", 30_i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("history.version_order", "lexical")?
            .add_source(config::File::with_name("stratum").required(false))
            .add_source(config::Environment::with_prefix("STRATUM").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.database.url.is_empty() {
            return Err("database.url must not be empty".to_string());
        }
        if self.database.pool_max_size == 0 {
            return Err("database.pool_max_size must be at least 1".to_string());
        }
        if self.database.pool_min_size > self.database.pool_max_size {
            return Err(format!(
                "database.pool_min_size ({}) exceeds pool_max_size ({})",
                self.database.pool_min_size, self.database.pool_max_size
            ));
        }
        Ok(())
    }
}
