//! Error types for the versioned resource store
//!
//! The store performs no silent recovery: every failure is surfaced with
//! enough context (resource type, id, attempted version) for a higher
//! layer to log and decide on retry. Store connectivity failures map to
//! [`Error::Database`] and are propagated, never retried internally.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Backing-store failure, including transport/connectivity loss.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Update target has no current document.
    #[error("Resource not found: {resource_type}/{id}")]
    ResourceNotFound { resource_type: String, id: String },

    /// Create was asked to use an id that already has a current document.
    #[error("Resource already exists: {resource_type}/{id}")]
    AlreadyExists { resource_type: String, id: String },

    /// The compare-and-swap replace lost against a concurrent writer.
    #[error("Version conflict on {resource_type}/{id}: expected {expected}, found {actual}")]
    VersionConflict {
        resource_type: String,
        id: String,
        expected: String,
        actual: String,
    },

    /// A stored `meta.versionId` does not parse as MAJOR.MINOR.PATCH.
    #[error("Malformed stored version: {0}")]
    MalformedVersion(#[from] stratum_meta::MalformedVersion),

    /// Input document is not resource-shaped (e.g. not a JSON object).
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal store error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn not_found(resource_type: &str, id: &str) -> Self {
        Error::ResourceNotFound {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn already_exists(resource_type: &str, id: &str) -> Self {
        Error::AlreadyExists {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }
}
