//! Versioned document store for FHIR-shaped clinical resources
//!
//! A small storage core with:
//! - Semantic-versioned mutable resources (major/minor bump policy,
//!   version `1.0.0` on create)
//! - A parallel append-only history container per resource type
//! - Consistent create/update/read-version/read-history/delete semantics
//!   across non-transactional two-container writes
//! - PostgreSQL and in-memory backends behind one storage seam
//!
//! The API/transport layer in front of this crate and the typed mapping of
//! clinical payloads are external collaborators: the store treats the
//! clinical body of every document as opaque.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::Config;
pub use db::{DocumentStore, MemoryDocumentStore, PostgresDocumentStore};
pub use error::{Error, Result};
pub use models::{HistoryEntry, Resource, VersionSelector};
pub use services::VersionManager;
