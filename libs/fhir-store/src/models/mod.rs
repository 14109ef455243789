//! Domain models for versioned resource operations

pub mod resource;

pub use resource::{HistoryEntry, Resource, VersionSelector};
