//! Versioned resource documents and history snapshots
//!
//! The store is ignorant of clinical-field structure: a [`Resource`] is a
//! typed identity (`resourceType`, `id`, `meta`) plus an opaque payload of
//! whatever fields the resource type carries. The same model serves
//! Observation, AllergyIntolerance, and anything else.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stratum_meta::Meta;

/// Token accepted by version-aware reads to select the live document.
pub const CURRENT_VERSION: &str = "current";

/// A semantically-typed record with versioned metadata.
///
/// Serializes to the stored document shape: identity and envelope fields at
/// the top level with the clinical payload inlined next to them.
///
/// ```json
/// {
///   "resourceType": "AllergyIntolerance",
///   "id": "5f3c…",
///   "meta": { "versionId": "1.1.0", "lastUpdated": "…", "profile": [] },
///   "criticality": "moderate"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    pub meta: Meta,

    /// Clinical payload. Opaque to the store.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Resource {
    /// Serialize to the stored document form.
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).expect("resource serialization is infallible")
    }

    /// Rebuild a resource from a stored document.
    pub fn from_document(document: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(document)
    }
}

/// An immutable snapshot of a resource as it existed at a prior version,
/// tagged with the version string it represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub version: String,

    #[serde(flatten)]
    pub resource: Resource,
}

impl HistoryEntry {
    /// Snapshot a document under its own version tag.
    pub fn snapshot(resource: Resource) -> Self {
        HistoryEntry {
            version: resource.meta.version_id.clone(),
            resource,
        }
    }
}

/// What a version-aware read is asking for: the live document or an exact
/// archived version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    Current,
    Version(String),
}

impl VersionSelector {
    /// Interpret a raw version token. The literal `"current"` selects the
    /// live document; anything else is an exact history lookup.
    pub fn parse(token: &str) -> Self {
        if token == CURRENT_VERSION {
            VersionSelector::Current
        } else {
            VersionSelector::Version(token.to_string())
        }
    }
}

impl From<&str> for VersionSelector {
    fn from(token: &str) -> Self {
        VersionSelector::parse(token)
    }
}
