//! The `meta` envelope carried by every stored resource document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version::VersionId;

/// Version metadata stamped onto a resource by the store.
///
/// Serialized camelCase, exactly as persisted:
///
/// ```json
/// {
///   "versionId": "1.1.0",
///   "lastUpdated": "2024-05-14T09:30:00Z",
///   "profile": ["http://hl7.org/fhir/StructureDefinition/Observation"]
/// }
/// ```
///
/// `versionId` is kept as a plain string rather than a parsed
/// [`VersionId`]: reads must succeed even when a document carries corrupt
/// version data, and only the update path needs the parsed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub version_id: String,

    pub last_updated: DateTime<Utc>,

    /// Declarative schema-profile URIs. Opaque to the store.
    #[serde(default)]
    pub profile: Vec<String>,
}

impl Meta {
    /// Build the envelope for a write that produced `version`.
    pub fn stamped(version: &VersionId, last_updated: DateTime<Utc>, profile: Vec<String>) -> Self {
        Meta {
            version_id: version.to_string(),
            last_updated,
            profile,
        }
    }
}
