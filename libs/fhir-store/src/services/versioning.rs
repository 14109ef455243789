//! Version manager: the sole writer to the current and history containers
//!
//! Sequencing rules it enforces:
//! - update reads the current document before any mutation, so a missing
//!   id fails with zero writes to either container;
//! - the pre-update document is archived under its old version before the
//!   current document is replaced; if the archive write fails the replace
//!   is never attempted and the old current stays authoritative;
//! - the replace is a compare-and-swap on the version the update read, so
//!   a concurrent update on the same id surfaces `VersionConflict` instead
//!   of silently producing duplicate version numbers.
//!
//! The two writes are not wrapped in a cross-container transaction. The
//! remaining failure window - archive committed, replace not applied -
//! leaves the old current authoritative and an already-archived snapshot
//! behind; retrying the update is safe because the archive write is
//! idempotent on `(resourceType, id, version)`.

use chrono::Utc;
use serde_json::{Map, Value as JsonValue};
use stratum_meta::{Meta, VersionBump, VersionId, VersionOrder};
use uuid::Uuid;

use crate::{
    db::DocumentStore,
    models::{HistoryEntry, Resource, VersionSelector},
    Error, Result,
};

pub struct VersionManager<S: DocumentStore> {
    store: S,
    history_order: VersionOrder,
}

impl<S: DocumentStore> VersionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            history_order: VersionOrder::default(),
        }
    }

    /// Override the ordering used by [`get_history`](Self::get_history).
    pub fn with_history_order(store: S, history_order: VersionOrder) -> Self {
        Self {
            store,
            history_order,
        }
    }

    /// Create a new resource at version `1.0.0`.
    ///
    /// When `id` is `None` a fresh UUID is assigned. Caller-supplied
    /// version metadata in `data` is discarded; a caller-supplied
    /// `meta.profile` is preserved. Both containers hold an independent
    /// copy of the new document on return.
    pub async fn create(
        &self,
        resource_type: &str,
        data: JsonValue,
        id: Option<String>,
    ) -> Result<Resource> {
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let (payload, profile) = split_payload(data)?;

        let version = VersionId::initial();
        let resource = Resource {
            resource_type: resource_type.to_string(),
            id,
            meta: Meta::stamped(&version, Utc::now(), profile.unwrap_or_default()),
            payload,
        };

        self.store.insert_current(resource_type, &resource).await?;
        self.store
            .insert_history(resource_type, &HistoryEntry::snapshot(resource.clone()))
            .await?;

        tracing::info!(
            resource_type,
            id = %resource.id,
            version = %resource.meta.version_id,
            "Created resource"
        );

        Ok(resource)
    }

    /// Replace a resource's payload, producing the next version.
    ///
    /// `data` is the full replacement payload (its `meta`, if any, only
    /// contributes `profile`). The resource id is preserved.
    ///
    /// # Errors
    /// * `ResourceNotFound` - no current document; nothing is written
    /// * `MalformedVersion` - the stored `meta.versionId` is corrupt
    /// * `VersionConflict` - a concurrent update won the replace
    pub async fn update(
        &self,
        resource_type: &str,
        id: &str,
        data: JsonValue,
        bump: VersionBump,
    ) -> Result<Resource> {
        let current = self
            .store
            .find_current(resource_type, id)
            .await?
            .ok_or_else(|| Error::not_found(resource_type, id))?;

        let old_version = VersionId::parse(&current.meta.version_id)?;
        let new_version = old_version.bump(bump);

        let (payload, profile) = split_payload(data)?;
        let profile = profile.unwrap_or_else(|| current.meta.profile.clone());

        // Archive first; fail closed if it does not commit.
        let archived_version = current.meta.version_id.clone();
        self.store
            .insert_history(resource_type, &HistoryEntry::snapshot(current))
            .await?;

        let updated = Resource {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            meta: Meta::stamped(&new_version, Utc::now(), profile),
            payload,
        };

        self.store
            .replace_current(resource_type, id, &archived_version, &updated)
            .await?;

        tracing::info!(
            resource_type,
            id,
            from = %archived_version,
            to = %updated.meta.version_id,
            "Updated resource"
        );

        Ok(updated)
    }

    /// Read the live document or an exact archived version.
    ///
    /// A concrete version string equal to the current version is not
    /// found through the history path: the live document is only served
    /// by the `"current"` selector.
    pub async fn get_version(
        &self,
        resource_type: &str,
        id: &str,
        selector: impl Into<VersionSelector> + Send,
    ) -> Result<Option<Resource>> {
        match selector.into() {
            VersionSelector::Current => self.store.find_current(resource_type, id).await,
            VersionSelector::Version(version) => {
                self.store
                    .find_history_version(resource_type, id, &version)
                    .await
            }
        }
    }

    /// Every archived version, ordered by version identifier descending,
    /// with the current document (tagged with its own version) prepended
    /// at index 0 when it exists.
    ///
    /// Returns an empty vec for ids that never existed.
    pub async fn get_history(&self, resource_type: &str, id: &str) -> Result<Vec<HistoryEntry>> {
        let mut entries = self
            .store
            .list_history(resource_type, id, self.history_order)
            .await?;

        if let Some(current) = self.store.find_current(resource_type, id).await? {
            entries.insert(0, HistoryEntry::snapshot(current));
        }

        Ok(entries)
    }

    /// Remove the current document. Archived versions are retained and
    /// stay readable through [`get_version`](Self::get_version) and
    /// [`get_history`](Self::get_history). There is no undelete.
    pub async fn delete(&self, resource_type: &str, id: &str) -> Result<bool> {
        let removed = self.store.delete_current(resource_type, id).await?;
        if removed {
            tracing::info!(resource_type, id, "Deleted resource");
        }
        Ok(removed)
    }

    /// Delete-all variant: remove the current document and the entire
    /// version history.
    pub async fn purge(&self, resource_type: &str, id: &str) -> Result<bool> {
        let removed_current = self.store.delete_current(resource_type, id).await?;
        let removed_history = self.store.delete_history(resource_type, id).await?;

        if removed_current || removed_history > 0 {
            tracing::info!(
                resource_type,
                id,
                history_entries = removed_history,
                "Purged resource and history"
            );
        }

        Ok(removed_current || removed_history > 0)
    }

    /// Allocate a human-readable display identifier backed by the
    /// per-resourceType atomic counter, e.g. `Observation-000042`.
    pub async fn allocate_display_id(&self, resource_type: &str) -> Result<String> {
        let value = self.store.next_sequence(resource_type).await?;
        Ok(format!("{resource_type}-{value:06}"))
    }
}

/// Split an incoming payload into the opaque body and an optional
/// caller-supplied profile list. Identity and envelope fields are owned
/// by the store and stripped from the body.
fn split_payload(data: JsonValue) -> Result<(Map<String, JsonValue>, Option<Vec<String>>)> {
    let mut object = match data {
        JsonValue::Object(map) => map,
        other => {
            return Err(Error::InvalidResource(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            )))
        }
    };

    object.remove("resourceType");
    object.remove("id");

    let profile = object.remove("meta").and_then(|meta| {
        meta.get("profile").map(|profile| {
            profile
                .as_array()
                .map(|uris| {
                    uris.iter()
                        .filter_map(|uri| uri.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        })
    });

    Ok((object, profile))
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
