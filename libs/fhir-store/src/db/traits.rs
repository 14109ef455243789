//! Core trait for versioned document storage backends

use crate::{
    models::{HistoryEntry, Resource},
    Result,
};
use async_trait::async_trait;
use stratum_meta::VersionOrder;

/// Minimal storage contract required by the version manager.
///
/// Per resource type the backend provides two logical containers: a
/// "current" container holding at most one live document per id, and a
/// "history" container holding one immutable snapshot per archived
/// version. Any backend (PostgreSQL, in-memory, a remote document store)
/// can implement this trait; each method must be atomic at
/// single-document granularity, but no atomicity is assumed across
/// methods or containers.
#[async_trait]
pub trait DocumentStore: Send + Sync + Clone {
    /// Read the current document for an id.
    ///
    /// # Returns
    /// * `Ok(Some(resource))` - a live document exists
    /// * `Ok(None)` - the id has no current document
    async fn find_current(&self, resource_type: &str, id: &str) -> Result<Option<Resource>>;

    /// Insert a new current document.
    ///
    /// # Errors
    /// * `AlreadyExists` - the id already has a current document
    async fn insert_current(&self, resource_type: &str, resource: &Resource) -> Result<()>;

    /// Replace the current document, guarded by a compare-and-swap on the
    /// stored `meta.versionId`.
    ///
    /// # Arguments
    /// * `expected_version` - the `versionId` the caller read before
    ///   computing the replacement
    ///
    /// # Errors
    /// * `ResourceNotFound` - the id has no current document
    /// * `VersionConflict` - a concurrent writer replaced the document
    ///   after the caller's read
    async fn replace_current(
        &self,
        resource_type: &str,
        id: &str,
        expected_version: &str,
        resource: &Resource,
    ) -> Result<()>;

    /// Remove the current document. History is untouched.
    ///
    /// # Returns
    /// `true` when a document was removed, `false` when the id had none.
    async fn delete_current(&self, resource_type: &str, id: &str) -> Result<bool>;

    /// Archive a snapshot into the history container.
    ///
    /// Idempotent on `(resourceType, id, version)`: re-archiving an
    /// already-archived version is a no-op, which makes the
    /// archive-then-replace sequence safe to retry after a partial
    /// failure.
    async fn insert_history(&self, resource_type: &str, entry: &HistoryEntry) -> Result<()>;

    /// Exact `(id, version)` lookup in the history container.
    ///
    /// The current document is never visible through this path; it lives
    /// only in the current container.
    async fn find_history_version(
        &self,
        resource_type: &str,
        id: &str,
        version: &str,
    ) -> Result<Option<Resource>>;

    /// All archived snapshots for an id, ordered by version identifier
    /// descending under the given ordering.
    ///
    /// # Returns
    /// Empty vec when the id has no history. Insertion order is not
    /// meaningful; only the requested ordering is guaranteed.
    async fn list_history(
        &self,
        resource_type: &str,
        id: &str,
        order: VersionOrder,
    ) -> Result<Vec<HistoryEntry>>;

    /// Remove every archived snapshot for an id.
    ///
    /// # Returns
    /// The number of snapshots removed.
    async fn delete_history(&self, resource_type: &str, id: &str) -> Result<u64>;

    /// Atomically allocate the next value of the per-resourceType
    /// counter, starting at 1.
    ///
    /// This is the one operation that requires an explicit atomic
    /// upsert-and-increment primitive from the backend: concurrent
    /// allocations must never observe the same value.
    async fn next_sequence(&self, resource_type: &str) -> Result<i64>;
}
