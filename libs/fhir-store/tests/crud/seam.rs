//! Storage-seam guarantees: the compare-and-swap replace, the idempotent
//! archive write, and atomic sequence allocation.

use std::collections::HashSet;

use crate::support::{manager_over, observation};
use serde_json::json;
use stratum_meta::{VersionBump, VersionOrder};
use stratum_store::{DocumentStore, Error, HistoryEntry, MemoryDocumentStore, Resource};

fn resource(id: &str, version: &str, note: &str) -> Resource {
    Resource::from_document(json!({
        "resourceType": "Observation",
        "id": id,
        "meta": {
            "versionId": version,
            "lastUpdated": "2024-05-14T09:30:00Z",
            "profile": []
        },
        "note": note
    }))
    .unwrap()
}

#[tokio::test]
async fn replace_rejects_a_stale_expected_version() -> anyhow::Result<()> {
    let store = MemoryDocumentStore::new();
    store
        .insert_current("Observation", &resource("obs-1", "1.1.0", "live"))
        .await?;

    // A writer that read 1.0.0 lost the race against whoever produced 1.1.0.
    let err = store
        .replace_current(
            "Observation",
            "obs-1",
            "1.0.0",
            &resource("obs-1", "1.2.0", "stale write"),
        )
        .await
        .unwrap_err();

    match err {
        Error::VersionConflict {
            expected, actual, ..
        } => {
            assert_eq!(expected, "1.0.0");
            assert_eq!(actual, "1.1.0");
        }
        other => panic!("expected VersionConflict, got {other:?}"),
    }

    // The losing write changed nothing.
    let current = store.find_current("Observation", "obs-1").await?.unwrap();
    assert_eq!(current.payload["note"], "live");
    Ok(())
}

#[tokio::test]
async fn concurrent_updates_surface_a_conflict_instead_of_duplicating_versions()
-> anyhow::Result<()> {
    let store = MemoryDocumentStore::new();
    let manager = manager_over(store.clone());

    let created = manager
        .create("Observation", observation("8867-4", 72.0), None)
        .await?;

    // Interleave two updates computed from the same pre-update state: the
    // second replace must fail rather than silently win.
    let snapshot = store
        .find_current("Observation", &created.id)
        .await?
        .unwrap();

    manager
        .update(
            "Observation",
            &created.id,
            observation("8867-4", 75.0),
            VersionBump::Minor,
        )
        .await?;

    let err = store
        .replace_current(
            "Observation",
            &created.id,
            &snapshot.meta.version_id,
            &resource(&created.id, "1.1.0", "raced"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::VersionConflict { .. }));
    Ok(())
}

#[tokio::test]
async fn archive_write_is_idempotent_per_version() -> anyhow::Result<()> {
    let store = MemoryDocumentStore::new();

    let first = HistoryEntry::snapshot(resource("obs-1", "1.0.0", "original snapshot"));
    let retry = HistoryEntry::snapshot(resource("obs-1", "1.0.0", "retried snapshot"));

    store.insert_history("Observation", &first).await?;
    store.insert_history("Observation", &retry).await?;

    let entries = store
        .list_history("Observation", "obs-1", VersionOrder::Lexical)
        .await?;
    assert_eq!(entries.len(), 1);
    // The first archived snapshot of a version wins.
    assert_eq!(entries[0].resource.payload["note"], "original snapshot");
    Ok(())
}

#[tokio::test]
async fn sequences_are_unique_and_dense_under_concurrency() -> anyhow::Result<()> {
    let store = MemoryDocumentStore::new();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.next_sequence("AllergyIntolerance").await
        }));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        let value = handle.await??;
        assert!(seen.insert(value), "duplicate sequence value {value}");
    }

    assert_eq!(seen.len(), 32);
    assert_eq!(seen.iter().min(), Some(&1));
    assert_eq!(seen.iter().max(), Some(&32));

    // Counters are independent per resource type.
    assert_eq!(store.next_sequence("Observation").await?, 1);
    Ok(())
}

#[tokio::test]
async fn display_identifiers_are_zero_padded_and_sequential() -> anyhow::Result<()> {
    let manager = manager_over(MemoryDocumentStore::new());

    assert_eq!(
        manager.allocate_display_id("Observation").await?,
        "Observation-000001"
    );
    assert_eq!(
        manager.allocate_display_id("Observation").await?,
        "Observation-000002"
    );
    assert_eq!(
        manager.allocate_display_id("AllergyIntolerance").await?,
        "AllergyIntolerance-000001"
    );
    Ok(())
}
