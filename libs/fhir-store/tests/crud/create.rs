//! CREATE operation tests
//!
//! Tests cover:
//! - Version 1.0.0 on every create, regardless of input content
//! - Server-assigned vs caller-supplied ids
//! - Profile preservation
//! - The create-time dual write (current + independent history copy)
//! - Duplicate-id rejection

use crate::support::{allergy_intolerance, manager, observation};
use serde_json::json;
use stratum_store::Error;

#[tokio::test]
async fn create_assigns_initial_version() -> anyhow::Result<()> {
    let manager = manager();

    let created = manager
        .create("Observation", observation("8867-4", 72.0), None)
        .await?;

    assert_eq!(created.meta.version_id, "1.0.0");
    assert!(!created.id.is_empty());
    assert!(created.meta.profile.is_empty());
    assert_eq!(created.payload["status"], "final");
    Ok(())
}

#[tokio::test]
async fn create_ignores_caller_supplied_version_metadata() -> anyhow::Result<()> {
    let manager = manager();

    let created = manager
        .create(
            "Observation",
            json!({
                "meta": { "versionId": "9.9.9" },
                "status": "preliminary"
            }),
            None,
        )
        .await?;

    assert_eq!(created.meta.version_id, "1.0.0");
    Ok(())
}

#[tokio::test]
async fn create_honors_caller_supplied_id() -> anyhow::Result<()> {
    let manager = manager();

    let created = manager
        .create(
            "AllergyIntolerance",
            allergy_intolerance("low"),
            Some("allergy-42".to_string()),
        )
        .await?;

    assert_eq!(created.id, "allergy-42");

    let read_back = manager
        .get_version("AllergyIntolerance", "allergy-42", "current")
        .await?;
    assert_eq!(read_back, Some(created));
    Ok(())
}

#[tokio::test]
async fn create_preserves_caller_profile() -> anyhow::Result<()> {
    let manager = manager();

    let mut data = allergy_intolerance("high");
    data["meta"] = json!({
        "profile": ["http://hl7.org/fhir/StructureDefinition/AllergyIntolerance"]
    });

    let created = manager.create("AllergyIntolerance", data, None).await?;
    assert_eq!(
        created.meta.profile,
        vec!["http://hl7.org/fhir/StructureDefinition/AllergyIntolerance".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn create_writes_both_containers() -> anyhow::Result<()> {
    let manager = manager();

    let created = manager
        .create("Observation", observation("8867-4", 64.0), None)
        .await?;

    let history = manager.get_history("Observation", &created.id).await?;
    // Current prepended at index 0, plus the create-time snapshot.
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, "1.0.0");
    assert_eq!(history[1].version, "1.0.0");
    assert_eq!(history[1].resource, created);
    Ok(())
}

#[tokio::test]
async fn create_rejects_duplicate_id() -> anyhow::Result<()> {
    let manager = manager();

    manager
        .create(
            "Observation",
            observation("8867-4", 72.0),
            Some("obs-1".to_string()),
        )
        .await?;

    let err = manager
        .create(
            "Observation",
            observation("8867-4", 80.0),
            Some("obs-1".to_string()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AlreadyExists { .. }));

    // The original document is untouched.
    let current = manager
        .get_version("Observation", "obs-1", "current")
        .await?
        .expect("current document");
    assert_eq!(current.payload["valueQuantity"]["value"], 72.0);
    Ok(())
}

#[tokio::test]
async fn create_rejects_non_object_payloads() {
    let manager = manager();

    let err = manager
        .create("Observation", json!("not a document"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidResource(_)));
}

#[tokio::test]
async fn generated_ids_are_unique() -> anyhow::Result<()> {
    let manager = manager();

    let first = manager
        .create("Observation", observation("8867-4", 70.0), None)
        .await?;
    let second = manager
        .create("Observation", observation("8867-4", 71.0), None)
        .await?;

    assert_ne!(first.id, second.id);
    Ok(())
}
