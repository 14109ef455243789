//! History listing tests (`get_history`)
//!
//! Tests cover:
//! - Current document prepended at index 0
//! - Completeness after a sequence of updates
//! - The lexical descending order (default) and its numeric alternative
//! - Empty result for ids that never existed

use crate::support::{manager, numeric_manager, observation};
use stratum_meta::VersionBump;

#[tokio::test]
async fn current_document_is_prepended_with_its_own_version() -> anyhow::Result<()> {
    let manager = manager();
    let created = manager
        .create("Observation", observation("8867-4", 72.0), None)
        .await?;

    let updated = manager
        .update(
            "Observation",
            &created.id,
            observation("8867-4", 75.0),
            VersionBump::Minor,
        )
        .await?;

    let history = manager.get_history("Observation", &created.id).await?;
    assert_eq!(history[0].version, "1.1.0");
    assert_eq!(history[0].resource, updated);
    Ok(())
}

#[tokio::test]
async fn history_is_complete_after_a_sequence_of_updates() -> anyhow::Result<()> {
    let manager = manager();
    let created = manager
        .create("Observation", observation("8867-4", 72.0), None)
        .await?;

    let n = 4;
    for step in 0..n {
        manager
            .update(
                "Observation",
                &created.id,
                observation("8867-4", 72.0 + step as f64),
                VersionBump::Minor,
            )
            .await?;
    }

    let history = manager.get_history("Observation", &created.id).await?;
    // Current at index 0, then one archived entry per superseded version.
    assert_eq!(history.len(), n + 1);
    assert_eq!(history[0].version, "1.4.0");

    let archived: Vec<&str> = history[1..].iter().map(|e| e.version.as_str()).collect();
    assert_eq!(archived, vec!["1.3.0", "1.2.0", "1.1.0", "1.0.0"]);
    Ok(())
}

#[tokio::test]
async fn default_order_is_the_lexical_string_sort() -> anyhow::Result<()> {
    let manager = manager();
    let created = manager
        .create("Observation", observation("8867-4", 72.0), None)
        .await?;

    // Push the major component into double digits.
    for _ in 0..10 {
        manager
            .update(
                "Observation",
                &created.id,
                observation("8867-4", 72.0),
                VersionBump::Major,
            )
            .await?;
    }

    let history = manager.get_history("Observation", &created.id).await?;
    assert_eq!(history[0].version, "11.0.0", "current is prepended first");

    let archived: Vec<&str> = history[1..].iter().map(|e| e.version.as_str()).collect();
    // String comparison: "9.0.0" > … > "2.0.0" > "10.0.0" > "1.0.0".
    assert_eq!(
        archived,
        vec![
            "9.0.0", "8.0.0", "7.0.0", "6.0.0", "5.0.0", "4.0.0", "3.0.0", "2.0.0", "10.0.0",
            "1.0.0"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn numeric_order_sorts_by_parsed_components() -> anyhow::Result<()> {
    let manager = numeric_manager();
    let created = manager
        .create("Observation", observation("8867-4", 72.0), None)
        .await?;

    for _ in 0..10 {
        manager
            .update(
                "Observation",
                &created.id,
                observation("8867-4", 72.0),
                VersionBump::Major,
            )
            .await?;
    }

    let history = manager.get_history("Observation", &created.id).await?;
    let archived: Vec<&str> = history[1..].iter().map(|e| e.version.as_str()).collect();
    assert_eq!(
        archived,
        vec![
            "10.0.0", "9.0.0", "8.0.0", "7.0.0", "6.0.0", "5.0.0", "4.0.0", "3.0.0", "2.0.0",
            "1.0.0"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn history_of_an_unknown_id_is_an_empty_sequence() -> anyhow::Result<()> {
    let manager = manager();
    let history = manager.get_history("Observation", "never-existed").await?;
    assert!(history.is_empty());
    Ok(())
}
