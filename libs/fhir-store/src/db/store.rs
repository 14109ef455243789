//! PostgreSQL document store
//!
//! Each logical container from the storage contract maps to one table:
//! `resources` for current documents, `resource_history` for archived
//! snapshots, `sequences` for the per-resourceType counters. Rows carry
//! the full document as JSONB plus extracted key columns; the `version`
//! key on `resource_history` is what makes the archive write idempotent.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use stratum_meta::VersionOrder;

use crate::{
    config::DatabaseConfig,
    db::traits::DocumentStore,
    models::{HistoryEntry, Resource},
    Error, Result,
};

#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Open a connection pool against the configured database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(config.pool_min_size)
            .max_connections(config.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(Error::Database)?;

        tracing::info!(
            pool_max_size = config.pool_max_size,
            "Connected to document store"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool (e.g. one shared with an embedding process).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {e}")))?;

        tracing::info!("Document store schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn decode(document: JsonValue) -> Result<Resource> {
        Resource::from_document(document)
            .map_err(|e| Error::Internal(format!("Corrupt stored document: {e}")))
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn find_current(&self, resource_type: &str, id: &str) -> Result<Option<Resource>> {
        let row = sqlx::query(
            "SELECT resource
             FROM resources
             WHERE resource_type = $1 AND id = $2",
        )
        .bind(resource_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|row| Self::decode(row.get("resource"))).transpose()
    }

    async fn insert_current(&self, resource_type: &str, resource: &Resource) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO resources (resource_type, id, version_id, resource, last_updated)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(resource_type)
        .bind(&resource.id)
        .bind(&resource.meta.version_id)
        .bind(resource.to_document())
        .bind(resource.meta.last_updated)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(Error::already_exists(resource_type, &resource.id))
            }
            Err(e) => Err(Error::Database(e)),
        }
    }

    async fn replace_current(
        &self,
        resource_type: &str,
        id: &str,
        expected_version: &str,
        resource: &Resource,
    ) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE resources
             SET version_id = $4, resource = $5, last_updated = $6
             WHERE resource_type = $1 AND id = $2 AND version_id = $3",
        )
        .bind(resource_type)
        .bind(id)
        .bind(expected_version)
        .bind(&resource.meta.version_id)
        .bind(resource.to_document())
        .bind(resource.meta.last_updated)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        if updated > 0 {
            return Ok(());
        }

        // The guarded update matched nothing: either the document is gone
        // or a concurrent writer moved it past `expected_version`.
        let actual = sqlx::query(
            "SELECT version_id FROM resources
             WHERE resource_type = $1 AND id = $2",
        )
        .bind(resource_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match actual {
            None => Err(Error::not_found(resource_type, id)),
            Some(row) => Err(Error::VersionConflict {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                expected: expected_version.to_string(),
                actual: row.get("version_id"),
            }),
        }
    }

    async fn delete_current(&self, resource_type: &str, id: &str) -> Result<bool> {
        let deleted = sqlx::query(
            "DELETE FROM resources
             WHERE resource_type = $1 AND id = $2",
        )
        .bind(resource_type)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        Ok(deleted > 0)
    }

    async fn insert_history(&self, resource_type: &str, entry: &HistoryEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO resource_history (resource_type, id, version, resource, archived_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (resource_type, id, version) DO NOTHING",
        )
        .bind(resource_type)
        .bind(&entry.resource.id)
        .bind(&entry.version)
        .bind(entry.resource.to_document())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn find_history_version(
        &self,
        resource_type: &str,
        id: &str,
        version: &str,
    ) -> Result<Option<Resource>> {
        let row = sqlx::query(
            "SELECT resource
             FROM resource_history
             WHERE resource_type = $1 AND id = $2 AND version = $3",
        )
        .bind(resource_type)
        .bind(id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|row| Self::decode(row.get("resource"))).transpose()
    }

    async fn list_history(
        &self,
        resource_type: &str,
        id: &str,
        order: VersionOrder,
    ) -> Result<Vec<HistoryEntry>> {
        // The native sort is a plain string comparison on the version
        // column ("C" pins byte order regardless of database locale).
        let rows = sqlx::query(
            r#"SELECT version, resource
               FROM resource_history
               WHERE resource_type = $1 AND id = $2
               ORDER BY version COLLATE "C" DESC"#,
        )
        .bind(resource_type)
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(HistoryEntry {
                version: row.get("version"),
                resource: Self::decode(row.get("resource"))?,
            });
        }

        if order == VersionOrder::Numeric {
            entries.sort_by(|a, b| order.compare(&b.version, &a.version));
        }

        Ok(entries)
    }

    async fn delete_history(&self, resource_type: &str, id: &str) -> Result<u64> {
        let deleted = sqlx::query(
            "DELETE FROM resource_history
             WHERE resource_type = $1 AND id = $2",
        )
        .bind(resource_type)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        Ok(deleted)
    }

    async fn next_sequence(&self, resource_type: &str) -> Result<i64> {
        let row = sqlx::query(
            "INSERT INTO sequences (resource_type, next_value)
             VALUES ($1, 1)
             ON CONFLICT (resource_type)
             DO UPDATE SET next_value = sequences.next_value + 1
             RETURNING next_value",
        )
        .bind(resource_type)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.get("next_value"))
    }
}
