//! `PostgreSQL` document backend.
//!
//! Entities live in a single JSONB `documents` table keyed by
//! `(collection, id)`, with a partial unique index on `unique_key`
//! backing write-time uniqueness (user email, content key, marketplace
//! item request id). Queries are bound at runtime because the table is
//! shared by every collection.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::StoreError;
use super::backend::{Document, DocumentBackend, Filter};

/// Document store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Connect to the database and apply embedded migrations.
    ///
    /// The whole attempt is bounded by `timeout`; callers treat failure as
    /// the signal to fall back to the in-process store. This is the only
    /// place a connection error surfaces - per-operation errors later are
    /// `Database`, not `Connection`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the database cannot be reached
    /// or migrated within the timeout.
    pub async fn connect(
        database_url: &secrecy::SecretString,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let connect = async {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .min_connections(2)
                .acquire_timeout(timeout)
                .connect(database_url.expose_secret())
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            Ok::<_, StoreError>(pool)
        };

        let pool = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| StoreError::Connection(format!("timed out after {timeout:?}")))??;

        Ok(Self { pool })
    }

    /// Access the underlying pool (readiness checks).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    Ok(Document {
        id: row.try_get::<Uuid, _>("id")?,
        unique_key: row.try_get::<Option<String>, _>("unique_key")?,
        body: row.try_get::<serde_json::Value, _>("doc")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn map_insert_error(e: sqlx::Error, collection: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(format!("unique key already taken in {collection}"));
    }
    StoreError::Database(e)
}

#[async_trait]
impl DocumentBackend for PgBackend {
    async fn list(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let rows = if filter.is_empty() {
            sqlx::query(
                r"
                SELECT id, unique_key, doc, created_at, updated_at
                FROM documents
                WHERE collection = $1
                ORDER BY created_at DESC, id
                ",
            )
            .bind(collection)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r"
                SELECT id, unique_key, doc, created_at, updated_at
                FROM documents
                WHERE collection = $1 AND doc @> $2
                ORDER BY created_at DESC, id
                ",
            )
            .bind(collection)
            .bind(filter.to_json())
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter().map(row_to_document).collect()
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, unique_key, doc, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, unique_key, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(collection)
        .bind(doc.id)
        .bind(&doc.unique_key)
        .bind(&doc.body)
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, collection))?;

        Ok(())
    }

    async fn replace(&self, collection: &str, doc: Document) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET unique_key = $3, doc = $4, updated_at = $5
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(doc.id)
        .bind(&doc.unique_key)
        .bind(&doc.body)
        .bind(doc.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, collection))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
