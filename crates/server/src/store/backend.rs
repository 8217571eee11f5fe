//! Document backend port.
//!
//! Both physical stores implement this trait; everything above it is
//! backend-agnostic. Entities are stored as JSON documents in named
//! collections, the way the remote document database holds them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::StoreError;

/// A stored document: one entity, serialized.
#[derive(Debug, Clone)]
pub struct Document {
    /// Entity identifier (application-generated, not a storage key).
    pub id: Uuid,
    /// Optional per-collection uniqueness key (user email, content key,
    /// marketplace item request id).
    pub unique_key: Option<String>,
    /// The serialized entity. Always a JSON object.
    pub body: Value,
    /// Creation timestamp, mirrored from the entity.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp, mirrored from the entity.
    pub updated_at: DateTime<Utc>,
}

/// Equality filter over top-level document fields.
///
/// This is deliberately not a query language: the facade supports exact
/// matches only, which is all the route layer and the workflow need.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Vec<(String, Value)>,
}

impl Filter {
    /// An empty filter matching every document.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl serde::Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.push((field.into(), value));
        self
    }

    /// Whether the filter has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check a document body against the filter.
    #[must_use]
    pub fn matches(&self, body: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, value)| body.get(field) == Some(value))
    }

    /// The filter as a JSON object, suitable for a JSONB containment query.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        )
    }
}

/// Port implemented by both the remote document store and the in-process
/// fallback store.
///
/// Contract notes:
/// - `list` returns documents newest-first (by creation time) and never
///   fails on an empty collection.
/// - `insert` fails with [`StoreError::Conflict`] when the id or the
///   unique key is already taken in the collection.
/// - `replace` and `remove` return `false` when no document matched, so
///   the caller decides whether that is a `NotFound`.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// List documents in a collection, newest first.
    async fn list(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Fetch a single document by id.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Insert a new document.
    async fn insert(&self, collection: &str, doc: Document) -> Result<(), StoreError>;

    /// Replace an existing document. Returns `false` when the id is absent.
    async fn replace(&self, collection: &str, doc: Document) -> Result<bool, StoreError>;

    /// Delete a document. Returns `false` when the id is absent.
    async fn remove(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;
}
