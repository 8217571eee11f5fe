//! Typed collection handles over the document backend.
//!
//! [`Documents`] implements the uniform per-entity contract - list, get,
//! create, update, delete - generically, so every entity behaves the same
//! way from either backend: ids are assigned at create when absent,
//! entities validate before hitting the store, patches change only the
//! supplied fields, and timestamps are owned here rather than by callers.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::StoreError;
use super::backend::{Document, DocumentBackend, Filter};

/// Implemented by every stored entity type.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Collection name in the document store.
    const COLLECTION: &'static str;

    /// Fields owned by dedicated write paths (workflow transitions, the
    /// password flow). A patch naming one of these is a validation error.
    const GUARDED_FIELDS: &'static [&'static str] = &[];

    /// The entity identifier.
    fn id(&self) -> Uuid;

    /// Optional write-time uniqueness key (user email, content key,
    /// marketplace item request id).
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Check required fields. Runs on create and after every patch.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` describing the first missing or
    /// malformed field.
    fn validate(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Typed handle for one entity collection.
pub struct Documents<T> {
    backend: Arc<dyn DocumentBackend>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Documents<T> {
    pub(crate) fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    /// List entities matching `filter`, newest first. An empty collection
    /// is an empty `Vec`, never an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the backend fails, or
    /// `StoreError::DataCorruption` if a stored document no longer
    /// deserializes.
    pub async fn list(&self, filter: Filter) -> Result<Vec<T>, StoreError> {
        let docs = self.backend.list(T::COLLECTION, &filter).await?;
        docs.into_iter().map(|doc| decode_stored(doc.body)).collect()
    }

    /// Fetch an entity, returning `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` or `StoreError::DataCorruption`.
    pub async fn find(&self, id: impl Into<Uuid> + Send) -> Result<Option<T>, StoreError> {
        let doc = self.backend.get(T::COLLECTION, id.into()).await?;
        doc.map(|doc| decode_stored(doc.body)).transpose()
    }

    /// Fetch an entity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when absent.
    pub async fn get(&self, id: impl Into<Uuid> + Send) -> Result<T, StoreError> {
        self.find(id).await?.ok_or(StoreError::NotFound)
    }

    /// Insert a new entity after validating it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for missing/malformed required
    /// fields and `StoreError::Conflict` when the id or unique key is
    /// already taken.
    pub async fn create(&self, entity: T) -> Result<T, StoreError> {
        entity.validate()?;
        let doc = encode(&entity)?;
        self.backend.insert(T::COLLECTION, doc).await?;
        Ok(entity)
    }

    /// Apply a partial patch: only the supplied fields change.
    ///
    /// `id`, `created_at`, and `updated_at` in the patch are ignored;
    /// guarded fields are rejected. The patched entity re-validates and
    /// its update timestamp is bumped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the id does not exist,
    /// `StoreError::Validation` when the patch is not an object, names a
    /// guarded field, or produces an invalid entity, and
    /// `StoreError::Conflict` when a changed unique key is taken.
    pub async fn update(&self, id: impl Into<Uuid> + Send, patch: Value) -> Result<T, StoreError> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::Validation(
                "patch must be a JSON object".to_string(),
            ));
        };

        let id = id.into();
        let current = self
            .backend
            .get(T::COLLECTION, id)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut body = current.body;
        let Some(map) = body.as_object_mut() else {
            return Err(StoreError::DataCorruption(format!(
                "stored document {id} in {collection} is not an object",
                collection = T::COLLECTION
            )));
        };

        for (field, value) in patch {
            if matches!(field.as_str(), "id" | "created_at" | "updated_at") {
                continue;
            }
            if T::GUARDED_FIELDS.contains(&field.as_str()) {
                return Err(StoreError::Validation(format!(
                    "field `{field}` cannot be patched directly"
                )));
            }
            map.insert(field, value);
        }
        map.insert(
            "updated_at".to_string(),
            serde_json::to_value(Utc::now()).map_err(|e| StoreError::Validation(e.to_string()))?,
        );

        let entity: T = decode_patched(body)?;
        entity.validate()?;
        self.save(&entity).await?;
        Ok(entity)
    }

    /// Delete an entity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when nothing matched, so callers can
    /// distinguish "already gone" from "deleted".
    pub async fn delete(&self, id: impl Into<Uuid> + Send) -> Result<(), StoreError> {
        if self.backend.remove(T::COLLECTION, id.into()).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    /// Persist an already-validated entity over its stored version.
    ///
    /// Used by workflow transitions, which own their timestamp stamps.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the entity no longer exists.
    pub(crate) async fn save(&self, entity: &T) -> Result<(), StoreError> {
        entity.validate()?;
        let doc = encode(entity)?;
        if self.backend.replace(T::COLLECTION, doc).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

/// Serialize an entity into its document form.
fn encode<T: Entity>(entity: &T) -> Result<Document, StoreError> {
    let body = serde_json::to_value(entity)
        .map_err(|e| StoreError::DataCorruption(format!("failed to serialize entity: {e}")))?;

    let created_at = timestamp(&body, "created_at")?;
    let updated_at = timestamp(&body, "updated_at")?;

    Ok(Document {
        id: entity.id(),
        unique_key: entity.unique_key(),
        body,
        created_at,
        updated_at,
    })
}

fn timestamp(body: &Value, field: &str) -> Result<chrono::DateTime<Utc>, StoreError> {
    body.get(field)
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .ok_or_else(|| StoreError::DataCorruption(format!("entity is missing `{field}`")))
}

/// Deserialize a document read back from the store.
fn decode_stored<T: Entity>(body: Value) -> Result<T, StoreError> {
    serde_json::from_value(body).map_err(|e| {
        StoreError::DataCorruption(format!(
            "invalid document in {collection}: {e}",
            collection = T::COLLECTION
        ))
    })
}

/// Deserialize a patched document - failures are the caller's fault.
fn decode_patched<T: Entity>(body: Value) -> Result<T, StoreError> {
    serde_json::from_value(body).map_err(|e| StoreError::Validation(e.to_string()))
}
