//! In-process fallback store.
//!
//! A process-local ordered collection per entity type, used when the
//! database is unreachable at startup. Lives for the process lifetime;
//! nothing is reconciled back to the remote store if connectivity
//! returns later.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::StoreError;
use super::backend::{Document, DocumentBackend, Filter};

/// Process-local document store.
///
/// Documents are kept in insertion order, which for this store equals
/// creation order, so reverse iteration yields the newest-first listing
/// the backend contract requires.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, MemCollection>>,
}

#[derive(Debug, Default)]
struct MemCollection {
    docs: Vec<Document>,
    unique_keys: HashSet<String>,
}

impl MemoryBackend {
    /// Create an empty in-process store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, MemCollection>>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::DataCorruption("in-process store lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, MemCollection>>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::DataCorruption("in-process store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn list(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.read()?;
        let Some(coll) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(coll
            .docs
            .iter()
            .rev()
            .filter(|doc| filter.matches(&doc.body))
            .cloned()
            .collect())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|coll| coll.docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<(), StoreError> {
        let mut collections = self.write()?;
        let coll = collections.entry(collection.to_string()).or_default();

        if coll.docs.iter().any(|existing| existing.id == doc.id) {
            return Err(StoreError::Conflict(format!(
                "document {id} already exists in {collection}",
                id = doc.id
            )));
        }
        if let Some(key) = &doc.unique_key {
            if coll.unique_keys.contains(key) {
                return Err(StoreError::Conflict(format!(
                    "unique key already taken in {collection}"
                )));
            }
            coll.unique_keys.insert(key.clone());
        }

        coll.docs.push(doc);
        Ok(())
    }

    async fn replace(&self, collection: &str, doc: Document) -> Result<bool, StoreError> {
        let mut collections = self.write()?;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(index) = coll.docs.iter().position(|existing| existing.id == doc.id) else {
            return Ok(false);
        };

        let previous_key = coll
            .docs
            .get(index)
            .and_then(|existing| existing.unique_key.clone());

        if doc.unique_key != previous_key {
            if let Some(key) = &doc.unique_key {
                if coll.unique_keys.contains(key) {
                    return Err(StoreError::Conflict(format!(
                        "unique key already taken in {collection}"
                    )));
                }
                coll.unique_keys.insert(key.clone());
            }
            if let Some(key) = &previous_key {
                coll.unique_keys.remove(key);
            }
        }

        if let Some(slot) = coll.docs.get_mut(index) {
            *slot = doc;
        }
        Ok(true)
    }

    async fn remove(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.write()?;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(index) = coll.docs.iter().position(|existing| existing.id == id) else {
            return Ok(false);
        };

        let removed = coll.docs.remove(index);
        if let Some(key) = &removed.unique_key {
            coll.unique_keys.remove(key);
        }
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn doc(unique_key: Option<&str>, body: serde_json::Value) -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            unique_key: unique_key.map(String::from),
            body,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let backend = MemoryBackend::new();
        let document = doc(None, json!({"title": "Morning Calm"}));
        let id = document.id;

        backend.insert("meditations", document).await.unwrap();
        let fetched = backend.get("meditations", id).await.unwrap().unwrap();
        assert_eq!(fetched.body, json!({"title": "Morning Calm"}));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let backend = MemoryBackend::new();
        let fetched = backend.get("meditations", Uuid::new_v4()).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let backend = MemoryBackend::new();
        let first = doc(None, json!({"title": "first"}));
        let second = doc(None, json!({"title": "second"}));

        backend.insert("sounds", first).await.unwrap();
        backend.insert("sounds", second).await.unwrap();

        let listed = backend.list("sounds", &Filter::new()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].body, json!({"title": "second"}));
        assert_eq!(listed[1].body, json!({"title": "first"}));
    }

    #[tokio::test]
    async fn test_list_unknown_collection_is_empty() {
        let backend = MemoryBackend::new();
        let listed = backend.list("nowhere", &Filter::new()).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_unique_key_conflict_on_insert() {
        let backend = MemoryBackend::new();
        backend
            .insert("users", doc(Some("a@b.c"), json!({"email": "a@b.c"})))
            .await
            .unwrap();

        let result = backend
            .insert("users", doc(Some("a@b.c"), json!({"email": "a@b.c"})))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_frees_unique_key() {
        let backend = MemoryBackend::new();
        let document = doc(Some("a@b.c"), json!({"email": "a@b.c"}));
        let id = document.id;

        backend.insert("users", document).await.unwrap();
        assert!(backend.remove("users", id).await.unwrap());

        // Key is reusable once the holder is gone
        backend
            .insert("users", doc(Some("a@b.c"), json!({"email": "a@b.c"})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_replace_missing_returns_false() {
        let backend = MemoryBackend::new();
        let replaced = backend
            .replace("users", doc(None, json!({})))
            .await
            .unwrap();
        assert!(!replaced);
    }

    #[tokio::test]
    async fn test_replace_unique_key_change() {
        let backend = MemoryBackend::new();
        let mut document = doc(Some("old@b.c"), json!({"email": "old@b.c"}));
        backend.insert("users", document.clone()).await.unwrap();

        document.unique_key = Some("new@b.c".to_string());
        assert!(backend.replace("users", document).await.unwrap());

        // Old key released, new key held
        backend
            .insert("users", doc(Some("old@b.c"), json!({})))
            .await
            .unwrap();
        let conflict = backend.insert("users", doc(Some("new@b.c"), json!({}))).await;
        assert!(matches!(conflict, Err(StoreError::Conflict(_))));
    }
}
