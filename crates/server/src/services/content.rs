//! Content service.
//!
//! Keyed singleton writes over the CMS collection: setting a key that
//! already exists updates it in place, deleting removes it. Both paths
//! publish a change event, best-effort, so connected clients can refresh.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::models::content::{ContentEntry, ContentValue};
use crate::notify::{Notifier, events};
use crate::store::backend::Filter;
use crate::store::{Store, StoreError};

/// Parameters for setting a content block.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SetContent {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(flatten)]
    pub value: ContentValue,
}

/// CMS content service.
pub struct ContentService {
    store: Store,
    notifier: Arc<dyn Notifier>,
}

impl ContentService {
    /// Create a new content service.
    pub fn new(store: Store, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Create or update the block stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when the key is empty.
    #[instrument(skip(self, params))]
    pub async fn set(&self, key: &str, params: SetContent) -> Result<ContentEntry, StoreError> {
        let entry = match self.find(key).await? {
            Some(mut entry) => {
                if let Some(section) = params.section {
                    entry.section = section;
                }
                entry.value = params.value;
                entry.updated_at = Utc::now();
                self.store.content().save(&entry).await?;
                entry
            }
            None => {
                let entry = ContentEntry::new(key.to_string(), params.section, params.value)?;
                self.store.content().create(entry).await?
            }
        };

        info!(key, section = %entry.section, "content entry updated");
        self.publish(events::CONTENT_UPDATED, json!({ "key": entry.key })).await;
        Ok(entry)
    }

    /// Fetch the block stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the key has no block.
    pub async fn get(&self, key: &str) -> Result<ContentEntry, StoreError> {
        self.find(key).await?.ok_or(StoreError::NotFound)
    }

    /// List every block, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error if the listing fails.
    pub async fn list(&self) -> Result<Vec<ContentEntry>, StoreError> {
        self.store.content().list(Filter::new()).await
    }

    /// List the blocks of one section, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error if the listing fails.
    pub async fn section(&self, section: &str) -> Result<Vec<ContentEntry>, StoreError> {
        self.store
            .content()
            .list(Filter::new().eq("section", section))
            .await
    }

    /// Delete the block stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the key has no block.
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let entry = self.get(key).await?;
        self.store.content().delete(entry.id).await?;

        info!(key, "content entry deleted");
        self.publish(events::CONTENT_DELETED, json!({ "key": key })).await;
        Ok(())
    }

    async fn find(&self, key: &str) -> Result<Option<ContentEntry>, StoreError> {
        let mut entries = self
            .store
            .content()
            .list(Filter::new().eq("key", key))
            .await?;
        Ok(entries.pop())
    }

    async fn publish(&self, event: &str, payload: Value) {
        if let Err(e) = self.notifier.publish(event, payload).await {
            warn!(event, error = %e, "failed to publish notification");
        }
    }
}
