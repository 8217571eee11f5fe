//! CMS content entries.
//!
//! Keyed singleton content blocks - a hero headline, a banner image, a
//! pricing figure - grouped by section. The key is unique across the
//! collection (backed by the store's unique-key mechanism), so writes to
//! an existing key update it in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use halcyon_core::ContentEntryId;

use crate::store::StoreError;
use crate::store::collection::Entity;

/// Default grouping for entries that do not name a section.
fn default_section() -> String {
    "general".to_string()
}

/// The typed value of a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ContentValue {
    /// Plain text.
    Text(String),
    /// Image URL.
    Image(String),
    /// Raw HTML fragment.
    Html(String),
    /// Arbitrary structured data.
    Json(Value),
    /// Numeric value.
    Number(f64),
}

/// A keyed content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: ContentEntryId,
    pub key: String,
    #[serde(default = "default_section")]
    pub section: String,
    #[serde(flatten)]
    pub value: ContentValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentEntry {
    /// Build a new content entry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when the key is empty.
    pub fn new(key: String, section: Option<String>, value: ContentValue) -> Result<Self, StoreError> {
        let now = Utc::now();
        let entry = Self {
            id: ContentEntryId::generate(),
            key,
            section: section.unwrap_or_else(default_section),
            value,
            created_at: now,
            updated_at: now,
        };
        entry.validate()?;
        Ok(entry)
    }
}

impl Entity for ContentEntry {
    const COLLECTION: &'static str = "content_entries";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.key.clone())
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.key.trim().is_empty() {
            return Err(StoreError::Validation("key is required".to_string()));
        }
        if self.section.trim().is_empty() {
            return Err(StoreError::Validation("section is required".to_string()));
        }
        Ok(())
    }
}
