//! Marketplace requests and items.
//!
//! A request is a member's offer (session, retreat, product, or any other
//! kind) carrying an arbitrary JSON payload. Approval materializes exactly
//! one item per request; the item copies the payload and lives its own
//! `active -> completed` life. Deleting a request does not cascade to its
//! item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use halcyon_core::{ItemId, ItemStatus, RequestId, RequestStatus, UserId};

use crate::store::StoreError;
use crate::store::collection::Entity;

/// A marketplace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceRequest {
    pub id: RequestId,
    /// Free-form offer type; conventional values are "session",
    /// "retreat", and "product".
    pub kind: String,
    /// Arbitrary offer payload, owned by the submitter.
    pub data: Value,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub submitted_by: Option<UserId>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for submitting a request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRequest {
    #[serde(default)]
    pub id: Option<RequestId>,
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub submitted_by: Option<UserId>,
}

impl MarketplaceRequest {
    /// Build a pending request from submission parameters.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when `kind` is empty or `data`
    /// is missing.
    pub fn from_new(new: NewRequest) -> Result<Self, StoreError> {
        let now = Utc::now();
        let request = Self {
            id: new.id.unwrap_or_else(RequestId::generate),
            kind: new.kind,
            data: new.data,
            status: RequestStatus::Pending,
            submitted_by: new.submitted_by,
            approved_at: None,
            approved_by: None,
            created_at: now,
            updated_at: now,
        };
        request.validate()?;
        Ok(request)
    }
}

impl Entity for MarketplaceRequest {
    const COLLECTION: &'static str = "marketplace_requests";

    // Approval owns these; a generic patch may not touch them.
    const GUARDED_FIELDS: &'static [&'static str] = &["status", "approved_at", "approved_by"];

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.kind.trim().is_empty() {
            return Err(StoreError::Validation("kind is required".to_string()));
        }
        if self.data.is_null() {
            return Err(StoreError::Validation("data is required".to_string()));
        }
        Ok(())
    }
}

/// A marketplace item, materialized from exactly one approved request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceItem {
    pub id: ItemId,
    /// Source request. Unique across items - the store rejects a second
    /// item for the same request.
    pub request_id: RequestId,
    pub kind: String,
    pub data: Value,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketplaceItem {
    /// Materialize the item for an approved request.
    #[must_use]
    pub fn materialize(request: &MarketplaceRequest) -> Self {
        let now = Utc::now();
        Self {
            id: ItemId::generate(),
            request_id: request.id,
            kind: request.kind.clone(),
            data: request.data.clone(),
            status: ItemStatus::Active,
            completed_at: None,
            completed_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for MarketplaceItem {
    const COLLECTION: &'static str = "marketplace_items";

    // Completion owns these; a generic patch may not touch them.
    const GUARDED_FIELDS: &'static [&'static str] = &["status", "completed_at", "completed_by"];

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.request_id.to_string())
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.kind.trim().is_empty() {
            return Err(StoreError::Validation("kind is required".to_string()));
        }
        Ok(())
    }
}
