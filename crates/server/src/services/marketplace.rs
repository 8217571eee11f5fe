//! Marketplace workflow engine.
//!
//! Drives a request through `pending -> approved` and materializes the
//! linked item, then tracks the item through `active -> completed`. Each
//! committed transition publishes an event to the notifier, best-effort:
//! a failed publish is logged and never undoes the transition.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use halcyon_core::{ItemId, ItemStatus, RequestId, RequestStatus};

use crate::models::marketplace::{MarketplaceItem, MarketplaceRequest, NewRequest};
use crate::notify::{Notifier, events};
use crate::store::backend::Filter;
use crate::store::{Store, StoreError};

/// Marketplace workflow service.
pub struct MarketplaceService {
    store: Store,
    notifier: Arc<dyn Notifier>,
}

impl MarketplaceService {
    /// Create a new workflow service.
    pub fn new(store: Store, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Submit a new request. It enters the queue as `pending`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when `kind` is empty or `data`
    /// is missing.
    #[instrument(skip(self, new), fields(kind = %new.kind))]
    pub async fn submit(&self, new: NewRequest) -> Result<MarketplaceRequest, StoreError> {
        let request = MarketplaceRequest::from_new(new)?;
        let request = self.store.requests().create(request).await?;

        info!(request_id = %request.id, "marketplace request submitted");
        self.publish(
            events::REQUEST_SUBMITTED,
            json!({ "id": request.id, "status": request.status }),
        )
        .await;

        Ok(request)
    }

    /// Approve a request and materialize its item.
    ///
    /// Idempotent under sequential re-invocation: an already-approved
    /// request is returned unchanged and never yields a second item. The
    /// item insert carries the request id as its unique key, so a racing
    /// duplicate surfaces as a store conflict and is treated as "already
    /// materialized".
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the request does not exist.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        id: RequestId,
        approved_by: &str,
    ) -> Result<MarketplaceRequest, StoreError> {
        let mut request = self.store.requests().get(id).await?;

        if request.status == RequestStatus::Pending {
            let now = Utc::now();
            request.status = RequestStatus::Approved;
            request.approved_at = Some(now);
            request.approved_by = Some(approved_by.to_string());
            request.updated_at = now;
            self.store.requests().save(&request).await?;

            info!(request_id = %request.id, approved_by, "marketplace request approved");
            self.publish(
                events::REQUEST_APPROVED,
                json!({ "id": request.id, "status": request.status }),
            )
            .await;
        }

        match self
            .store
            .items()
            .create(MarketplaceItem::materialize(&request))
            .await
        {
            Ok(item) => {
                info!(item_id = %item.id, request_id = %request.id, "marketplace item created");
                self.publish(
                    events::ITEM_CREATED,
                    json!({ "id": item.id, "status": item.status }),
                )
                .await;
            }
            Err(StoreError::Conflict(_)) => {
                debug!(request_id = %request.id, "item already materialized");
            }
            Err(e) => return Err(e),
        }

        Ok(request)
    }

    /// Complete an active item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the item does not exist and
    /// `StoreError::Conflict` when it is already completed - completion
    /// is terminal and re-stamping would hide caller bugs.
    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        id: ItemId,
        completed_by: &str,
    ) -> Result<MarketplaceItem, StoreError> {
        let mut item = self.store.items().get(id).await?;

        if item.status == ItemStatus::Completed {
            return Err(StoreError::Conflict(format!(
                "item {id} is already completed"
            )));
        }

        let now = Utc::now();
        item.status = ItemStatus::Completed;
        item.completed_at = Some(now);
        item.completed_by = Some(completed_by.to_string());
        item.updated_at = now;
        self.store.items().save(&item).await?;

        info!(item_id = %item.id, completed_by, "marketplace item completed");
        self.publish(
            events::ITEM_COMPLETED,
            json!({ "id": item.id, "status": item.status }),
        )
        .await;

        Ok(item)
    }

    /// List items by status (default `active`), newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error if the listing fails.
    pub async fn list_items(
        &self,
        status: Option<ItemStatus>,
    ) -> Result<Vec<MarketplaceItem>, StoreError> {
        let status = status.unwrap_or(ItemStatus::Active);
        self.store
            .items()
            .list(Filter::new().eq("status", status))
            .await
    }

    /// Best-effort publish: failures are logged, never propagated.
    async fn publish(&self, event: &str, payload: Value) {
        if let Err(e) = self.notifier.publish(event, payload).await {
            warn!(event, error = %e, "failed to publish notification");
        }
    }
}
