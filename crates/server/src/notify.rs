//! Notification and presence ports.
//!
//! The real-time channel is an external collaborator; the core only
//! publishes into it, fire-and-forget. A failed publish is logged and
//! discarded - it must never roll back the state transition that
//! triggered it. The client registry is the channel's presence side:
//! analytics reads the connected-session count from it.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use halcyon_core::Role;

/// Event names published by the core.
pub mod events {
    /// A marketplace request entered the queue.
    pub const REQUEST_SUBMITTED: &str = "marketplace.request.submitted";
    /// A marketplace request was approved.
    pub const REQUEST_APPROVED: &str = "marketplace.request.approved";
    /// A marketplace item was materialized.
    pub const ITEM_CREATED: &str = "marketplace.item.created";
    /// A marketplace item was completed.
    pub const ITEM_COMPLETED: &str = "marketplace.item.completed";
    /// A content entry was created or changed.
    pub const CONTENT_UPDATED: &str = "content.updated";
    /// A content entry was deleted.
    pub const CONTENT_DELETED: &str = "content.deleted";
}

/// Publish failure. Carries only a message - the caller logs and moves on.
#[derive(Debug, Error)]
#[error("notification channel unavailable: {0}")]
pub struct NotifyError(pub String);

/// Port for the real-time notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish an event. No delivery guarantee; no return value awaited
    /// beyond the local handoff.
    async fn publish(&self, event: &str, payload: Value) -> Result<(), NotifyError>;
}

/// Port for the channel's connected-client registry.
pub trait ClientRegistry: Send + Sync {
    /// Number of currently connected sessions with the given role.
    fn active_sessions(&self, role: Role) -> usize;
}

/// Default notifier: writes events to the log. Used when no channel is
/// wired up (degraded deployments, tests that don't assert on events).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), NotifyError> {
        debug!(event, %payload, "event published");
        Ok(())
    }
}

/// Registry fixture reporting zero connected clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClients;

impl ClientRegistry for NoClients {
    fn active_sessions(&self, _role: Role) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_log_notifier_accepts_publishes() {
        let notifier = LogNotifier;
        let result = notifier
            .publish(events::REQUEST_SUBMITTED, json!({"id": "abc"}))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_no_clients_reports_zero() {
        let registry = NoClients;
        assert_eq!(registry.active_sessions(Role::User), 0);
        assert_eq!(registry.active_sessions(Role::Admin), 0);
    }
}
