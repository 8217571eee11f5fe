//! Integration test harness for the Halcyon backend.
//!
//! Tests run against the in-process store, so the whole stack - facade,
//! workflow engine, aggregator - is exercised end to end without a
//! database. The notifier and client registry are replaced with
//! recording/fixed doubles so tests can assert on published events and
//! presence counts.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use halcyon_core::Role;
use halcyon_server::notify::{ClientRegistry, Notifier, NotifyError};
use halcyon_server::services::analytics::AnalyticsService;
use halcyon_server::services::content::ContentService;
use halcyon_server::services::marketplace::MarketplaceService;
use halcyon_server::store::Store;

/// Notifier double that records every published event.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingNotifier {
    /// Names of the events published so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the event log mutex is poisoned.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("event log poisoned")
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Payload of the most recent event with the given name.
    ///
    /// # Panics
    ///
    /// Panics if the event log mutex is poisoned.
    #[must_use]
    pub fn last_payload(&self, event: &str) -> Option<Value> {
        self.events
            .lock()
            .expect("event log poisoned")
            .iter()
            .rev()
            .find(|(name, _)| name == event)
            .map(|(_, payload)| payload.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), NotifyError> {
        self.events
            .lock()
            .map_err(|_| NotifyError("event log poisoned".to_string()))?
            .push((event.to_string(), payload));
        Ok(())
    }
}

/// Notifier double that always fails, for asserting publish failures
/// never roll back state transitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn publish(&self, _event: &str, _payload: Value) -> Result<(), NotifyError> {
        Err(NotifyError("channel down".to_string()))
    }
}

/// Registry double reporting a fixed number of connected member sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedRegistry {
    pub user_sessions: usize,
}

impl ClientRegistry for FixedRegistry {
    fn active_sessions(&self, role: Role) -> usize {
        match role {
            Role::User => self.user_sessions,
            Role::Admin => 0,
        }
    }
}

/// Everything a test needs, wired over one in-process store.
pub struct TestContext {
    pub store: Store,
    pub marketplace: MarketplaceService,
    pub analytics: AnalyticsService,
    pub content: ContentService,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    /// Context over an empty in-process store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sessions(0)
    }

    /// Context with a fixed connected-session count for analytics.
    #[must_use]
    pub fn with_sessions(user_sessions: usize) -> Self {
        let store = Store::in_memory();
        let notifier = Arc::new(RecordingNotifier::default());
        let registry = Arc::new(FixedRegistry { user_sessions });

        Self {
            marketplace: MarketplaceService::new(store.clone(), notifier.clone()),
            analytics: AnalyticsService::new(store.clone(), registry),
            content: ContentService::new(store.clone(), notifier.clone()),
            store,
            notifier,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
