//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notify::{ClientRegistry, Notifier};
use crate::services::analytics::AnalyticsService;
use crate::services::content::ContentService;
use crate::services::marketplace::MarketplaceService;
use crate::store::Store;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store facade and the domain services built over it. The notifier and
/// client registry are injected once here; nothing below re-resolves them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Store,
    marketplace: MarketplaceService,
    analytics: AnalyticsService,
    content: ContentService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - The persistence facade, mode already selected
    /// * `notifier` - The real-time channel port
    /// * `registry` - The channel's connected-client registry
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Store,
        notifier: Arc<dyn Notifier>,
        registry: Arc<dyn ClientRegistry>,
    ) -> Self {
        let marketplace = MarketplaceService::new(store.clone(), Arc::clone(&notifier));
        let analytics = AnalyticsService::new(store.clone(), registry);
        let content = ContentService::new(store.clone(), notifier);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                marketplace,
                analytics,
                content,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the persistence facade.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the marketplace workflow service.
    #[must_use]
    pub fn marketplace(&self) -> &MarketplaceService {
        &self.inner.marketplace
    }

    /// Get a reference to the analytics service.
    #[must_use]
    pub fn analytics(&self) -> &AnalyticsService {
        &self.inner.analytics
    }

    /// Get a reference to the content service.
    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }
}
