//! Dual-mode persistence facade.
//!
//! One [`Store`] per process, constructed once at startup. A single
//! bounded-timeout connection attempt decides the mode for the process
//! lifetime: connected (`PostgreSQL` document table) or degraded
//! (in-process store). The backend is injected behind a trait object at
//! construction - call sites never branch on the mode, and the mode is
//! never re-evaluated per request, so a single request can never mix
//! reads from two stores.

pub mod backend;
pub mod collection;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use halcyon_core::Role;

use crate::config::DatabaseConfig;
use crate::models::application::CompanionApplication;
use crate::models::catalog::{Meditation, Sound};
use crate::models::content::ContentEntry;
use crate::models::marketplace::{MarketplaceItem, MarketplaceRequest};
use crate::models::user::{NewUser, User};
use crate::services::auth;

use backend::DocumentBackend;
use collection::Documents;
use memory::MemoryBackend;
use postgres::PgBackend;

/// Email of the administrator seeded into the degraded-mode store.
pub const DEGRADED_ADMIN_EMAIL: &str = "admin@halcyon.health";
/// Password of the seeded administrator. Fixed and documented so the
/// platform stays operable without a reachable database.
pub const DEGRADED_ADMIN_PASSWORD: &str = "halcyon-degraded-admin";

/// Store error taxonomy.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or malformed required field - the caller's fault.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No record for the given id.
    #[error("record not found")]
    NotFound,

    /// A write collided with an existing unique key or state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Remote store unreachable. Raised only during startup mode
    /// selection; it downgrades the process instead of failing it.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// Database operation failed after a successful startup.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document no longer matches its entity shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Which backend answered the startup connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Remote document store reachable.
    Connected,
    /// In-process fallback store.
    Degraded,
}

impl StoreMode {
    /// Lowercase label for logs and the readiness endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Degraded => "degraded",
        }
    }
}

/// The persistence facade: typed per-entity collections over one
/// injected backend.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn DocumentBackend>,
    mode: StoreMode,
}

impl Store {
    /// Select the backend for this process.
    ///
    /// Attempts the database once within the configured timeout; any
    /// failure (or no configured URL) downgrades to the in-process store,
    /// seeded with the fixed administrator. Startup never fails here.
    pub async fn connect(config: &DatabaseConfig) -> Self {
        if let Some(url) = &config.url {
            match PgBackend::connect(url, config.connect_timeout).await {
                Ok(pg) => {
                    info!("document store connected");
                    return Self {
                        backend: Arc::new(pg),
                        mode: StoreMode::Connected,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "database unreachable, falling back to in-process store");
                }
            }
        } else {
            info!("no database configured, using in-process store");
        }

        Self::degraded().await
    }

    /// Build the degraded-mode store, seeded with the administrator.
    pub async fn degraded() -> Self {
        let store = Self::in_memory();
        if let Err(e) = store.seed_admin().await {
            warn!(error = %e, "failed to seed degraded-mode administrator");
        }
        store
    }

    /// Bare in-process store with no seed data. Test entry point.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new()),
            mode: StoreMode::Degraded,
        }
    }

    /// The mode selected at startup.
    #[must_use]
    pub const fn mode(&self) -> StoreMode {
        self.mode
    }

    /// User accounts.
    #[must_use]
    pub fn users(&self) -> Documents<User> {
        self.collection()
    }

    /// Guided meditation sessions.
    #[must_use]
    pub fn meditations(&self) -> Documents<Meditation> {
        self.collection()
    }

    /// Ambient sounds.
    #[must_use]
    pub fn sounds(&self) -> Documents<Sound> {
        self.collection()
    }

    /// Companion (practitioner) applications.
    #[must_use]
    pub fn applications(&self) -> Documents<CompanionApplication> {
        self.collection()
    }

    /// Marketplace requests.
    #[must_use]
    pub fn requests(&self) -> Documents<MarketplaceRequest> {
        self.collection()
    }

    /// Marketplace items.
    #[must_use]
    pub fn items(&self) -> Documents<MarketplaceItem> {
        self.collection()
    }

    /// CMS content entries.
    #[must_use]
    pub fn content(&self) -> Documents<ContentEntry> {
        self.collection()
    }

    fn collection<T: collection::Entity>(&self) -> Documents<T> {
        Documents::new(Arc::clone(&self.backend))
    }

    async fn seed_admin(&self) -> Result<(), StoreError> {
        let password_hash = auth::hash_password(DEGRADED_ADMIN_PASSWORD)
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        let admin = User::from_new(
            NewUser {
                id: None,
                name: "Administrator".to_string(),
                email: DEGRADED_ADMIN_EMAIL.to_string(),
                role: Some(Role::Admin),
                profile: None,
            },
            password_hash,
        )?;

        self.users().create(admin).await?;
        info!(email = DEGRADED_ADMIN_EMAIL, "seeded degraded-mode administrator");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::Filter;

    #[tokio::test]
    async fn test_degraded_store_is_seeded_with_admin() {
        let store = Store::degraded().await;
        assert_eq!(store.mode(), StoreMode::Degraded);

        let users = store.users().list(Filter::new()).await.expect("list users");
        assert_eq!(users.len(), 1);

        let admin = users.first().expect("seeded admin");
        assert_eq!(admin.email.as_str(), DEGRADED_ADMIN_EMAIL);
        assert_eq!(admin.role, Role::Admin);
        assert!(auth::verify_password(DEGRADED_ADMIN_PASSWORD, &admin.password_hash).is_ok());
    }

    #[tokio::test]
    async fn test_in_memory_store_is_empty() {
        let store = Store::in_memory();
        let users = store.users().list(Filter::new()).await.expect("list users");
        assert!(users.is_empty());
    }
}
