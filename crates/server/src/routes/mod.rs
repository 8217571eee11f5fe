//! JSON route handlers.
//!
//! Thin by design: handlers deserialize input, call into the facade or a
//! service, and map the result through `AppError`. No domain logic lives
//! here.

pub mod analytics;
pub mod applications;
pub mod catalog;
pub mod content;
pub mod marketplace;
pub mod users;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Users
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get_one).patch(users::update).delete(users::remove),
        )
        // Catalog: meditations
        .route(
            "/api/meditations",
            get(catalog::list_meditations).post(catalog::create_meditation),
        )
        .route(
            "/api/meditations/{id}",
            get(catalog::get_meditation)
                .patch(catalog::update_meditation)
                .delete(catalog::delete_meditation),
        )
        // Catalog: sounds
        .route(
            "/api/sounds",
            get(catalog::list_sounds).post(catalog::create_sound),
        )
        .route(
            "/api/sounds/{id}",
            get(catalog::get_sound)
                .patch(catalog::update_sound)
                .delete(catalog::delete_sound),
        )
        // Companion applications
        .route("/api/applications", post(applications::submit))
        .route("/api/companions", get(applications::public_directory))
        .route("/api/admin/applications", get(applications::admin_list))
        .route(
            "/api/admin/applications/{id}",
            get(applications::admin_get).patch(applications::review),
        )
        // Marketplace workflow
        .route("/api/marketplace/requests", post(marketplace::submit))
        .route(
            "/api/marketplace/requests/{id}/approve",
            post(marketplace::approve),
        )
        .route("/api/marketplace/items", get(marketplace::list_items))
        .route(
            "/api/marketplace/items/{id}/complete",
            post(marketplace::complete),
        )
        // CMS content
        .route("/api/content", get(content::list))
        .route("/api/content/section/{section}", get(content::section))
        .route(
            "/api/content/{key}",
            get(content::get_one).put(content::set).delete(content::remove),
        )
        // Analytics
        .route("/api/analytics", get(analytics::report))
}
