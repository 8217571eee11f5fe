//! Companion application route handlers.
//!
//! Submissions are public; review happens on the admin surface. The
//! public directory exposes approved applications only, through the
//! curated projection.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;
use tracing::instrument;

use halcyon_core::{ApplicationId, ApplicationStatus};

use crate::error::Result;
use crate::models::application::{
    AdminApplicationView, CompanionApplication, NewApplication, PublicCompanion,
};
use crate::state::AppState;
use crate::store::backend::Filter;

/// Submit a companion application.
#[instrument(skip(state, new), fields(email = %new.email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(new): Json<NewApplication>,
) -> Result<(StatusCode, Json<AdminApplicationView>)> {
    let application = CompanionApplication::from_new(new)?;
    let application = state.store().applications().create(application).await?;
    Ok((StatusCode::CREATED, Json(application.admin_view())))
}

/// Public companion directory: approved applications, curated projection.
#[instrument(skip(state))]
pub async fn public_directory(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicCompanion>>> {
    let approved = state
        .store()
        .applications()
        .list(Filter::new().eq("status", ApplicationStatus::Approved))
        .await?;

    Ok(Json(
        approved
            .iter()
            .map(CompanionApplication::public_view)
            .collect(),
    ))
}

/// Administrative listing: every application, raw projection.
#[instrument(skip(state))]
pub async fn admin_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminApplicationView>>> {
    let applications = state.store().applications().list(Filter::new()).await?;
    Ok(Json(
        applications
            .iter()
            .map(CompanionApplication::admin_view)
            .collect(),
    ))
}

/// Fetch one application, raw projection.
pub async fn admin_get(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<AdminApplicationView>> {
    let application = state.store().applications().get(id).await?;
    Ok(Json(application.admin_view()))
}

/// Review an application: patch its fields, including the status verdict.
#[instrument(skip(state, patch))]
pub async fn review(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
    Json(patch): Json<Value>,
) -> Result<Json<AdminApplicationView>> {
    let application = state.store().applications().update(id, patch).await?;
    Ok(Json(application.admin_view()))
}
