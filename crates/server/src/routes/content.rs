//! CMS content route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::error::Result;
use crate::models::content::ContentEntry;
use crate::services::content::SetContent;
use crate::state::AppState;

/// List every content block.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ContentEntry>>> {
    Ok(Json(state.content().list().await?))
}

/// List the blocks of one section.
#[instrument(skip(state))]
pub async fn section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Json<Vec<ContentEntry>>> {
    Ok(Json(state.content().section(&section).await?))
}

/// Fetch the block stored under a key.
pub async fn get_one(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ContentEntry>> {
    Ok(Json(state.content().get(&key).await?))
}

/// Create or update the block stored under a key.
#[instrument(skip(state, params))]
pub async fn set(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(params): Json<SetContent>,
) -> Result<Json<ContentEntry>> {
    Ok(Json(state.content().set(&key, params).await?))
}

/// Delete the block stored under a key.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.content().delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
