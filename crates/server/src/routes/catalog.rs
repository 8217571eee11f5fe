//! Catalog route handlers: meditations and ambient sounds.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use halcyon_core::{MeditationId, SoundId};

use crate::error::Result;
use crate::models::catalog::{Meditation, NewMeditation, NewSound, Sound};
use crate::state::AppState;
use crate::store::backend::Filter;

/// Optional catalog list filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub category: Option<String>,
}

impl ListParams {
    fn filter(self) -> Filter {
        let mut filter = Filter::new();
        if let Some(status) = self.status {
            filter = filter.eq("status", status);
        }
        if let Some(category) = self.category {
            filter = filter.eq("category", category);
        }
        filter
    }
}

// =============================================================================
// Meditations
// =============================================================================

/// List meditations.
#[instrument(skip(state))]
pub async fn list_meditations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Meditation>>> {
    Ok(Json(state.store().meditations().list(params.filter()).await?))
}

/// Create a meditation.
#[instrument(skip(state, new), fields(title = %new.title))]
pub async fn create_meditation(
    State(state): State<AppState>,
    Json(new): Json<NewMeditation>,
) -> Result<(StatusCode, Json<Meditation>)> {
    let meditation = state
        .store()
        .meditations()
        .create(Meditation::from_new(new))
        .await?;
    Ok((StatusCode::CREATED, Json(meditation)))
}

/// Fetch a meditation.
pub async fn get_meditation(
    State(state): State<AppState>,
    Path(id): Path<MeditationId>,
) -> Result<Json<Meditation>> {
    Ok(Json(state.store().meditations().get(id).await?))
}

/// Patch a meditation.
#[instrument(skip(state, patch))]
pub async fn update_meditation(
    State(state): State<AppState>,
    Path(id): Path<MeditationId>,
    Json(patch): Json<Value>,
) -> Result<Json<Meditation>> {
    Ok(Json(state.store().meditations().update(id, patch).await?))
}

/// Delete a meditation.
#[instrument(skip(state))]
pub async fn delete_meditation(
    State(state): State<AppState>,
    Path(id): Path<MeditationId>,
) -> Result<StatusCode> {
    state.store().meditations().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Sounds
// =============================================================================

/// List sounds.
#[instrument(skip(state))]
pub async fn list_sounds(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Sound>>> {
    Ok(Json(state.store().sounds().list(params.filter()).await?))
}

/// Create a sound.
#[instrument(skip(state, new), fields(title = %new.title))]
pub async fn create_sound(
    State(state): State<AppState>,
    Json(new): Json<NewSound>,
) -> Result<(StatusCode, Json<Sound>)> {
    let sound = state.store().sounds().create(Sound::from_new(new)).await?;
    Ok((StatusCode::CREATED, Json(sound)))
}

/// Fetch a sound.
pub async fn get_sound(
    State(state): State<AppState>,
    Path(id): Path<SoundId>,
) -> Result<Json<Sound>> {
    Ok(Json(state.store().sounds().get(id).await?))
}

/// Patch a sound.
#[instrument(skip(state, patch))]
pub async fn update_sound(
    State(state): State<AppState>,
    Path(id): Path<SoundId>,
    Json(patch): Json<Value>,
) -> Result<Json<Sound>> {
    Ok(Json(state.store().sounds().update(id, patch).await?))
}

/// Delete a sound.
#[instrument(skip(state))]
pub async fn delete_sound(
    State(state): State<AppState>,
    Path(id): Path<SoundId>,
) -> Result<StatusCode> {
    state.store().sounds().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
