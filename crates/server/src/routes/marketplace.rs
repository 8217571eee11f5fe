//! Marketplace workflow route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use halcyon_core::{ItemId, ItemStatus, RequestId};

use crate::error::{AppError, Result};
use crate::models::marketplace::{MarketplaceItem, MarketplaceRequest, NewRequest};
use crate::state::AppState;

/// Approval payload.
#[derive(Debug, Deserialize)]
pub struct Approval {
    pub approved_by: String,
}

/// Completion payload.
#[derive(Debug, Deserialize)]
pub struct Completion {
    pub completed_by: String,
}

/// Item list filters.
#[derive(Debug, Default, Deserialize)]
pub struct ItemParams {
    pub status: Option<String>,
}

/// Submit a marketplace request.
#[instrument(skip(state, new), fields(kind = %new.kind))]
pub async fn submit(
    State(state): State<AppState>,
    Json(new): Json<NewRequest>,
) -> Result<(StatusCode, Json<MarketplaceRequest>)> {
    let request = state.marketplace().submit(new).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Approve a request, materializing its item.
#[instrument(skip(state, approval))]
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    Json(approval): Json<Approval>,
) -> Result<Json<MarketplaceRequest>> {
    let request = state
        .marketplace()
        .approve(id, &approval.approved_by)
        .await?;
    Ok(Json(request))
}

/// List items by status (default `active`), newest first.
#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Vec<MarketplaceItem>>> {
    let status = params
        .status
        .map(|raw| {
            raw.parse::<ItemStatus>()
                .map_err(AppError::BadRequest)
        })
        .transpose()?;

    let items = state.marketplace().list_items(status).await?;
    Ok(Json(items))
}

/// Complete an active item.
#[instrument(skip(state, completion))]
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(completion): Json<Completion>,
) -> Result<Json<MarketplaceItem>> {
    let item = state
        .marketplace()
        .complete(id, &completion.completed_by)
        .await?;
    Ok(Json(item))
}
