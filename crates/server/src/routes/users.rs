//! User account route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, extract::Query};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use halcyon_core::UserId;

use crate::error::Result;
use crate::models::user::{NewUser, User, UserView};
use crate::services::auth;
use crate::state::AppState;
use crate::store::backend::Filter;

/// Create-user payload: the standard create parameters plus the clear
/// password, which is hashed before it reaches the store.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    #[serde(flatten)]
    pub new: NewUser,
    pub password: String,
}

/// Optional list filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub role: Option<String>,
}

/// List users.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserView>>> {
    let filter = params
        .role
        .map_or_else(Filter::new, |role| Filter::new().eq("role", role));

    let users = state.store().users().list(filter).await?;
    Ok(Json(users.into_iter().map(User::into_view).collect()))
}

/// Create a user.
#[instrument(skip(state, payload), fields(email = %payload.new.email))]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserView>)> {
    auth::validate_password(&payload.password)?;
    let password_hash = auth::hash_password(&payload.password)?;

    let user = User::from_new(payload.new, password_hash)?;
    let user = state.store().users().create(user).await?;

    Ok((StatusCode::CREATED, Json(user.into_view())))
}

/// Fetch a user.
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserView>> {
    let user = state.store().users().get(id).await?;
    Ok(Json(user.into_view()))
}

/// Patch a user. Only the supplied fields change.
#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(patch): Json<Value>,
) -> Result<Json<UserView>> {
    let user = state.store().users().update(id, patch).await?;
    Ok(Json(user.into_view()))
}

/// Delete a user.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<StatusCode> {
    state.store().users().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
