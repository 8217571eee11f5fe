//! Analytics route handler.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::services::analytics::{AnalyticsReport, ReportRange};
use crate::state::AppState;

/// Report query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub range: Option<String>,
}

/// Compute the analytics report for the requested range.
///
/// Unrecognized (or absent) ranges fall back to `7d`.
#[instrument(skip(state))]
pub async fn report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<AnalyticsReport>> {
    let range = ReportRange::parse(params.range.as_deref().unwrap_or("7d"));
    Ok(Json(state.analytics().compute(range).await?))
}
