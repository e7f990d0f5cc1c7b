use axum::{extract::State, response::IntoResponse};
use chrono::Utc;

use super::common::success_response;
use crate::errors::ApiError;
use crate::AppState;

/// Aggregated dashboard stats for the current date.
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.services.dashboard.stats(Utc::now().date_naive());
    Ok(success_response(stats))
}
