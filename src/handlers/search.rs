use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::common::success_response;
use crate::errors::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Global relevance-ranked search across the fleet collections.
pub async fn global_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hits = state.services.search.search(&query.q);
    Ok(success_response(hits))
}
