use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::errors::ApiError;
use crate::services::ExportFormat;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Synthesizes a CSV (or placeholder PDF) for one collection and returns it
/// as a download, bypassing the JSON envelope.
pub async fn export_collection(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let file = state
        .services
        .export
        .export(&collection, query.format)
        .map_err(ApiError::Service)?;

    info!(%collection, filename = %file.filename, "export generated");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response())
}
