use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiError;
use crate::validation::Schema;
use crate::{ApiResponse, PaginatedResponse};

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validates a create payload against its entity schema, turning the field
/// error map into a 400 with one `campo: mensaje` entry per failure.
pub fn validate_payload<T: Serialize>(schema: &Schema, payload: &T) -> Result<(), ApiError> {
    let value =
        serde_json::to_value(payload).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let Value::Object(map) = value else {
        return Err(ApiError::BadRequest("se esperaba un objeto".to_string()));
    };
    let errors = schema.validate(&map);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation {
            errors: errors
                .into_iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect(),
        })
    }
}

/// Query parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub warehouse_id: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: None,
            status: None,
            category: None,
            warehouse_id: None,
        }
    }
}

impl ListParams {
    /// Zero-based offset for the requested page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit
    }

    /// Case-insensitive containment of the search term in any field.
    /// No term means every record matches.
    pub fn matches_search(&self, fields: &[&str]) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                fields.iter().any(|f| f.to_lowercase().contains(&term))
            }
        }
    }
}

/// Applies pagination to an already-filtered in-memory list.
pub fn paginate<T>(items: Vec<T>, params: &ListParams) -> PaginatedResponse<T> {
    let total = items.len() as u64;
    let limit = params.limit.max(1);
    let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
    let start = params.offset().min(total) as usize;
    let end = (start + limit as usize).min(items.len());
    let items = items.into_iter().skip(start).take(end - start).collect();
    PaginatedResponse {
        items,
        total,
        page: params.page,
        limit,
        total_pages,
    }
}
