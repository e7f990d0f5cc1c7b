use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::common::{
    created_response, no_content_response, paginate, success_response, validate_payload,
    ListParams,
};
use crate::errors::ApiError;
use crate::models::{Condition, Tool, ToolStatus};
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateToolRequest {
    pub name: String,
    pub internal_code: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: ToolStatus,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub warranty_expiration: Option<NaiveDate>,
    #[serde(default)]
    pub observations: String,
    pub warehouse_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateToolRequest {
    pub name: Option<String>,
    pub internal_code: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<ToolStatus>,
    pub condition: Option<Condition>,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiration: Option<NaiveDate>,
    pub observations: Option<String>,
    pub warehouse_id: Option<String>,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tools).post(create_tool))
        .route("/:id", get(get_tool).put(update_tool).delete(delete_tool))
}

async fn list_tools(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .tools
        .all()
        .into_iter()
        .filter(|t| {
            params.matches_search(&[
                &t.name,
                &t.internal_code,
                t.category.as_deref().unwrap_or(""),
                t.brand.as_deref().unwrap_or(""),
            ])
        })
        .filter(|t| match &params.status {
            Some(status) => t.status.to_string() == *status,
            None => true,
        })
        .filter(|t| match &params.warehouse_id {
            Some(warehouse_id) => &t.warehouse_id == warehouse_id,
            None => true,
        })
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tool = state
        .store
        .tools
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Tool {id} not found")))?;
    Ok(success_response(tool))
}

async fn create_tool(
    State(state): State<AppState>,
    Json(payload): Json<CreateToolRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::tool(), &payload)?;

    let record = Tool {
        id: String::new(),
        name: payload.name,
        internal_code: payload.internal_code,
        category: payload.category,
        brand: payload.brand,
        model: payload.model,
        serial_number: payload.serial_number,
        status: payload.status,
        condition: payload.condition,
        purchase_price: payload.purchase_price,
        purchase_date: payload.purchase_date,
        warranty_expiration: payload.warranty_expiration,
        observations: payload.observations,
        warehouse_id: payload.warehouse_id,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.tools.insert(record, DEFAULT_ACTOR)?;
    state.services.search.invalidate();
    info!(id = %created.id, code = %created.internal_code, "tool created");
    Ok(created_response(created))
}

async fn update_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateToolRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.tools.update(&id, DEFAULT_ACTOR, |t| {
        if let Some(name) = payload.name {
            t.name = name;
        }
        if let Some(internal_code) = payload.internal_code {
            t.internal_code = internal_code;
        }
        if payload.category.is_some() {
            t.category = payload.category;
        }
        if payload.brand.is_some() {
            t.brand = payload.brand;
        }
        if payload.model.is_some() {
            t.model = payload.model;
        }
        if payload.serial_number.is_some() {
            t.serial_number = payload.serial_number;
        }
        if let Some(status) = payload.status {
            t.status = status;
        }
        if let Some(condition) = payload.condition {
            t.condition = condition;
        }
        if payload.purchase_price.is_some() {
            t.purchase_price = payload.purchase_price;
        }
        if payload.purchase_date.is_some() {
            t.purchase_date = payload.purchase_date;
        }
        if payload.warranty_expiration.is_some() {
            t.warranty_expiration = payload.warranty_expiration;
        }
        if let Some(observations) = payload.observations {
            t.observations = observations;
        }
        if let Some(warehouse_id) = payload.warehouse_id {
            t.warehouse_id = warehouse_id;
        }
        if payload.notes.is_some() {
            t.notes = payload.notes;
        }
    })?;
    state.services.search.invalidate();
    info!(id = %updated.id, "tool updated");
    Ok(success_response(updated))
}

async fn delete_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.tools.remove(&id)?;
    state.services.search.invalidate();
    info!(%id, "tool deleted");
    Ok(no_content_response())
}
