use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::common::{
    created_response, no_content_response, paginate, success_response, validate_payload,
    ListParams,
};
use crate::errors::ApiError;
use crate::models::Warehouse;
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_warehouses).post(create_warehouse))
        .route(
            "/:id",
            get(get_warehouse).put(update_warehouse).delete(delete_warehouse),
        )
}

async fn list_warehouses(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .warehouses
        .all()
        .into_iter()
        .filter(|w| params.matches_search(&[&w.name, &w.city, &w.address]))
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let warehouse = state
        .store
        .warehouses
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Warehouse {id} not found")))?;
    Ok(success_response(warehouse))
}

async fn create_warehouse(
    State(state): State<AppState>,
    Json(payload): Json<CreateWarehouseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::warehouse(), &payload)?;

    let record = Warehouse {
        id: String::new(),
        name: payload.name,
        address: payload.address,
        city: payload.city,
        phone: payload.phone,
        manager: payload.manager,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.warehouses.insert(record, DEFAULT_ACTOR)?;
    state.services.search.invalidate();
    info!(id = %created.id, "warehouse created");
    Ok(created_response(created))
}

async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateWarehouseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.warehouses.update(&id, DEFAULT_ACTOR, |w| {
        if let Some(name) = payload.name {
            w.name = name;
        }
        if let Some(address) = payload.address {
            w.address = address;
        }
        if let Some(city) = payload.city {
            w.city = city;
        }
        if payload.phone.is_some() {
            w.phone = payload.phone;
        }
        if payload.manager.is_some() {
            w.manager = payload.manager;
        }
        if payload.notes.is_some() {
            w.notes = payload.notes;
        }
    })?;
    state.services.search.invalidate();
    info!(id = %updated.id, "warehouse updated");
    Ok(success_response(updated))
}

async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.warehouses.remove(&id)?;
    state.services.search.invalidate();
    info!(%id, "warehouse deleted");
    Ok(no_content_response())
}
