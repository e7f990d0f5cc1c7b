use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use super::common::{
    created_response, no_content_response, paginate, success_response, validate_payload,
    ListParams,
};
use crate::errors::ApiError;
use crate::models::SparePart;
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateSparePartRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub brand: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_price: f64,
    #[serde(default)]
    pub stock_by_warehouse: HashMap<String, u32>,
    pub min_stock: u32,
    #[serde(default)]
    pub max_stock: Option<u32>,
    #[serde(default)]
    pub reorder_point: Option<u32>,
    #[serde(default)]
    pub compatible_machinery: Vec<String>,
    #[serde(default)]
    pub compatible_vehicles: Vec<String>,
    #[serde(default)]
    pub suppliers: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSparePartRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<f64>,
    pub stock_by_warehouse: Option<HashMap<String, u32>>,
    pub min_stock: Option<u32>,
    pub max_stock: Option<u32>,
    pub reorder_point: Option<u32>,
    pub compatible_machinery: Option<Vec<String>>,
    pub compatible_vehicles: Option<Vec<String>>,
    pub suppliers: Option<Vec<String>>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Stock adjustment for one warehouse.
#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub warehouse_id: String,
    /// New absolute quantity for that warehouse.
    pub quantity: u32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_spare_parts).post(create_spare_part))
        .route(
            "/:id",
            get(get_spare_part).put(update_spare_part).delete(delete_spare_part),
        )
        .route("/:id/stock", axum::routing::post(adjust_stock))
}

async fn list_spare_parts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .spare_parts
        .all()
        .into_iter()
        .filter(|p| {
            params.matches_search(&[
                &p.name,
                &p.code,
                &p.brand,
                p.category.as_deref().unwrap_or(""),
            ])
        })
        .filter(|p| match &params.category {
            Some(category) => p.category.as_deref() == Some(category),
            None => true,
        })
        .filter(|p| match &params.warehouse_id {
            Some(warehouse_id) => p.stock_by_warehouse.contains_key(warehouse_id),
            None => true,
        })
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_spare_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let part = state
        .store
        .spare_parts
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Spare part {id} not found")))?;
    Ok(success_response(part))
}

async fn create_spare_part(
    State(state): State<AppState>,
    Json(payload): Json<CreateSparePartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::spare_part(), &payload)?;

    let record = SparePart {
        id: String::new(),
        code: payload.code,
        name: payload.name,
        category: payload.category,
        brand: payload.brand,
        model: payload.model,
        description: payload.description,
        unit_price: payload.unit_price,
        stock_by_warehouse: payload.stock_by_warehouse,
        min_stock: payload.min_stock,
        max_stock: payload.max_stock,
        reorder_point: payload.reorder_point,
        compatible_machinery: payload.compatible_machinery,
        compatible_vehicles: payload.compatible_vehicles,
        suppliers: payload.suppliers,
        location: payload.location,
        last_purchase_date: None,
        last_purchase_price: None,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.spare_parts.insert(record, DEFAULT_ACTOR)?;
    state.services.search.invalidate();
    info!(id = %created.id, code = %created.code, "spare part created");
    Ok(created_response(created))
}

async fn update_spare_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSparePartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.spare_parts.update(&id, DEFAULT_ACTOR, |p| {
        if let Some(code) = payload.code {
            p.code = code;
        }
        if let Some(name) = payload.name {
            p.name = name;
        }
        if payload.category.is_some() {
            p.category = payload.category;
        }
        if let Some(brand) = payload.brand {
            p.brand = brand;
        }
        if payload.model.is_some() {
            p.model = payload.model;
        }
        if payload.description.is_some() {
            p.description = payload.description;
        }
        if let Some(unit_price) = payload.unit_price {
            p.unit_price = unit_price;
        }
        if let Some(stock) = payload.stock_by_warehouse {
            p.stock_by_warehouse = stock;
        }
        if let Some(min_stock) = payload.min_stock {
            p.min_stock = min_stock;
        }
        if payload.max_stock.is_some() {
            p.max_stock = payload.max_stock;
        }
        if payload.reorder_point.is_some() {
            p.reorder_point = payload.reorder_point;
        }
        if let Some(compatible) = payload.compatible_machinery {
            p.compatible_machinery = compatible;
        }
        if let Some(compatible) = payload.compatible_vehicles {
            p.compatible_vehicles = compatible;
        }
        if let Some(suppliers) = payload.suppliers {
            p.suppliers = suppliers;
        }
        if payload.location.is_some() {
            p.location = payload.location;
        }
        if payload.notes.is_some() {
            p.notes = payload.notes;
        }
    })?;
    state.services.search.invalidate();
    info!(id = %updated.id, "spare part updated");
    Ok(success_response(updated))
}

async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.spare_parts.update(&id, DEFAULT_ACTOR, |p| {
        p.stock_by_warehouse
            .insert(payload.warehouse_id, payload.quantity);
    })?;
    info!(id = %updated.id, total = updated.total_stock(), "stock adjusted");
    Ok(success_response(updated))
}

async fn delete_spare_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.spare_parts.remove(&id)?;
    state.services.search.invalidate();
    info!(%id, "spare part deleted");
    Ok(no_content_response())
}
