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
use crate::models::{Condition, FleetStatus, FuelType, Machinery};
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateMachineryRequest {
    pub name: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub year: i32,
    #[serde(default)]
    pub hourmeter: f64,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub status: FleetStatus,
    pub warehouse_id: String,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub insurance_expiration: Option<NaiveDate>,
    #[serde(default)]
    pub next_maintenance: Option<NaiveDate>,
    #[serde(default)]
    pub maintenance_interval_hours: Option<f64>,
    #[serde(default)]
    pub maintenance_interval_days: Option<i64>,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
    #[serde(default)]
    pub fuel_capacity: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMachineryRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub year: Option<i32>,
    pub hourmeter: Option<f64>,
    pub condition: Option<Condition>,
    pub status: Option<FleetStatus>,
    pub warehouse_id: Option<String>,
    pub purchase_price: Option<f64>,
    pub current_value: Option<f64>,
    pub insurance_expiration: Option<NaiveDate>,
    pub last_maintenance: Option<NaiveDate>,
    pub next_maintenance: Option<NaiveDate>,
    pub maintenance_interval_hours: Option<f64>,
    pub maintenance_interval_days: Option<i64>,
    pub fuel_type: Option<FuelType>,
    pub fuel_capacity: Option<f64>,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_machinery).post(create_machinery))
        .route(
            "/:id",
            get(get_machinery).put(update_machinery).delete(delete_machinery),
        )
}

async fn list_machinery(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .machinery
        .all()
        .into_iter()
        .filter(|m| {
            params.matches_search(&[&m.name, &m.brand, &m.model, &m.serial_number, &m.category])
        })
        .filter(|m| match &params.status {
            Some(status) => m.status.to_string() == *status,
            None => true,
        })
        .filter(|m| match &params.category {
            Some(category) => &m.category == category,
            None => true,
        })
        .filter(|m| match &params.warehouse_id {
            Some(warehouse_id) => &m.warehouse_id == warehouse_id,
            None => true,
        })
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_machinery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = state
        .store
        .machinery
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Machinery {id} not found")))?;
    Ok(success_response(unit))
}

async fn create_machinery(
    State(state): State<AppState>,
    Json(payload): Json<CreateMachineryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::machinery(), &payload)?;

    let record = Machinery {
        id: String::new(),
        name: payload.name,
        category: payload.category,
        brand: payload.brand,
        model: payload.model,
        serial_number: payload.serial_number,
        year: payload.year,
        hourmeter: payload.hourmeter,
        condition: payload.condition,
        status: payload.status,
        warehouse_id: payload.warehouse_id,
        purchase_price: payload.purchase_price,
        current_value: payload.current_value,
        insurance_expiration: payload.insurance_expiration,
        last_maintenance: None,
        next_maintenance: payload.next_maintenance,
        maintenance_interval_hours: payload.maintenance_interval_hours,
        maintenance_interval_days: payload.maintenance_interval_days,
        fuel_type: payload.fuel_type,
        fuel_capacity: payload.fuel_capacity,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.machinery.insert(record, DEFAULT_ACTOR)?;
    state.services.search.invalidate();
    info!(id = %created.id, serial = %created.serial_number, "machinery created");
    Ok(created_response(created))
}

async fn update_machinery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMachineryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.machinery.update(&id, DEFAULT_ACTOR, |m| {
        if let Some(name) = payload.name {
            m.name = name;
        }
        if let Some(category) = payload.category {
            m.category = category;
        }
        if let Some(brand) = payload.brand {
            m.brand = brand;
        }
        if let Some(model) = payload.model {
            m.model = model;
        }
        if let Some(serial_number) = payload.serial_number {
            m.serial_number = serial_number;
        }
        if let Some(year) = payload.year {
            m.year = year;
        }
        if let Some(hourmeter) = payload.hourmeter {
            m.hourmeter = hourmeter;
        }
        if let Some(condition) = payload.condition {
            m.condition = condition;
        }
        if let Some(status) = payload.status {
            m.status = status;
        }
        if let Some(warehouse_id) = payload.warehouse_id {
            m.warehouse_id = warehouse_id;
        }
        if payload.purchase_price.is_some() {
            m.purchase_price = payload.purchase_price;
        }
        if payload.current_value.is_some() {
            m.current_value = payload.current_value;
        }
        if payload.insurance_expiration.is_some() {
            m.insurance_expiration = payload.insurance_expiration;
        }
        if payload.last_maintenance.is_some() {
            m.last_maintenance = payload.last_maintenance;
        }
        if payload.next_maintenance.is_some() {
            m.next_maintenance = payload.next_maintenance;
        }
        if payload.maintenance_interval_hours.is_some() {
            m.maintenance_interval_hours = payload.maintenance_interval_hours;
        }
        if payload.maintenance_interval_days.is_some() {
            m.maintenance_interval_days = payload.maintenance_interval_days;
        }
        if payload.fuel_type.is_some() {
            m.fuel_type = payload.fuel_type;
        }
        if payload.fuel_capacity.is_some() {
            m.fuel_capacity = payload.fuel_capacity;
        }
        if payload.notes.is_some() {
            m.notes = payload.notes;
        }
    })?;
    state.services.search.invalidate();
    info!(id = %updated.id, "machinery updated");
    Ok(success_response(updated))
}

async fn delete_machinery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.machinery.remove(&id)?;
    state.services.search.invalidate();
    info!(%id, "machinery deleted");
    Ok(no_content_response())
}
