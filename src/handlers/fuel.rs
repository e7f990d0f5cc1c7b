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
use crate::models::{EntityKind, FuelRecord, FuelType};
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateFuelRecordRequest {
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub entity_name: String,
    pub date: NaiveDate,
    pub liters: f64,
    pub unit_cost: f64,
    /// Derived from liters × unit cost when omitted.
    #[serde(default)]
    pub total_cost: Option<f64>,
    pub fuel_type: FuelType,
    pub location: String,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub odometer: Option<f64>,
    #[serde(default)]
    pub hourmeter: Option<f64>,
    #[serde(default)]
    pub operator_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFuelRecordRequest {
    pub date: Option<NaiveDate>,
    pub liters: Option<f64>,
    pub unit_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub fuel_type: Option<FuelType>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
    pub odometer: Option<f64>,
    pub hourmeter: Option<f64>,
    pub operator_name: Option<String>,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fuel_records).post(create_fuel_record))
        .route(
            "/:id",
            get(get_fuel_record)
                .put(update_fuel_record)
                .delete(delete_fuel_record),
        )
}

async fn list_fuel_records(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .fuel_records
        .all()
        .into_iter()
        .filter(|f| params.matches_search(&[&f.entity_name, &f.location]))
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_fuel_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .fuel_records
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Fuel record {id} not found")))?;
    Ok(success_response(record))
}

async fn create_fuel_record(
    State(state): State<AppState>,
    Json(payload): Json<CreateFuelRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::fuel(), &payload)?;

    let total_cost = payload
        .total_cost
        .unwrap_or(payload.liters * payload.unit_cost);
    let record = FuelRecord {
        id: String::new(),
        entity_type: payload.entity_type,
        entity_id: payload.entity_id,
        entity_name: payload.entity_name,
        date: payload.date,
        liters: payload.liters,
        unit_cost: payload.unit_cost,
        total_cost,
        fuel_type: payload.fuel_type,
        location: payload.location,
        supplier: payload.supplier,
        invoice_number: payload.invoice_number,
        odometer: payload.odometer,
        hourmeter: payload.hourmeter,
        operator_name: payload.operator_name,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.fuel_records.insert(record, DEFAULT_ACTOR)?;
    info!(id = %created.id, liters = created.liters, "fuel record created");
    Ok(created_response(created))
}

async fn update_fuel_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateFuelRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.fuel_records.update(&id, DEFAULT_ACTOR, |f| {
        if let Some(date) = payload.date {
            f.date = date;
        }
        if let Some(liters) = payload.liters {
            f.liters = liters;
        }
        if let Some(unit_cost) = payload.unit_cost {
            f.unit_cost = unit_cost;
        }
        if let Some(total_cost) = payload.total_cost {
            f.total_cost = total_cost;
        } else if payload.liters.is_some() || payload.unit_cost.is_some() {
            f.total_cost = f.liters * f.unit_cost;
        }
        if let Some(fuel_type) = payload.fuel_type {
            f.fuel_type = fuel_type;
        }
        if let Some(location) = payload.location {
            f.location = location;
        }
        if payload.supplier.is_some() {
            f.supplier = payload.supplier;
        }
        if payload.invoice_number.is_some() {
            f.invoice_number = payload.invoice_number;
        }
        if payload.odometer.is_some() {
            f.odometer = payload.odometer;
        }
        if payload.hourmeter.is_some() {
            f.hourmeter = payload.hourmeter;
        }
        if payload.operator_name.is_some() {
            f.operator_name = payload.operator_name;
        }
        if payload.notes.is_some() {
            f.notes = payload.notes;
        }
    })?;
    info!(id = %updated.id, "fuel record updated");
    Ok(success_response(updated))
}

async fn delete_fuel_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.fuel_records.remove(&id)?;
    info!(%id, "fuel record deleted");
    Ok(no_content_response())
}
