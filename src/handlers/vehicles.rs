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
use crate::models::{FleetStatus, FuelType, Vehicle};
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateVehicleRequest {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub mileage: f64,
    #[serde(default)]
    pub status: FleetStatus,
    pub soat_expiration: NaiveDate,
    pub technical_review_expiration: NaiveDate,
    #[serde(default)]
    pub driver_license_required: Option<String>,
    pub warehouse_id: String,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub insurance_expiration: Option<NaiveDate>,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<f64>,
    pub status: Option<FleetStatus>,
    pub soat_expiration: Option<NaiveDate>,
    pub technical_review_expiration: Option<NaiveDate>,
    pub driver_license_required: Option<String>,
    pub warehouse_id: Option<String>,
    pub purchase_price: Option<f64>,
    pub current_value: Option<f64>,
    pub insurance_expiration: Option<NaiveDate>,
    pub fuel_type: Option<FuelType>,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .vehicles
        .all()
        .into_iter()
        .filter(|v| {
            let year = v.year.to_string();
            params.matches_search(&[&v.plate, &v.brand, &v.model, &year])
        })
        .filter(|v| match &params.status {
            Some(status) => v.status.to_string() == *status,
            None => true,
        })
        .filter(|v| match &params.warehouse_id {
            Some(warehouse_id) => &v.warehouse_id == warehouse_id,
            None => true,
        })
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = state
        .store
        .vehicles
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Vehicle {id} not found")))?;
    Ok(success_response(vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::vehicle(), &payload)?;

    let record = Vehicle {
        id: String::new(),
        plate: payload.plate,
        brand: payload.brand,
        model: payload.model,
        year: payload.year,
        mileage: payload.mileage,
        status: payload.status,
        soat_expiration: payload.soat_expiration,
        technical_review_expiration: payload.technical_review_expiration,
        driver_license_required: payload.driver_license_required,
        warehouse_id: payload.warehouse_id,
        purchase_price: payload.purchase_price,
        current_value: payload.current_value,
        insurance_expiration: payload.insurance_expiration,
        fuel_type: payload.fuel_type,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.vehicles.insert(record, DEFAULT_ACTOR)?;
    state.services.search.invalidate();
    info!(id = %created.id, plate = %created.plate, "vehicle created");
    Ok(created_response(created))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.vehicles.update(&id, DEFAULT_ACTOR, |v| {
        if let Some(plate) = payload.plate {
            v.plate = plate;
        }
        if let Some(brand) = payload.brand {
            v.brand = brand;
        }
        if let Some(model) = payload.model {
            v.model = model;
        }
        if let Some(year) = payload.year {
            v.year = year;
        }
        if let Some(mileage) = payload.mileage {
            v.mileage = mileage;
        }
        if let Some(status) = payload.status {
            v.status = status;
        }
        if let Some(soat) = payload.soat_expiration {
            v.soat_expiration = soat;
        }
        if let Some(review) = payload.technical_review_expiration {
            v.technical_review_expiration = review;
        }
        if payload.driver_license_required.is_some() {
            v.driver_license_required = payload.driver_license_required;
        }
        if let Some(warehouse_id) = payload.warehouse_id {
            v.warehouse_id = warehouse_id;
        }
        if payload.purchase_price.is_some() {
            v.purchase_price = payload.purchase_price;
        }
        if payload.current_value.is_some() {
            v.current_value = payload.current_value;
        }
        if payload.insurance_expiration.is_some() {
            v.insurance_expiration = payload.insurance_expiration;
        }
        if payload.fuel_type.is_some() {
            v.fuel_type = payload.fuel_type;
        }
        if payload.notes.is_some() {
            v.notes = payload.notes;
        }
    })?;
    state.services.search.invalidate();
    info!(id = %updated.id, "vehicle updated");
    Ok(success_response(updated))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.vehicles.remove(&id)?;
    state.services.search.invalidate();
    info!(%id, "vehicle deleted");
    Ok(no_content_response())
}
