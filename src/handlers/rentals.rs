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
use crate::models::{PaymentStatus, Rental, RentalStatus};
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateRentalRequest {
    pub client_name: String,
    pub client_contact: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_document: Option<String>,
    #[serde(default)]
    pub machinery_id: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    pub entity_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_rate: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub deposit: Option<f64>,
    #[serde(default)]
    pub status: RentalStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub operator_included: bool,
    #[serde(default)]
    pub operator_name: Option<String>,
    #[serde(default)]
    pub fuel_included: bool,
    #[serde(default)]
    pub transport_cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRentalRequest {
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub client_email: Option<String>,
    pub client_document: Option<String>,
    pub entity_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub daily_rate: Option<f64>,
    pub total_amount: Option<f64>,
    pub deposit: Option<f64>,
    pub status: Option<RentalStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub description: Option<String>,
    pub operator_included: Option<bool>,
    pub operator_name: Option<String>,
    pub fuel_included: Option<bool>,
    pub transport_cost: Option<f64>,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rentals).post(create_rental))
        .route(
            "/:id",
            get(get_rental).put(update_rental).delete(delete_rental),
        )
}

async fn list_rentals(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .rentals
        .all()
        .into_iter()
        .filter(|r| params.matches_search(&[&r.client_name, &r.entity_name, &r.description]))
        .filter(|r| match &params.status {
            Some(status) => r.status.to_string() == *status,
            None => true,
        })
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rental = state
        .store
        .rentals
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Rental {id} not found")))?;
    Ok(success_response(rental))
}

async fn create_rental(
    State(state): State<AppState>,
    Json(payload): Json<CreateRentalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::rental(), &payload)?;

    if payload.end_date < payload.start_date {
        return Err(ApiError::Validation {
            errors: vec!["end_date: Debe ser posterior a la fecha de inicio".to_string()],
        });
    }

    let record = Rental {
        id: String::new(),
        client_name: payload.client_name,
        client_contact: payload.client_contact,
        client_email: payload.client_email,
        client_document: payload.client_document,
        machinery_id: payload.machinery_id,
        vehicle_id: payload.vehicle_id,
        entity_name: payload.entity_name,
        start_date: payload.start_date,
        end_date: payload.end_date,
        actual_end_date: None,
        daily_rate: payload.daily_rate,
        total_amount: payload.total_amount,
        deposit: payload.deposit,
        status: payload.status,
        payment_status: payload.payment_status,
        description: payload.description,
        operator_included: payload.operator_included,
        operator_name: payload.operator_name,
        fuel_included: payload.fuel_included,
        transport_cost: payload.transport_cost,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.rentals.insert(record, DEFAULT_ACTOR)?;
    info!(id = %created.id, client = %created.client_name, "rental created");
    Ok(created_response(created))
}

async fn update_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRentalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.rentals.update(&id, DEFAULT_ACTOR, |r| {
        if let Some(client_name) = payload.client_name {
            r.client_name = client_name;
        }
        if let Some(client_contact) = payload.client_contact {
            r.client_contact = client_contact;
        }
        if payload.client_email.is_some() {
            r.client_email = payload.client_email;
        }
        if payload.client_document.is_some() {
            r.client_document = payload.client_document;
        }
        if let Some(entity_name) = payload.entity_name {
            r.entity_name = entity_name;
        }
        if let Some(start_date) = payload.start_date {
            r.start_date = start_date;
        }
        if let Some(end_date) = payload.end_date {
            r.end_date = end_date;
        }
        if payload.actual_end_date.is_some() {
            r.actual_end_date = payload.actual_end_date;
        }
        if let Some(daily_rate) = payload.daily_rate {
            r.daily_rate = daily_rate;
        }
        if let Some(total_amount) = payload.total_amount {
            r.total_amount = total_amount;
        }
        if payload.deposit.is_some() {
            r.deposit = payload.deposit;
        }
        if let Some(status) = payload.status {
            r.status = status;
        }
        if let Some(payment_status) = payload.payment_status {
            r.payment_status = payment_status;
        }
        if let Some(description) = payload.description {
            r.description = description;
        }
        if let Some(operator_included) = payload.operator_included {
            r.operator_included = operator_included;
        }
        if payload.operator_name.is_some() {
            r.operator_name = payload.operator_name;
        }
        if let Some(fuel_included) = payload.fuel_included {
            r.fuel_included = fuel_included;
        }
        if payload.transport_cost.is_some() {
            r.transport_cost = payload.transport_cost;
        }
        if payload.notes.is_some() {
            r.notes = payload.notes;
        }
    })?;
    info!(id = %updated.id, status = %updated.status, "rental updated");
    Ok(success_response(updated))
}

async fn delete_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.rentals.remove(&id)?;
    info!(%id, "rental deleted");
    Ok(no_content_response())
}
