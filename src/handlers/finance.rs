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
use crate::models::finance::DEFAULT_CURRENCY;
use crate::models::{FinancialRecord, FinancialStatus, FinancialType};
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateFinancialRecordRequest {
    #[serde(rename = "type")]
    pub record_type: FinancialType,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub description: String,
    pub amount: f64,
    /// Defaults to the company currency.
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
    pub date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub related_entity: Option<String>,
    #[serde(default)]
    pub related_entity_id: Option<String>,
    #[serde(default)]
    pub warehouse_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFinancialRecordRequest {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub exchange_rate: Option<f64>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub status: Option<FinancialStatus>,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/:id", get(get_record).put(update_record).delete(delete_record))
}

async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .financial_records
        .all()
        .into_iter()
        .filter(|r| params.matches_search(&[&r.description, &r.category]))
        .filter(|r| match &params.status {
            Some(status) => r.status.to_string() == *status,
            None => true,
        })
        .filter(|r| match &params.category {
            Some(category) => &r.category == category,
            None => true,
        })
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .financial_records
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Financial record {id} not found")))?;
    Ok(success_response(record))
}

async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<CreateFinancialRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::financial(), &payload)?;

    // New records are stamped as paid in the company currency unless told
    // otherwise.
    let record = FinancialRecord {
        id: String::new(),
        record_type: payload.record_type,
        category: payload.category,
        subcategory: payload.subcategory,
        description: payload.description,
        amount: payload.amount,
        currency: payload
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        exchange_rate: payload.exchange_rate,
        date: payload.date,
        due_date: payload.due_date,
        payment_method: payload.payment_method,
        reference_number: payload.reference_number,
        related_entity: payload.related_entity,
        related_entity_id: payload.related_entity_id,
        warehouse_id: payload.warehouse_id,
        status: FinancialStatus::Pagado,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.financial_records.insert(record, DEFAULT_ACTOR)?;
    info!(id = %created.id, amount = created.amount, "financial record created");
    Ok(created_response(created))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateFinancialRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .store
        .financial_records
        .update(&id, DEFAULT_ACTOR, |r| {
            if let Some(category) = payload.category {
                r.category = category;
            }
            if payload.subcategory.is_some() {
                r.subcategory = payload.subcategory;
            }
            if let Some(description) = payload.description {
                r.description = description;
            }
            if let Some(amount) = payload.amount {
                r.amount = amount;
            }
            if let Some(currency) = payload.currency {
                r.currency = currency;
            }
            if payload.exchange_rate.is_some() {
                r.exchange_rate = payload.exchange_rate;
            }
            if let Some(date) = payload.date {
                r.date = date;
            }
            if payload.due_date.is_some() {
                r.due_date = payload.due_date;
            }
            if payload.payment_method.is_some() {
                r.payment_method = payload.payment_method;
            }
            if payload.reference_number.is_some() {
                r.reference_number = payload.reference_number;
            }
            if let Some(status) = payload.status {
                r.status = status;
            }
            if payload.notes.is_some() {
                r.notes = payload.notes;
            }
        })?;
    info!(id = %updated.id, "financial record updated");
    Ok(success_response(updated))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.financial_records.remove(&id)?;
    info!(%id, "financial record deleted");
    Ok(no_content_response())
}
