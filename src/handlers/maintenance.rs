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
use crate::models::{
    EntityKind, MaintenancePartUsage, MaintenancePriority, MaintenanceRecord, MaintenanceStatus,
    MaintenanceType,
};
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateMaintenanceRequest {
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub entity_name: String,
    #[serde(rename = "type")]
    pub maintenance_type: MaintenanceType,
    #[serde(default)]
    pub priority: MaintenancePriority,
    #[serde(default)]
    pub status: MaintenanceStatus,
    pub scheduled_date: NaiveDate,
    pub description: String,
    pub technician_name: String,
    #[serde(default)]
    pub labor_hours: f64,
    #[serde(default)]
    pub labor_cost: f64,
    #[serde(default)]
    pub spare_parts: Vec<MaintenancePartUsage>,
    #[serde(default)]
    pub next_maintenance_date: Option<NaiveDate>,
    pub warehouse_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMaintenanceRequest {
    pub priority: Option<MaintenancePriority>,
    pub status: Option<MaintenanceStatus>,
    pub scheduled_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub technician_name: Option<String>,
    pub labor_hours: Option<f64>,
    pub labor_cost: Option<f64>,
    pub spare_parts: Option<Vec<MaintenancePartUsage>>,
    pub next_maintenance_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_maintenance).post(create_maintenance))
        .route(
            "/:id",
            get(get_maintenance)
                .put(update_maintenance)
                .delete(delete_maintenance),
        )
}

async fn list_maintenance(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .maintenance_records
        .all()
        .into_iter()
        .filter(|m| params.matches_search(&[&m.entity_name, &m.description, &m.technician_name]))
        .filter(|m| match &params.status {
            Some(status) => m.status.to_string() == *status,
            None => true,
        })
        .filter(|m| match &params.warehouse_id {
            Some(warehouse_id) => &m.warehouse_id == warehouse_id,
            None => true,
        })
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_maintenance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .maintenance_records
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Maintenance record {id} not found")))?;
    Ok(success_response(record))
}

async fn create_maintenance(
    State(state): State<AppState>,
    Json(payload): Json<CreateMaintenanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::maintenance(), &payload)?;

    let mut record = MaintenanceRecord {
        id: String::new(),
        entity_type: payload.entity_type,
        entity_id: payload.entity_id,
        entity_name: payload.entity_name,
        maintenance_type: payload.maintenance_type,
        priority: payload.priority,
        status: payload.status,
        scheduled_date: payload.scheduled_date,
        completed_date: None,
        description: payload.description,
        technician_name: payload.technician_name,
        labor_hours: payload.labor_hours,
        labor_cost: payload.labor_cost,
        spare_parts: payload.spare_parts,
        total_cost: 0.0,
        next_maintenance_date: payload.next_maintenance_date,
        warehouse_id: payload.warehouse_id,
        notes: payload.notes,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    record.total_cost = record.computed_total_cost();

    let created = state.store.maintenance_records.insert(record, DEFAULT_ACTOR)?;
    info!(id = %created.id, entity = %created.entity_name, "maintenance record created");
    Ok(created_response(created))
}

async fn update_maintenance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMaintenanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .store
        .maintenance_records
        .update(&id, DEFAULT_ACTOR, |m| {
            if let Some(priority) = payload.priority {
                m.priority = priority;
            }
            if let Some(status) = payload.status {
                m.status = status;
                if status == MaintenanceStatus::Completado && m.completed_date.is_none() {
                    m.completed_date = Some(Utc::now().date_naive());
                }
            }
            if let Some(scheduled_date) = payload.scheduled_date {
                m.scheduled_date = scheduled_date;
            }
            if payload.completed_date.is_some() {
                m.completed_date = payload.completed_date;
            }
            if let Some(description) = payload.description {
                m.description = description;
            }
            if let Some(technician_name) = payload.technician_name {
                m.technician_name = technician_name;
            }
            if let Some(labor_hours) = payload.labor_hours {
                m.labor_hours = labor_hours;
            }
            if let Some(labor_cost) = payload.labor_cost {
                m.labor_cost = labor_cost;
            }
            if let Some(spare_parts) = payload.spare_parts {
                m.spare_parts = spare_parts;
            }
            if payload.next_maintenance_date.is_some() {
                m.next_maintenance_date = payload.next_maintenance_date;
            }
            if payload.notes.is_some() {
                m.notes = payload.notes;
            }
            m.total_cost = m.computed_total_cost();
        })?;
    info!(id = %updated.id, status = %updated.status, "maintenance record updated");
    Ok(success_response(updated))
}

async fn delete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.maintenance_records.remove(&id)?;
    info!(%id, "maintenance record deleted");
    Ok(no_content_response())
}
