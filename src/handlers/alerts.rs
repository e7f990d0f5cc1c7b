use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::common::{
    created_response, no_content_response, paginate, success_response, ListParams,
};
use crate::errors::ApiError;
use crate::models::{Alert, AlertSeverity, AlertType};
use crate::store::{DEFAULT_ACTOR, SYSTEM_ACTOR};
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateAlertRequest {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    #[serde(default)]
    pub category: Option<String>,
    pub related_entity: String,
    pub related_entity_id: String,
    #[serde(default)]
    pub action_required: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveAlertRequest {
    #[serde(default)]
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub resolved: Option<bool>,
    #[serde(default)]
    pub severity: Option<AlertSeverity>,
    #[serde(rename = "type", default)]
    pub alert_type: Option<AlertType>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_alerts).post(create_alert))
        .route("/generate", post(generate_alerts))
        .route("/:id", get(get_alert).delete(delete_alert))
        .route("/:id/resolve", post(resolve_alert))
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<AlertFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut items: Vec<_> = state
        .store
        .alerts
        .all()
        .into_iter()
        .filter(|a| params.matches_search(&[&a.title, &a.description]))
        .filter(|a| match filter.resolved {
            Some(resolved) => a.resolved == resolved,
            None => true,
        })
        .filter(|a| match filter.severity {
            Some(severity) => a.severity == severity,
            None => true,
        })
        .filter(|a| match filter.alert_type {
            Some(alert_type) => a.alert_type == alert_type,
            None => true,
        })
        .collect();
    // Most severe first, newest within a severity.
    items.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.created_at.cmp(&a.created_at))
    });
    Ok(success_response(paginate(items, &params)))
}

async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let alert = state
        .store
        .alerts
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Alert {id} not found")))?;
    Ok(success_response(alert))
}

async fn create_alert(
    State(state): State<AppState>,
    Json(payload): Json<CreateAlertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = Alert {
        id: String::new(),
        alert_type: payload.alert_type,
        title: payload.title,
        description: payload.description,
        severity: payload.severity,
        category: payload.category,
        related_entity: payload.related_entity,
        related_entity_id: payload.related_entity_id,
        action_required: payload.action_required,
        due_date: payload.due_date,
        assigned_to: payload.assigned_to,
        resolved: false,
        resolved_at: None,
        resolved_by: None,
        resolution_notes: None,
        auto_generated: false,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.alerts.insert(record, SYSTEM_ACTOR)?;
    info!(id = %created.id, severity = %created.severity, "alert created");
    Ok(created_response(created))
}

/// Runs the generation pass on demand.
async fn generate_alerts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .services
        .alerts
        .generate(Utc::now().date_naive())
        .map_err(ApiError::Service)?;
    Ok(success_response(created))
}

async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ResolveAlertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let resolved = state
        .services
        .alerts
        .resolve(&id, payload.resolution_notes, DEFAULT_ACTOR)
        .map_err(ApiError::Service)?;
    info!(id = %resolved.id, "alert resolved");
    Ok(success_response(resolved))
}

async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.alerts.remove(&id)?;
    info!(%id, "alert deleted");
    Ok(no_content_response())
}
