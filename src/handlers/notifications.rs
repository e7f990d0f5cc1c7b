use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::common::{created_response, no_content_response, paginate, success_response, ListParams};
use crate::errors::ApiError;
use crate::models::{Notification, NotificationKind};
use crate::store::{DEFAULT_ACTOR, SYSTEM_ACTOR};
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateNotificationRequest {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub action_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub unread_only: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
        .route("/:id", axum::routing::delete(delete_notification))
}

async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<NotificationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut items: Vec<_> = state
        .store
        .notifications
        .all()
        .into_iter()
        .filter(|n| match &filter.user_id {
            Some(user_id) => &n.user_id == user_id,
            None => true,
        })
        .filter(|n| !filter.unread_only || !n.read)
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(success_response(paginate(items, &params)))
}

async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = Notification {
        id: String::new(),
        user_id: payload.user_id,
        kind: payload.kind,
        title: payload.title,
        message: payload.message,
        read: false,
        action_url: payload.action_url,
        read_at: None,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.notifications.insert(record, SYSTEM_ACTOR)?;
    info!(id = %created.id, user = %created.user_id, "notification created");
    Ok(created_response(created))
}

async fn unread_count(
    State(state): State<AppState>,
    Query(filter): Query<NotificationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .store
        .notifications
        .all()
        .iter()
        .filter(|n| !n.read)
        .filter(|n| match &filter.user_id {
            Some(user_id) => &n.user_id == user_id,
            None => true,
        })
        .count();
    Ok(success_response(json!({ "count": count })))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.notifications.update(&id, DEFAULT_ACTOR, |n| {
        if !n.read {
            n.read = true;
            n.read_at = Some(Utc::now());
        }
    })?;
    Ok(success_response(updated))
}

async fn mark_all_read(
    State(state): State<AppState>,
    Query(filter): Query<NotificationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let pending: Vec<String> = state
        .store
        .notifications
        .all()
        .into_iter()
        .filter(|n| !n.read)
        .filter(|n| match &filter.user_id {
            Some(user_id) => &n.user_id == user_id,
            None => true,
        })
        .map(|n| n.id)
        .collect();

    let mut updated = 0;
    for id in pending {
        state.store.notifications.update(&id, DEFAULT_ACTOR, |n| {
            n.read = true;
            n.read_at = Some(Utc::now());
        })?;
        updated += 1;
    }
    info!(updated, "notifications marked read");
    Ok(success_response(json!({ "updated": updated })))
}

async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.notifications.remove(&id)?;
    Ok(no_content_response())
}
