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
use crate::models::{Permission, User, UserRole};
use crate::store::DEFAULT_ACTOR;
use crate::validation::schemas;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub permissions: Option<Vec<Permission>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<_> = state
        .store
        .users
        .all()
        .into_iter()
        .filter(|u| params.matches_search(&[&u.name, &u.email]))
        .collect();
    Ok(success_response(paginate(items, &params)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .users
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("User {id} not found")))?;
    Ok(success_response(user))
}

async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&schemas::user(), &payload)?;

    if state
        .store
        .users
        .all()
        .iter()
        .any(|u| u.email.eq_ignore_ascii_case(&payload.email))
    {
        return Err(ApiError::Validation {
            errors: vec!["email: Ya existe un usuario con este correo".to_string()],
        });
    }

    let record = User {
        id: String::new(),
        name: payload.name,
        email: payload.email,
        role: payload.role,
        permissions: payload.permissions,
        last_login: None,
        created_at: Utc::now(),
        created_by: String::new(),
        updated_at: None,
        updated_by: None,
    };
    let created = state.store.users.insert(record, DEFAULT_ACTOR)?;
    info!(id = %created.id, role = %created.role, "user created");
    Ok(created_response(created))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.store.users.update(&id, DEFAULT_ACTOR, |u| {
        if let Some(name) = payload.name {
            u.name = name;
        }
        if let Some(email) = payload.email {
            u.email = email;
        }
        if let Some(role) = payload.role {
            u.role = role;
        }
        if let Some(permissions) = payload.permissions {
            u.permissions = permissions;
        }
    })?;
    info!(id = %updated.id, "user updated");
    Ok(success_response(updated))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.users.remove(&id)?;
    info!(%id, "user deleted");
    Ok(no_content_response())
}
