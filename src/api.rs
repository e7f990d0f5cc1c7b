//! Route composition.

use axum::{routing::get, Router};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

use crate::{handlers, health, AppState};

/// Everything mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(health::api_status))
        .route("/ping", get(health::api_ping))
        .nest("/warehouses", handlers::warehouses::routes())
        .nest("/machinery", handlers::machinery::routes())
        .nest("/vehicles", handlers::vehicles::routes())
        .nest("/tools", handlers::tools::routes())
        .nest("/spareparts", handlers::spare_parts::routes())
        .nest("/rentals", handlers::rentals::routes())
        .nest("/fuel", handlers::fuel::routes())
        .nest("/maintenance", handlers::maintenance::routes())
        .nest("/finance", handlers::finance::routes())
        .nest("/users", handlers::users::routes())
        .nest("/alerts", handlers::alerts::routes())
        .nest("/notifications", handlers::notifications::routes())
        .route("/search", get(handlers::search::global_search))
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route("/export/:collection", get(handlers::export::export_collection))
}

/// Full application router: health, API, and the static SPA build with a
/// fallback to the index document for client-side routes.
pub fn app_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let index = Path::new(&static_dir).join("index.html");
    let spa = ServeDir::new(&static_dir).not_found_service(ServeFile::new(index));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .fallback_service(spa)
        .with_state(state)
}
