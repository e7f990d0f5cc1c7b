pub mod alerts;
pub mod common;
pub mod dashboard;
pub mod export;
pub mod finance;
pub mod fuel;
pub mod machinery;
pub mod maintenance;
pub mod notifications;
pub mod rentals;
pub mod search;
pub mod spare_parts;
pub mod tools;
pub mod users;
pub mod vehicles;
pub mod warehouses;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::services::{AlertService, DashboardService, ExportService, SearchService};
use crate::store::EntityStore;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub search: Arc<SearchService>,
    pub dashboard: Arc<DashboardService>,
    pub alerts: Arc<AlertService>,
    pub export: Arc<ExportService>,
}

impl AppServices {
    pub fn new(store: Arc<EntityStore>, config: &AppConfig) -> Self {
        let search_ttl = Duration::from_secs(config.cache.search_ttl_secs);
        Self {
            search: Arc::new(SearchService::new(store.clone(), search_ttl)),
            dashboard: Arc::new(DashboardService::new(store.clone())),
            alerts: Arc::new(AlertService::new(store.clone(), config.alerts.clone())),
            export: Arc::new(ExportService::new(store)),
        }
    }
}
