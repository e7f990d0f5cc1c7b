//! Business services over the entity store.

pub mod alerts;
pub mod dashboard;
pub mod export;
pub mod search;

pub use alerts::AlertService;
pub use dashboard::{DashboardService, DashboardStats};
pub use export::{ExportFile, ExportFormat, ExportService};
pub use search::{SearchHit, SearchKind, SearchService};
