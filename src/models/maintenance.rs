use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::common::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaintenanceType {
    Preventivo,
    Correctivo,
    Emergencia,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaintenancePriority {
    Baja,
    #[default]
    Media,
    Alta,
    Critica,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaintenanceStatus {
    #[default]
    Programado,
    EnProgreso,
    Completado,
    Cancelado,
}

/// A spare part consumed during a maintenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePartUsage {
    pub spare_part_id: String,
    pub spare_part_name: String,
    pub spare_part_code: String,
    pub quantity: u32,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub warehouse_id: String,
}

/// A scheduled or executed maintenance over a fleet entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    #[serde(default)]
    pub id: String,
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
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    pub description: String,
    pub technician_name: String,
    #[serde(default)]
    pub labor_hours: f64,
    #[serde(default)]
    pub labor_cost: f64,
    #[serde(default)]
    pub spare_parts: Vec<MaintenancePartUsage>,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub next_maintenance_date: Option<NaiveDate>,
    pub warehouse_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl MaintenanceRecord {
    /// Scheduled or currently executing.
    pub fn is_pending(&self) -> bool {
        matches!(
            self.status,
            MaintenanceStatus::Programado | MaintenanceStatus::EnProgreso
        )
    }

    /// Labor plus consumed parts.
    pub fn computed_total_cost(&self) -> f64 {
        self.labor_cost + self.spare_parts.iter().map(|p| p.total_cost).sum::<f64>()
    }
}

super::impl_record!(MaintenanceRecord);
