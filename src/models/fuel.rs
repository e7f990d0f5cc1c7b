use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EntityKind, FuelType};

/// A fuel load for a machinery unit or vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelRecord {
    #[serde(default)]
    pub id: String,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub entity_name: String,
    pub date: NaiveDate,
    pub liters: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub fuel_type: FuelType,
    pub location: String,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub odometer: Option<f64>,
    #[serde(default)]
    pub hourmeter: Option<f64>,
    #[serde(default)]
    pub operator_name: Option<String>,
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

super::impl_record!(FuelRecord);
