use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Condition, FleetStatus, FuelType};

/// A heavy-machinery unit available for rental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machinery {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub year: i32,
    #[serde(default)]
    pub hourmeter: f64,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub status: FleetStatus,
    pub warehouse_id: String,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub insurance_expiration: Option<NaiveDate>,
    #[serde(default)]
    pub last_maintenance: Option<NaiveDate>,
    #[serde(default)]
    pub next_maintenance: Option<NaiveDate>,
    #[serde(default)]
    pub maintenance_interval_hours: Option<f64>,
    #[serde(default)]
    pub maintenance_interval_days: Option<i64>,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
    #[serde(default)]
    pub fuel_capacity: Option<f64>,
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

impl Machinery {
    /// Whether the unit is due for maintenance on `date`. Units without a
    /// scheduled next maintenance are never reported as due.
    pub fn is_due_for_maintenance(&self, date: NaiveDate) -> bool {
        self.next_maintenance.is_some_and(|next| date >= next)
    }

    pub fn is_available(&self) -> bool {
        self.status == FleetStatus::Disponible
    }
}

super::impl_record!(Machinery);

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(next: Option<NaiveDate>) -> Machinery {
        Machinery {
            id: "m-1".into(),
            name: "Excavadora CAT 320".into(),
            category: "excavadora".into(),
            brand: "Caterpillar".into(),
            model: "320".into(),
            serial_number: "CAT320X99".into(),
            year: 2021,
            hourmeter: 1450.0,
            condition: Condition::Bueno,
            status: FleetStatus::Disponible,
            warehouse_id: "1".into(),
            purchase_price: None,
            current_value: None,
            insurance_expiration: None,
            last_maintenance: None,
            next_maintenance: next,
            maintenance_interval_hours: None,
            maintenance_interval_days: None,
            fuel_type: None,
            fuel_capacity: None,
            notes: None,
            created_at: Utc::now(),
            created_by: "admin".into(),
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn due_on_or_after_next_maintenance_date() {
        let next = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let unit = unit(Some(next));
        assert!(!unit.is_due_for_maintenance(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
        assert!(unit.is_due_for_maintenance(next));
        assert!(unit.is_due_for_maintenance(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
    }

    #[test]
    fn never_due_without_schedule() {
        let unit = unit(None);
        assert!(!unit.is_due_for_maintenance(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }
}
