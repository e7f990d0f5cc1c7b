use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{FleetStatus, FuelType};

/// A road vehicle of the fleet. SOAT and technical-review expirations drive
/// the document alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub id: String,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub mileage: f64,
    #[serde(default)]
    pub status: FleetStatus,
    pub soat_expiration: NaiveDate,
    pub technical_review_expiration: NaiveDate,
    #[serde(default)]
    pub driver_license_required: Option<String>,
    pub warehouse_id: String,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub insurance_expiration: Option<NaiveDate>,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
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

impl Vehicle {
    /// Documents (SOAT, technical review) expiring within `days` of `today`,
    /// as `(label, expiration)` pairs. Already-expired documents are included.
    pub fn expiring_documents(&self, today: NaiveDate, days: i64) -> Vec<(&'static str, NaiveDate)> {
        let horizon = today + Duration::days(days);
        let mut out = Vec::new();
        if self.soat_expiration <= horizon {
            out.push(("SOAT", self.soat_expiration));
        }
        if self.technical_review_expiration <= horizon {
            out.push(("Revisión técnica", self.technical_review_expiration));
        }
        out
    }

    pub fn is_available(&self) -> bool {
        self.status == FleetStatus::Disponible
    }
}

super::impl_record!(Vehicle);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_documents_inside_the_window() {
        let vehicle = Vehicle {
            id: "v-1".into(),
            plate: "ABC-123".into(),
            brand: "Toyota".into(),
            model: "Hilux".into(),
            year: 2022,
            mileage: 35_000.0,
            status: FleetStatus::Disponible,
            soat_expiration: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            technical_review_expiration: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            driver_license_required: None,
            warehouse_id: "1".into(),
            purchase_price: None,
            current_value: None,
            insurance_expiration: None,
            fuel_type: None,
            notes: None,
            created_at: Utc::now(),
            created_by: "admin".into(),
            updated_at: None,
            updated_by: None,
        };

        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let expiring = vehicle.expiring_documents(today, 30);
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].0, "SOAT");
    }
}
