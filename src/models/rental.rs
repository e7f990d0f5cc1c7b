use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RentalStatus {
    #[default]
    Cotizado,
    Confirmado,
    Activo,
    Completado,
    Cancelado,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pendiente,
    Parcial,
    Pagado,
    Vencido,
}

/// A rental contract for one machinery unit or vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    #[serde(default)]
    pub id: String,
    pub client_name: String,
    pub client_contact: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_document: Option<String>,
    /// Exactly one of `machinery_id` / `vehicle_id` is expected to be set;
    /// the store does not enforce it.
    #[serde(default)]
    pub machinery_id: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    /// Denormalised display name of the rented unit.
    pub entity_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub actual_end_date: Option<NaiveDate>,
    pub daily_rate: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub deposit: Option<f64>,
    #[serde(default)]
    pub status: RentalStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub operator_included: bool,
    #[serde(default)]
    pub operator_name: Option<String>,
    #[serde(default)]
    pub fuel_included: bool,
    #[serde(default)]
    pub transport_cost: Option<f64>,
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

impl Rental {
    pub fn is_active(&self) -> bool {
        self.status == RentalStatus::Activo
    }
}

super::impl_record!(Rental);
