use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Availability status shared by machinery and vehicles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FleetStatus {
    #[default]
    Disponible,
    Alquilado,
    Mantenimiento,
    FueraServicio,
}

/// Physical condition rating.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Condition {
    Excelente,
    #[default]
    Bueno,
    Regular,
    Malo,
}

/// What a fuel or maintenance record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Machinery,
    Vehicle,
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FuelType {
    Diesel,
    Gasolina,
    Gas,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn fleet_status_round_trips_through_strings() {
        assert_eq!(FleetStatus::FueraServicio.to_string(), "fuera_servicio");
        assert_eq!(
            FleetStatus::from_str("fuera_servicio").unwrap(),
            FleetStatus::FueraServicio
        );
    }

    #[test]
    fn fleet_status_serializes_snake_case() {
        let json = serde_json::to_string(&FleetStatus::Alquilado).unwrap();
        assert_eq!(json, "\"alquilado\"");
    }
}
