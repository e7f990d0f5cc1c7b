//! Alert generation and resolution.
//!
//! The generation pass scans the collections for expiring vehicle
//! documents, low spare-part stock and due machinery maintenance, raising
//! `auto_generated` alerts. It is idempotent while an unresolved alert for
//! the same (type, entity) pair exists.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use crate::config::AlertConfig;
use crate::errors::ServiceError;
use crate::models::{Alert, AlertSeverity, AlertType};
use crate::store::{EntityStore, SYSTEM_ACTOR};

pub struct AlertService {
    store: Arc<EntityStore>,
    config: AlertConfig,
}

impl AlertService {
    pub fn new(store: Arc<EntityStore>, config: AlertConfig) -> Self {
        Self { store, config }
    }

    /// Scans the collections and inserts the missing auto-generated alerts,
    /// returning the ones created by this pass.
    #[instrument(skip(self))]
    pub fn generate(&self, today: NaiveDate) -> Result<Vec<Alert>, ServiceError> {
        let open: HashSet<(AlertType, String)> = self
            .store
            .alerts
            .all()
            .into_iter()
            .filter(|a| !a.resolved)
            .map(|a| (a.alert_type, a.related_entity_id))
            .collect();

        let mut created = Vec::new();

        for vehicle in self.store.vehicles.all() {
            let expiring =
                vehicle.expiring_documents(today, self.config.document_expiration_days);
            if expiring.is_empty() || open.contains(&(AlertType::Document, vehicle.id.clone())) {
                continue;
            }
            let (label, expiration) = expiring[0];
            let expired = expiration < today;
            created.push(self.insert(Alert {
                id: String::new(),
                alert_type: AlertType::Document,
                title: format!("{label} de {} por vencer", vehicle.plate),
                description: format!(
                    "{label} del vehículo {} vence el {expiration}",
                    vehicle.plate
                ),
                severity: if expired {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                },
                category: None,
                related_entity: "vehicles".to_string(),
                related_entity_id: vehicle.id.clone(),
                action_required: Some(format!("Renovar {label}")),
                due_date: Some(expiration),
                assigned_to: None,
                resolved: false,
                resolved_at: None,
                resolved_by: None,
                resolution_notes: None,
                auto_generated: true,
                created_at: Utc::now(),
                created_by: String::new(),
                updated_at: None,
                updated_by: None,
            })?);
        }

        for part in self.store.spare_parts.all() {
            if !part.is_low_on_stock() || open.contains(&(AlertType::Stock, part.id.clone())) {
                continue;
            }
            let stock = part.total_stock();
            created.push(self.insert(Alert {
                id: String::new(),
                alert_type: AlertType::Stock,
                title: format!("Stock bajo: {}", part.name),
                description: format!(
                    "El repuesto {} ({}) tiene {stock} unidades, mínimo {}",
                    part.name, part.code, part.min_stock
                ),
                severity: if stock == 0 {
                    AlertSeverity::Critical
                } else {
                    AlertSeverity::High
                },
                category: part.category.clone(),
                related_entity: "spare_parts".to_string(),
                related_entity_id: part.id.clone(),
                action_required: Some("Reponer stock".to_string()),
                due_date: None,
                assigned_to: None,
                resolved: false,
                resolved_at: None,
                resolved_by: None,
                resolution_notes: None,
                auto_generated: true,
                created_at: Utc::now(),
                created_by: String::new(),
                updated_at: None,
                updated_by: None,
            })?);
        }

        let horizon = today + chrono::Duration::days(self.config.maintenance_due_days);
        for unit in self.store.machinery.all() {
            let Some(next) = unit.next_maintenance else {
                continue;
            };
            if next > horizon || open.contains(&(AlertType::Maintenance, unit.id.clone())) {
                continue;
            }
            created.push(self.insert(Alert {
                id: String::new(),
                alert_type: AlertType::Maintenance,
                title: format!("Mantenimiento de {}", unit.name),
                description: format!(
                    "La maquinaria {} tiene mantenimiento programado para el {next}",
                    unit.name
                ),
                severity: if unit.is_due_for_maintenance(today) {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                },
                category: Some(unit.category.clone()),
                related_entity: "machinery".to_string(),
                related_entity_id: unit.id.clone(),
                action_required: Some("Programar mantenimiento".to_string()),
                due_date: Some(next),
                assigned_to: None,
                resolved: false,
                resolved_at: None,
                resolved_by: None,
                resolution_notes: None,
                auto_generated: true,
                created_at: Utc::now(),
                created_by: String::new(),
                updated_at: None,
                updated_by: None,
            })?);
        }

        if !created.is_empty() {
            info!(count = created.len(), "alerts generated");
        }
        Ok(created)
    }

    /// Marks an alert resolved, stamping the resolution audit fields.
    pub fn resolve(
        &self,
        id: &str,
        notes: Option<String>,
        actor: &str,
    ) -> Result<Alert, ServiceError> {
        let actor = actor.to_string();
        let alert = self.store.alerts.update(id, &actor, |alert| {
            alert.resolved = true;
            alert.resolved_at = Some(Utc::now());
            alert.resolved_by = Some(actor.clone());
            alert.resolution_notes = notes;
        })?;
        Ok(alert)
    }

    fn insert(&self, alert: Alert) -> Result<Alert, ServiceError> {
        Ok(self.store.alerts.insert(alert, SYSTEM_ACTOR)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FleetStatus, SparePart, Vehicle};
    use crate::store::DEFAULT_ACTOR;
    use std::collections::HashMap;

    fn service(store: Arc<EntityStore>) -> AlertService {
        AlertService::new(store, AlertConfig::default())
    }

    fn vehicle_expiring_soat(on: NaiveDate) -> Vehicle {
        Vehicle {
            id: String::new(),
            plate: "ABC-123".into(),
            brand: "Toyota".into(),
            model: "Hilux".into(),
            year: 2022,
            mileage: 0.0,
            status: FleetStatus::Disponible,
            soat_expiration: on,
            technical_review_expiration: on + chrono::Duration::days(400),
            driver_license_required: None,
            warehouse_id: "1".into(),
            purchase_price: None,
            current_value: None,
            insurance_expiration: None,
            fuel_type: None,
            notes: None,
            created_at: Utc::now(),
            created_by: String::new(),
            updated_at: None,
            updated_by: None,
        }
    }

    fn depleted_part() -> SparePart {
        SparePart {
            id: String::new(),
            code: "FIL-001".into(),
            name: "Filtro de aceite".into(),
            category: None,
            brand: "Mann".into(),
            model: None,
            description: None,
            unit_price: 45.0,
            stock_by_warehouse: HashMap::new(),
            min_stock: 4,
            max_stock: None,
            reorder_point: None,
            compatible_machinery: vec![],
            compatible_vehicles: vec![],
            suppliers: vec![],
            location: None,
            last_purchase_date: None,
            last_purchase_price: None,
            notes: None,
            created_at: Utc::now(),
            created_by: String::new(),
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn generation_is_idempotent_while_alert_is_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EntityStore::open(dir.path()).unwrap());
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        store
            .vehicles
            .insert(vehicle_expiring_soat(today + chrono::Duration::days(10)), DEFAULT_ACTOR)
            .unwrap();

        let svc = service(store.clone());
        let first = svc.generate(today).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].alert_type, AlertType::Document);
        assert!(first[0].auto_generated);

        let second = svc.generate(today).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn resolving_reopens_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EntityStore::open(dir.path()).unwrap());
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        store.spare_parts.insert(depleted_part(), DEFAULT_ACTOR).unwrap();

        let svc = service(store.clone());
        let first = svc.generate(today).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].severity, AlertSeverity::Critical);

        let resolved = svc
            .resolve(&first[0].id, Some("pedido enviado".into()), DEFAULT_ACTOR)
            .unwrap();
        assert!(resolved.resolved);
        assert_eq!(resolved.resolved_by.as_deref(), Some(DEFAULT_ACTOR));

        // Stock is still depleted, so the next pass raises a fresh alert.
        let second = svc.generate(today).unwrap();
        assert_eq!(second.len(), 1);
    }
}
