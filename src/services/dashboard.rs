//! Dashboard stat aggregation.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::instrument;

use crate::models::{AlertSeverity, FinancialType, FleetStatus};
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_machinery: usize,
    pub available_machinery: usize,
    pub total_vehicles: usize,
    pub available_vehicles: usize,
    pub total_tools: usize,
    pub available_tools: usize,
    pub total_rentals: usize,
    pub active_rentals: usize,
    pub critical_alerts: usize,
    pub pending_maintenances: usize,
    pub monthly_revenue: f64,
    pub monthly_expenses: f64,
    pub profit_margin: f64,
    pub utilization_rate: f64,
}

pub struct DashboardService {
    store: Arc<EntityStore>,
}

impl DashboardService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Aggregates the stats as of `today`. Monthly figures cover `today`'s
    /// calendar month.
    #[instrument(skip(self))]
    pub fn stats(&self, today: NaiveDate) -> DashboardStats {
        let machinery = self.store.machinery.all();
        let vehicles = self.store.vehicles.all();
        let tools = self.store.tools.all();
        let rentals = self.store.rentals.all();

        let rented_units = machinery
            .iter()
            .filter(|m| m.status == FleetStatus::Alquilado)
            .count()
            + vehicles
                .iter()
                .filter(|v| v.status == FleetStatus::Alquilado)
                .count();
        let fleet_units = machinery.len() + vehicles.len();

        let mut monthly_revenue = 0.0;
        let mut monthly_expenses = 0.0;
        for record in self.store.financial_records.all() {
            if record.date.year() == today.year() && record.date.month() == today.month() {
                match record.record_type {
                    FinancialType::Ingreso => monthly_revenue += record.amount,
                    FinancialType::Egreso => monthly_expenses += record.amount,
                }
            }
        }

        DashboardStats {
            total_machinery: machinery.len(),
            available_machinery: machinery.iter().filter(|m| m.is_available()).count(),
            total_vehicles: vehicles.len(),
            available_vehicles: vehicles.iter().filter(|v| v.is_available()).count(),
            total_tools: tools.len(),
            available_tools: tools.iter().filter(|t| t.is_available()).count(),
            total_rentals: rentals.len(),
            active_rentals: rentals.iter().filter(|r| r.is_active()).count(),
            critical_alerts: self
                .store
                .alerts
                .all()
                .iter()
                .filter(|a| !a.resolved && a.severity == AlertSeverity::Critical)
                .count(),
            pending_maintenances: self
                .store
                .maintenance_records
                .all()
                .iter()
                .filter(|m| m.is_pending())
                .count(),
            monthly_revenue,
            monthly_expenses,
            profit_margin: if monthly_revenue > 0.0 {
                (monthly_revenue - monthly_expenses) / monthly_revenue * 100.0
            } else {
                0.0
            },
            utilization_rate: if fleet_units > 0 {
                rented_units as f64 / fleet_units as f64 * 100.0
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinancialRecord, FinancialStatus, FinancialType};
    use crate::store::DEFAULT_ACTOR;
    use chrono::Utc;

    fn record(record_type: FinancialType, amount: f64, date: NaiveDate) -> FinancialRecord {
        FinancialRecord {
            id: String::new(),
            record_type,
            category: "alquiler".into(),
            subcategory: None,
            description: "registro".into(),
            amount,
            currency: "PEN".into(),
            exchange_rate: None,
            date,
            due_date: None,
            payment_method: None,
            reference_number: None,
            related_entity: None,
            related_entity_id: None,
            warehouse_id: None,
            status: FinancialStatus::Pagado,
            notes: None,
            created_at: Utc::now(),
            created_by: String::new(),
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn monthly_figures_only_count_the_current_month() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EntityStore::open(dir.path()).unwrap());
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        for (kind, amount, date) in [
            (FinancialType::Ingreso, 1000.0, today),
            (FinancialType::Egreso, 400.0, today),
            // Previous month: excluded.
            (
                FinancialType::Ingreso,
                9999.0,
                NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
            ),
        ] {
            store
                .financial_records
                .insert(record(kind, amount, date), DEFAULT_ACTOR)
                .unwrap();
        }

        let stats = DashboardService::new(store).stats(today);
        assert_eq!(stats.monthly_revenue, 1000.0);
        assert_eq!(stats.monthly_expenses, 400.0);
        assert!((stats.profit_margin - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_store_yields_zero_rates() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EntityStore::open(dir.path()).unwrap());
        let stats = DashboardService::new(store).stats(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(stats.profit_margin, 0.0);
        assert_eq!(stats.utilization_rate, 0.0);
        assert_eq!(stats.total_machinery, 0);
    }
}
