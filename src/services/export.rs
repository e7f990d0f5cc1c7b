//! Export synthesis: CSV built from the records, or a placeholder PDF.

use std::fmt::Write as _;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::errors::ServiceError;
use crate::store::EntityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Pdf,
}

#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Bytes,
}

pub struct ExportService {
    store: Arc<EntityStore>,
}

impl ExportService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub fn export(
        &self,
        collection: &str,
        format: ExportFormat,
    ) -> Result<ExportFile, ServiceError> {
        let date = Utc::now().date_naive();
        match format {
            ExportFormat::Csv => {
                let csv = self.render_csv(collection)?;
                Ok(ExportFile {
                    filename: format!("{collection}-{date}.csv"),
                    content_type: "text/csv",
                    body: Bytes::from(csv),
                })
            }
            ExportFormat::Pdf => {
                // Placeholder document until a real renderer exists.
                self.render_csv(collection)?; // still validates the collection name
                Ok(ExportFile {
                    filename: format!("{collection}-{date}.pdf"),
                    content_type: "application/pdf",
                    body: Bytes::from_static(PLACEHOLDER_PDF),
                })
            }
        }
    }

    fn render_csv(&self, collection: &str) -> Result<String, ServiceError> {
        let rows = match collection {
            "machinery" => csv_table(
                &["id", "name", "category", "brand", "model", "serial_number", "year", "status", "warehouse_id"],
                self.store.machinery.all(),
                |m| {
                    vec![
                        m.id.clone(),
                        m.name.clone(),
                        m.category.clone(),
                        m.brand.clone(),
                        m.model.clone(),
                        m.serial_number.clone(),
                        m.year.to_string(),
                        m.status.to_string(),
                        m.warehouse_id.clone(),
                    ]
                },
            ),
            "vehicles" => csv_table(
                &["id", "plate", "brand", "model", "year", "mileage", "status", "soat_expiration", "technical_review_expiration", "warehouse_id"],
                self.store.vehicles.all(),
                |v| {
                    vec![
                        v.id.clone(),
                        v.plate.clone(),
                        v.brand.clone(),
                        v.model.clone(),
                        v.year.to_string(),
                        v.mileage.to_string(),
                        v.status.to_string(),
                        v.soat_expiration.to_string(),
                        v.technical_review_expiration.to_string(),
                        v.warehouse_id.clone(),
                    ]
                },
            ),
            "warehouses" => csv_table(
                &["id", "name", "address", "city", "phone", "manager"],
                self.store.warehouses.all(),
                |w| {
                    vec![
                        w.id.clone(),
                        w.name.clone(),
                        w.address.clone(),
                        w.city.clone(),
                        w.phone.clone().unwrap_or_default(),
                        w.manager.clone().unwrap_or_default(),
                    ]
                },
            ),
            "tools" => csv_table(
                &["id", "name", "internal_code", "category", "brand", "status", "condition", "warehouse_id"],
                self.store.tools.all(),
                |t| {
                    vec![
                        t.id.clone(),
                        t.name.clone(),
                        t.internal_code.clone(),
                        t.category.clone().unwrap_or_default(),
                        t.brand.clone().unwrap_or_default(),
                        t.status.to_string(),
                        t.condition.to_string(),
                        t.warehouse_id.clone(),
                    ]
                },
            ),
            "spareparts" => csv_table(
                &["id", "code", "name", "brand", "unit_price", "total_stock", "min_stock"],
                self.store.spare_parts.all(),
                |p| {
                    vec![
                        p.id.clone(),
                        p.code.clone(),
                        p.name.clone(),
                        p.brand.clone(),
                        p.unit_price.to_string(),
                        p.total_stock().to_string(),
                        p.min_stock.to_string(),
                    ]
                },
            ),
            "rentals" => csv_table(
                &["id", "client_name", "entity_name", "start_date", "end_date", "daily_rate", "total_amount", "status", "payment_status"],
                self.store.rentals.all(),
                |r| {
                    vec![
                        r.id.clone(),
                        r.client_name.clone(),
                        r.entity_name.clone(),
                        r.start_date.to_string(),
                        r.end_date.to_string(),
                        r.daily_rate.to_string(),
                        r.total_amount.to_string(),
                        r.status.to_string(),
                        r.payment_status.to_string(),
                    ]
                },
            ),
            "maintenance" => csv_table(
                &["id", "entity_type", "entity_name", "type", "priority", "status", "scheduled_date", "technician_name", "total_cost"],
                self.store.maintenance_records.all(),
                |m| {
                    vec![
                        m.id.clone(),
                        m.entity_type.to_string(),
                        m.entity_name.clone(),
                        m.maintenance_type.to_string(),
                        m.priority.to_string(),
                        m.status.to_string(),
                        m.scheduled_date.to_string(),
                        m.technician_name.clone(),
                        m.total_cost.to_string(),
                    ]
                },
            ),
            "fuel" => csv_table(
                &["id", "entity_type", "entity_name", "date", "liters", "unit_cost", "total_cost", "fuel_type", "location"],
                self.store.fuel_records.all(),
                |f| {
                    vec![
                        f.id.clone(),
                        f.entity_type.to_string(),
                        f.entity_name.clone(),
                        f.date.to_string(),
                        f.liters.to_string(),
                        f.unit_cost.to_string(),
                        f.total_cost.to_string(),
                        f.fuel_type.to_string(),
                        f.location.clone(),
                    ]
                },
            ),
            "finance" => csv_table(
                &["id", "type", "category", "description", "amount", "currency", "date", "status"],
                self.store.financial_records.all(),
                |f| {
                    vec![
                        f.id.clone(),
                        f.record_type.to_string(),
                        f.category.clone(),
                        f.description.clone(),
                        f.amount.to_string(),
                        f.currency.clone(),
                        f.date.to_string(),
                        f.status.to_string(),
                    ]
                },
            ),
            "users" => csv_table(
                &["id", "name", "email", "role"],
                self.store.users.all(),
                |u| {
                    vec![
                        u.id.clone(),
                        u.name.clone(),
                        u.email.clone(),
                        u.role.to_string(),
                    ]
                },
            ),
            other => {
                return Err(ServiceError::InvalidInput(format!(
                    "colección desconocida: {other}"
                )))
            }
        };
        Ok(rows)
    }
}

fn csv_table<T>(headers: &[&str], rows: Vec<T>, to_row: impl Fn(&T) -> Vec<String>) -> String {
    let mut out = String::new();
    writeln_row(&mut out, headers.iter().map(|h| h.to_string()).collect());
    for row in &rows {
        writeln_row(&mut out, to_row(row));
    }
    out
}

fn writeln_row(out: &mut String, cells: Vec<String>) {
    let line = cells
        .iter()
        .map(|cell| escape_csv(cell))
        .collect::<Vec<_>>()
        .join(",");
    let _ = writeln!(out, "{line}");
}

/// Quotes cells containing separators, quotes or newlines.
fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Minimal one-page document served while PDF rendering is out of scope.
const PLACEHOLDER_PDF: &[u8] = b"%PDF-1.4\n1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj\n2 0 obj<</Type/Pages/Kids[3 0 R]/Count 1>>endobj\n3 0 obj<</Type/Page/Parent 2 0 R/MediaBox[0 0 612 792]>>endobj\ntrailer<</Root 1 0 R>>\n%%EOF\n";
