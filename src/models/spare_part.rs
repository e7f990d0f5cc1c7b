use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A spare part with per-warehouse stock levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePart {
    #[serde(default)]
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub brand: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_price: f64,
    /// Warehouse id -> units on hand.
    #[serde(default)]
    pub stock_by_warehouse: HashMap<String, u32>,
    pub min_stock: u32,
    #[serde(default)]
    pub max_stock: Option<u32>,
    #[serde(default)]
    pub reorder_point: Option<u32>,
    #[serde(default)]
    pub compatible_machinery: Vec<String>,
    #[serde(default)]
    pub compatible_vehicles: Vec<String>,
    #[serde(default)]
    pub suppliers: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub last_purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_purchase_price: Option<f64>,
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

impl SparePart {
    /// Units on hand across every warehouse.
    pub fn total_stock(&self) -> u32 {
        self.stock_by_warehouse.values().sum()
    }

    /// At or below the minimum stock level.
    pub fn is_low_on_stock(&self) -> bool {
        self.total_stock() <= self.min_stock
    }
}

super::impl_record!(SparePart);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_stock_sums_warehouses() {
        let mut stock = HashMap::new();
        stock.insert("1".to_string(), 3);
        stock.insert("2".to_string(), 4);
        let part = SparePart {
            id: "p-1".into(),
            code: "FIL-001".into(),
            name: "Filtro de aceite".into(),
            category: None,
            brand: "Mann".into(),
            model: None,
            description: None,
            unit_price: 45.0,
            stock_by_warehouse: stock,
            min_stock: 10,
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
            created_by: "admin".into(),
            updated_at: None,
            updated_by: None,
        };
        assert_eq!(part.total_stock(), 7);
        assert!(part.is_low_on_stock());
    }
}
