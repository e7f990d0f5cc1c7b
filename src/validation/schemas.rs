//! Validation schemas for the entity create payloads.

use chrono::{Datelike, Utc};

use super::{patterns, Rule, Schema};

pub fn warehouse() -> Schema {
    Schema::new()
        .field("name", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)])
        .field("address", vec![Rule::Required, Rule::MinLength(5), Rule::MaxLength(200)])
        .field("city", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(50)])
        .field("phone", vec![Rule::Pattern(patterns::PHONE.clone())])
        .field("manager", vec![Rule::MaxLength(100)])
}

pub fn machinery() -> Schema {
    Schema::new()
        .field("name", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)])
        .field("category", vec![Rule::Required])
        .field("brand", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(50)])
        .field("model", vec![Rule::Required, Rule::MinLength(1), Rule::MaxLength(50)])
        .field(
            "serial_number",
            vec![Rule::Required, Rule::Pattern(patterns::SERIAL_NUMBER.clone())],
        )
        .field(
            "year",
            vec![Rule::Required, Rule::Min(1900.0), Rule::Max(max_model_year())],
        )
        .field("hourmeter", vec![Rule::Min(0.0)])
        .field("warehouse_id", vec![Rule::Required])
        .field("purchase_price", vec![Rule::Min(0.0)])
        .field("current_value", vec![Rule::Min(0.0)])
}

pub fn vehicle() -> Schema {
    Schema::new()
        .field("plate", vec![Rule::Required, Rule::Pattern(patterns::PLATE.clone())])
        .field("brand", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(50)])
        .field("model", vec![Rule::Required, Rule::MinLength(1), Rule::MaxLength(50)])
        .field(
            "year",
            vec![Rule::Required, Rule::Min(1900.0), Rule::Max(max_model_year())],
        )
        .field("mileage", vec![Rule::Min(0.0)])
        .field("warehouse_id", vec![Rule::Required])
        .field("soat_expiration", vec![Rule::Required])
        .field("technical_review_expiration", vec![Rule::Required])
}

pub fn tool() -> Schema {
    Schema::new()
        .field("name", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)])
        .field(
            "internal_code",
            vec![Rule::Required, Rule::Pattern(patterns::CODE.clone())],
        )
        .field("warehouse_id", vec![Rule::Required])
        .field("category", vec![Rule::MaxLength(50)])
        .field("brand", vec![Rule::MaxLength(50)])
        .field("model", vec![Rule::MaxLength(50)])
}

pub fn spare_part() -> Schema {
    Schema::new()
        .field("code", vec![Rule::Required, Rule::Pattern(patterns::CODE.clone())])
        .field("name", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)])
        .field("brand", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(50)])
        .field("unit_price", vec![Rule::Required, Rule::Min(0.0)])
        .field("min_stock", vec![Rule::Required, Rule::Min(0.0)])
}

pub fn rental() -> Schema {
    Schema::new()
        .field("client_name", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)])
        .field("client_contact", vec![Rule::Required])
        .field("entity_name", vec![Rule::Required])
        .field("start_date", vec![Rule::Required])
        .field("end_date", vec![Rule::Required])
        .field("daily_rate", vec![Rule::Required, Rule::Min(0.01)])
        .field("total_amount", vec![Rule::Required, Rule::Min(0.0)])
}

pub fn fuel() -> Schema {
    Schema::new()
        .field("entity_id", vec![Rule::Required])
        .field("date", vec![Rule::Required])
        .field("liters", vec![Rule::Required, Rule::Min(0.1)])
        .field("unit_cost", vec![Rule::Required, Rule::Min(0.01)])
        .field(
            "location",
            vec![Rule::Required, Rule::MinLength(3), Rule::MaxLength(100)],
        )
}

pub fn maintenance() -> Schema {
    Schema::new()
        .field("entity_id", vec![Rule::Required])
        .field("entity_name", vec![Rule::Required])
        .field(
            "description",
            vec![Rule::Required, Rule::MinLength(3), Rule::MaxLength(500)],
        )
        .field("technician_name", vec![Rule::Required, Rule::MinLength(2)])
        .field("scheduled_date", vec![Rule::Required])
        .field("labor_hours", vec![Rule::Min(0.0)])
        .field("labor_cost", vec![Rule::Min(0.0)])
        .field("warehouse_id", vec![Rule::Required])
}

pub fn financial() -> Schema {
    Schema::new()
        .field("category", vec![Rule::Required])
        .field(
            "description",
            vec![Rule::Required, Rule::MinLength(3), Rule::MaxLength(200)],
        )
        .field("amount", vec![Rule::Required, Rule::Min(0.01)])
        .field("date", vec![Rule::Required])
}

pub fn user() -> Schema {
    Schema::new()
        .field("name", vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)])
        .field("email", vec![Rule::Required, Rule::Pattern(patterns::EMAIL.clone())])
        .field("role", vec![Rule::Required])
}

/// Newest accepted model year: next calendar year.
fn max_model_year() -> f64 {
    (Utc::now().year() + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    #[test]
    fn machinery_schema_accepts_a_valid_payload() {
        let mut data = Map::new();
        data.insert("name".into(), json!("Excavadora CAT 320"));
        data.insert("category".into(), json!("excavadora"));
        data.insert("brand".into(), json!("Caterpillar"));
        data.insert("model".into(), json!("320"));
        data.insert("serial_number".into(), json!("CAT320X99"));
        data.insert("year".into(), json!(2022));
        data.insert("warehouse_id".into(), json!("1"));

        assert!(machinery().validate(&data).is_empty());
    }

    #[test]
    fn user_schema_rejects_bad_email() {
        let mut data = Map::new();
        data.insert("name".into(), json!("Ana"));
        data.insert("email".into(), json!("not-an-email"));
        data.insert("role".into(), json!("admin"));

        let errors = user().validate(&data);
        assert_eq!(errors.get("email").map(String::as_str), Some("Formato inválido"));
    }

    #[test]
    fn vehicle_schema_requires_document_dates() {
        let mut data = Map::new();
        data.insert("plate".into(), json!("ABC-123"));
        data.insert("brand".into(), json!("Toyota"));
        data.insert("model".into(), json!("Hilux"));
        data.insert("year".into(), json!(2022));
        data.insert("warehouse_id".into(), json!("1"));
        data.insert("soat_expiration".into(), Value::Null);

        let errors = vehicle().validate(&data);
        assert!(errors.contains_key("soat_expiration"));
        assert!(errors.contains_key("technical_review_expiration"));
    }
}
