//! Schema-driven field validation.
//!
//! A [`Schema`] maps field names to lists of [`Rule`]s; the interpreter runs
//! them over `serde_json::Value` field values and produces per-field Spanish
//! error messages. The first failing rule for a field wins. Empty values
//! (null, missing, whitespace-only strings) only ever fail `Required`;
//! every other rule is skipped for them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub mod schemas;

/// Predicate for [`Rule::Custom`]: returns `Some(message)` to fail.
pub type CustomRule = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// A single declarative validation rule.
#[derive(Clone)]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Min(f64),
    Max(f64),
    Custom(CustomRule),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "Required"),
            Rule::MinLength(n) => write!(f, "MinLength({n})"),
            Rule::MaxLength(n) => write!(f, "MaxLength({n})"),
            Rule::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Rule::Min(x) => write!(f, "Min({x})"),
            Rule::Max(x) => write!(f, "Max({x})"),
            Rule::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Field name -> first error message.
pub type FieldErrors = BTreeMap<String, String>;

/// Declarative per-field rule sets.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<String, Vec<Rule>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field registration.
    pub fn field(mut self, name: &str, rules: Vec<Rule>) -> Self {
        self.fields.insert(name.to_string(), rules);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Validates one field value against its rules. `None` means valid; a
    /// field unknown to the schema is always valid.
    pub fn validate_field(&self, name: &str, value: &Value) -> Option<String> {
        let rules = self.fields.get(name)?;
        check_rules(rules, value)
    }

    /// Validates every schema field against `data`, returning the error map.
    /// Fields absent from `data` are treated as null.
    pub fn validate(&self, data: &Map<String, Value>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (name, rules) in &self.fields {
            let value = data.get(name).unwrap_or(&Value::Null);
            if let Some(message) = check_rules(rules, value) {
                errors.insert(name.clone(), message);
            }
        }
        errors
    }
}

/// Null or a whitespace-only string.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_rules(rules: &[Rule], value: &Value) -> Option<String> {
    if is_empty(value) {
        if rules.iter().any(|r| matches!(r, Rule::Required)) {
            return Some("Este campo es obligatorio".to_string());
        }
        return None;
    }

    for rule in rules {
        let failure = match rule {
            Rule::Required => None,
            Rule::MinLength(min) => value.as_str().and_then(|s| {
                (s.chars().count() < *min)
                    .then(|| format!("Debe tener al menos {min} caracteres"))
            }),
            Rule::MaxLength(max) => value.as_str().and_then(|s| {
                (s.chars().count() > *max)
                    .then(|| format!("No puede tener más de {max} caracteres"))
            }),
            Rule::Pattern(re) => value
                .as_str()
                .and_then(|s| (!re.is_match(s)).then(|| "Formato inválido".to_string())),
            Rule::Min(min) => value.as_f64().and_then(|n| {
                (n < *min).then(|| format!("Debe ser mayor o igual a {}", fmt_bound(*min)))
            }),
            Rule::Max(max) => value.as_f64().and_then(|n| {
                (n > *max).then(|| format!("Debe ser menor o igual a {}", fmt_bound(*max)))
            }),
            Rule::Custom(predicate) => predicate(value),
        };
        if failure.is_some() {
            return failure;
        }
    }
    None
}

/// Numeric bounds print without a trailing ".0" when integral.
fn fmt_bound(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

/// Shared validation patterns.
pub mod patterns {
    use super::*;

    pub static EMAIL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
    pub static PHONE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("valid regex"));
    pub static PLATE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Z]{3}-\d{3}$").expect("valid regex"));
    pub static SERIAL_NUMBER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Z0-9]{6,20}$").expect("valid regex"));
    pub static CODE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Z0-9\-]{3,20}$").expect("valid regex"));
    pub static CURRENCY: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("valid regex"));
    pub static PERCENTAGE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(100|[1-9]?\d)(\.\d{1,2})?$").expect("valid regex"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn required_rejects_null_empty_and_whitespace() {
        let schema = Schema::new().field("name", vec![Rule::Required]);

        for value in [Value::Null, json!(""), json!("   ")] {
            let errors = schema.validate(&data(&[("name", value)]));
            assert_eq!(
                errors.get("name").map(String::as_str),
                Some("Este campo es obligatorio")
            );
        }

        let errors = schema.validate(&data(&[("name", json!("Grúa"))]));
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_field_counts_as_null() {
        let schema = Schema::new().field("name", vec![Rule::Required]);
        let errors = schema.validate(&Map::new());
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn optional_empty_value_skips_other_rules() {
        let schema = Schema::new().field("phone", vec![Rule::Pattern(patterns::PHONE.clone())]);
        let errors = schema.validate(&data(&[("phone", json!(""))]));
        assert!(errors.is_empty());
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let schema = Schema::new().field("year", vec![Rule::Min(1900.0), Rule::Max(2027.0)]);

        for ok in [1900, 1990, 2027] {
            assert!(
                schema.validate(&data(&[("year", json!(ok))])).is_empty(),
                "{ok} should pass"
            );
        }
        assert_eq!(
            schema
                .validate(&data(&[("year", json!(1899))]))
                .get("year")
                .map(String::as_str),
            Some("Debe ser mayor o igual a 1900")
        );
        assert_eq!(
            schema
                .validate(&data(&[("year", json!(2028))]))
                .get("year")
                .map(String::as_str),
            Some("Debe ser menor o igual a 2027")
        );
    }

    #[test]
    fn length_rules_count_characters() {
        let schema = Schema::new().field(
            "name",
            vec![Rule::MinLength(2), Rule::MaxLength(5)],
        );
        assert!(schema
            .validate(&data(&[("name", json!("ñú"))]))
            .is_empty());
        assert!(schema
            .validate(&data(&[("name", json!("x"))]))
            .contains_key("name"));
        assert!(schema
            .validate(&data(&[("name", json!("abcdef"))]))
            .contains_key("name"));
    }

    #[test]
    fn pattern_rule_reports_invalid_format() {
        let schema = Schema::new().field("plate", vec![Rule::Pattern(patterns::PLATE.clone())]);
        assert!(schema
            .validate(&data(&[("plate", json!("ABC-123"))]))
            .is_empty());
        assert_eq!(
            schema
                .validate(&data(&[("plate", json!("AB-1234"))]))
                .get("plate")
                .map(String::as_str),
            Some("Formato inválido")
        );
    }

    #[test]
    fn custom_rule_runs_last() {
        let schema = Schema::new().field(
            "amount",
            vec![
                Rule::Min(0.0),
                Rule::Custom(Arc::new(|v| {
                    (v.as_f64() == Some(13.0)).then(|| "Monto no permitido".to_string())
                })),
            ],
        );
        assert!(schema.validate(&data(&[("amount", json!(12))])).is_empty());
        assert_eq!(
            schema
                .validate(&data(&[("amount", json!(13))]))
                .get("amount")
                .map(String::as_str),
            Some("Monto no permitido")
        );
    }

    #[test]
    fn first_failing_rule_wins() {
        let schema = Schema::new().field(
            "code",
            vec![
                Rule::MinLength(3),
                Rule::Pattern(patterns::CODE.clone()),
            ],
        );
        // Fails both; MinLength is reported.
        assert_eq!(
            schema
                .validate(&data(&[("code", json!("a"))]))
                .get("code")
                .map(String::as_str),
            Some("Debe tener al menos 3 caracteres")
        );
    }
}
