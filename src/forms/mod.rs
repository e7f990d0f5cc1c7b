//! Generic form state engine.
//!
//! Tracks a JSON data object against an optional validation [`Schema`],
//! deriving the dirty/error/submitting state machine: per-field validation
//! on change and/or blur, exhaustive validation on submit, and submission
//! gating. Submit-time failures from the caller's handler surface as a
//! single top-level `submit_error`; there is no retry policy.

use serde_json::{Map, Value};
use std::future::Future;

use crate::validation::{FieldErrors, Schema};

/// Fallback message when a submit handler fails without a usable message.
const GENERIC_SUBMIT_ERROR: &str = "Error al enviar el formulario";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOptions {
    pub validate_on_change: bool,
    pub validate_on_blur: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_on_change: true,
            validate_on_blur: true,
        }
    }
}

/// Result of a [`FormEngine::submit`] attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation passed and the handler succeeded.
    Submitted,
    /// Validation failed; the handler was not invoked.
    Blocked,
    /// Validation passed but the handler failed; see `submit_error`.
    Failed,
}

pub struct FormEngine {
    initial: Map<String, Value>,
    data: Map<String, Value>,
    schema: Option<Schema>,
    options: FormOptions,
    errors: FieldErrors,
    dirty: bool,
    submitting: bool,
    submit_error: Option<String>,
}

impl FormEngine {
    pub fn new(initial: Map<String, Value>, schema: Option<Schema>) -> Self {
        Self::with_options(initial, schema, FormOptions::default())
    }

    pub fn with_options(
        initial: Map<String, Value>,
        schema: Option<Schema>,
        options: FormOptions,
    ) -> Self {
        Self {
            data: initial.clone(),
            initial,
            schema,
            options,
            errors: FieldErrors::new(),
            dirty: false,
            submitting: false,
            submit_error: None,
        }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn value(&self, name: &str) -> &Value {
        self.data.get(name).unwrap_or(&Value::Null)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Sets a single field value. Marks the form dirty, clears any previous
    /// submit error and, when configured, revalidates the field.
    pub fn set_value(&mut self, name: &str, value: Value) {
        self.data.insert(name.to_string(), value);
        self.dirty = true;
        self.submit_error = None;

        if self.options.validate_on_change {
            self.validate_single_field(name);
        }
    }

    /// Bulk-merges values without per-field validation.
    pub fn set_values(&mut self, values: Map<String, Value>) {
        for (name, value) in values {
            self.data.insert(name, value);
        }
        self.dirty = true;
        self.submit_error = None;
    }

    /// Field lost focus; revalidates it when configured.
    pub fn blur(&mut self, name: &str) {
        if self.options.validate_on_blur {
            self.validate_single_field(name);
        }
    }

    /// Restores the initial data (or `new_data`) and clears every piece of
    /// derived state.
    pub fn reset(&mut self, new_data: Option<Map<String, Value>>) {
        if let Some(data) = new_data {
            self.initial = data;
        }
        self.data = self.initial.clone();
        self.dirty = false;
        self.submitting = false;
        self.submit_error = None;
        self.errors.clear();
    }

    /// Validates every schema field against the current data, replacing the
    /// error map. Returns whether the form is valid.
    pub fn validate_all(&mut self) -> bool {
        if let Some(schema) = &self.schema {
            self.errors = schema.validate(&self.data);
        }
        self.errors.is_empty()
    }

    /// Runs the full submit flow: exhaustive validation gates the handler;
    /// a handler error is captured as the single top-level submit error.
    pub async fn submit<F, Fut>(&mut self, handler: F) -> SubmitOutcome
    where
        F: FnOnce(Map<String, Value>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        self.submit_error = None;

        if !self.validate_all() {
            return SubmitOutcome::Blocked;
        }

        self.submitting = true;
        let result = handler(self.data.clone()).await;
        self.submitting = false;

        match result {
            Ok(()) => {
                self.dirty = false;
                SubmitOutcome::Submitted
            }
            Err(err) => {
                let message = err.to_string();
                self.submit_error = Some(if message.trim().is_empty() {
                    GENERIC_SUBMIT_ERROR.to_string()
                } else {
                    message
                });
                SubmitOutcome::Failed
            }
        }
    }

    fn validate_single_field(&mut self, name: &str) {
        let Some(schema) = &self.schema else { return };
        let value = self.data.get(name).unwrap_or(&Value::Null);
        match schema.validate_field(name, value) {
            Some(message) => {
                self.errors.insert(name.to_string(), message);
            }
            None => {
                self.errors.remove(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Rule, Schema};
    use serde_json::json;

    fn name_schema() -> Schema {
        Schema::new().field("name", vec![Rule::Required, Rule::MinLength(2)])
    }

    fn initial() -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("name".to_string(), json!(""));
        data
    }

    #[tokio::test]
    async fn submit_with_empty_required_field_blocks_handler() {
        let mut form = FormEngine::new(initial(), Some(name_schema()));
        form.set_value("name", json!("   "));

        let mut called = false;
        let outcome = form
            .submit(|_| {
                called = true;
                async { Ok(()) }
            })
            .await;

        assert_eq!(outcome, SubmitOutcome::Blocked);
        assert!(!called);
        assert_eq!(form.error("name"), Some("Este campo es obligatorio"));
        assert!(!form.is_valid());
    }

    #[tokio::test]
    async fn successful_submit_clears_dirty() {
        let mut form = FormEngine::new(initial(), Some(name_schema()));
        form.set_value("name", json!("Grúa Telescópica"));
        assert!(form.is_dirty());

        let outcome = form.submit(|_| async { Ok(()) }).await;

        assert_eq!(outcome, SubmitOutcome::Submitted);
        assert!(!form.is_dirty());
        assert!(form.submit_error().is_none());
    }

    #[tokio::test]
    async fn handler_failure_becomes_submit_error() {
        let mut form = FormEngine::new(initial(), Some(name_schema()));
        form.set_value("name", json!("Grúa"));

        let outcome = form
            .submit(|_| async { Err(anyhow::anyhow!("nombre duplicado")) })
            .await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(form.submit_error(), Some("nombre duplicado"));
        // Field errors are untouched by handler failures.
        assert!(form.errors().is_empty());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn set_value_clears_previous_submit_error() {
        let mut form = FormEngine::new(initial(), Some(name_schema()));
        form.set_value("name", json!("Grúa"));
        form.submit(|_| async { Err(anyhow::anyhow!("falló")) }).await;
        assert!(form.submit_error().is_some());

        form.set_value("name", json!("Grúa móvil"));
        assert!(form.submit_error().is_none());
    }

    #[test]
    fn change_validation_updates_field_errors_incrementally() {
        let mut form = FormEngine::new(initial(), Some(name_schema()));

        form.set_value("name", json!("x"));
        assert_eq!(form.error("name"), Some("Debe tener al menos 2 caracteres"));

        form.set_value("name", json!("xy"));
        assert!(form.is_valid());
    }

    #[test]
    fn change_validation_can_be_disabled() {
        let mut form = FormEngine::with_options(
            initial(),
            Some(name_schema()),
            FormOptions {
                validate_on_change: false,
                validate_on_blur: true,
            },
        );

        form.set_value("name", json!(""));
        assert!(form.is_valid());

        form.blur("name");
        assert_eq!(form.error("name"), Some("Este campo es obligatorio"));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut form = FormEngine::new(initial(), Some(name_schema()));
        form.set_value("name", json!("x"));
        assert!(form.is_dirty());
        assert!(!form.is_valid());

        form.reset(None);
        assert!(!form.is_dirty());
        assert!(form.is_valid());
        assert_eq!(form.value("name"), &json!(""));
    }

    #[tokio::test]
    async fn form_without_schema_always_submits() {
        let mut form = FormEngine::new(initial(), None);
        let outcome = form.submit(|_| async { Ok(()) }).await;
        assert_eq!(outcome, SubmitOutcome::Submitted);
    }
}
