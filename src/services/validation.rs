use crate::errors::ToolError;
use serde_json::{Map, Value};

/// Semantic argument checks that run after schema validation.
#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(
        &self,
        value: Option<&Value>,
        label: &str,
        trim: bool,
    ) -> Result<String, ToolError> {
        let text = value.and_then(Value::as_str).ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        let normalized = text.trim();
        if normalized.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(if trim {
            normalized.to_string()
        } else {
            text.to_string()
        })
    }

    pub fn ensure_object(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Map<String, Value>, ToolError> {
        value
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ToolError::invalid_params(format!("{} must be an object", label)))
    }

    pub fn ensure_optional_object(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<Map<String, Value>>, ToolError> {
        match value {
            None => Ok(None),
            Some(val) if val.is_null() => Ok(None),
            Some(val) => self.ensure_object(Some(val), label).map(Some),
        }
    }
}
