use crate::errors::McpError;
use crate::utils::suggest::suggest;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(rename = "_meta", default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

// An unreadable catalog leaves this empty; App::initialize then refuses to
// start because no handler has a definition.
static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).unwrap_or_default()
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static [ToolDef] {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

pub fn list_tools() -> Vec<ToolDef> {
    TOOL_CATALOG.to_vec()
}

pub fn has_validator(name: &str) -> bool {
    TOOL_VALIDATORS.contains_key(name)
}

/// Checks `args` against the tool's input schema. Tools without a catalog
/// entry pass through; the dispatcher reports them as unknown.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let (Some(tool), Some(schema)) = (tool_by_name(tool_name), TOOL_VALIDATORS.get(tool_name))
    else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        let message = format_schema_errors(tool_name, &tool.input_schema, errors);
        return Err(McpError::invalid_params(message));
    }
    Ok(())
}

fn format_schema_errors(
    tool_name: &str,
    schema: &Value,
    errors: jsonschema::ErrorIterator,
) -> String {
    let known_fields: Vec<String> = schema
        .get("properties")
        .and_then(|v| v.as_object())
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();

    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();
    for err in errors.take(10) {
        let path = err.instance_path.to_string();
        let at = if path.is_empty() { "(root)" } else { path.as_str() };
        match &err.kind {
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                for field in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", at, field));
                    let close = suggest(field, known_fields.as_slice(), 2);
                    if !close.is_empty() {
                        did_you_means.push(format!("'{}' -> {}", field, close.join(", ")));
                    }
                }
            }
            ValidationErrorKind::Required { property } => {
                let name = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!("{}: missing required field '{}'", at, name));
            }
            ValidationErrorKind::Type { kind } => {
                rendered.push(format!("{}: expected {}", at, format_type_kind(kind)));
            }
            _ => rendered.push(format!("{}: {}", at, err)),
        }
    }

    let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
    lines.extend(rendered.into_iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!("Did you mean: {}", did_you_means.join(" | ")));
    }
    if !known_fields.is_empty() {
        lines.push(format!("Accepted fields: {}", known_fields.join(", ")));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(primitive) => primitive.to_string(),
        TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}
