use crate::constants::tokens::CANDIDATE_FIELDS;
use serde_json::Value;
use std::sync::Arc;

/// Pure function from a login response payload to an optional token.
pub type TokenExtractor = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Reads a single top-level field, case-sensitively.
pub fn field_extractor(field: impl Into<String>) -> TokenExtractor {
    let field = field.into();
    Arc::new(move |payload: &Value| payload.get(&field).and_then(truthy_token))
}

/// `token`, then `accessToken`, then `access_token`.
pub fn default_token_extractors() -> Vec<TokenExtractor> {
    CANDIDATE_FIELDS
        .iter()
        .map(|field| field_extractor(*field))
        .collect()
}

/// Runs the extractors in order; the first hit wins.
pub fn extract_token(payload: &Value, extractors: &[TokenExtractor]) -> Option<String> {
    extractors.iter().find_map(|extract| extract(payload))
}

/// Only non-empty strings and non-zero numbers count as a token. Other truthy
/// JSON (`true`, objects, arrays) is skipped, so `{"token": true,
/// "accessToken": "abc"}` yields `"abc"` rather than stopping at `token`.
fn truthy_token(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(num) if num.as_f64().map(|n| n != 0.0).unwrap_or(true) => {
            Some(num.to_string())
        }
        _ => None,
    }
}
