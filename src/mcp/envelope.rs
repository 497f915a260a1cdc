use crate::errors::ApiError;
use crate::services::api_client::ApiResponse;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// What a handler hands back to the transport: the structured envelope, a
/// one-line summary, and informational metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub structured: Value,
    pub summary: String,
    pub meta: Value,
}

impl ToolOutcome {
    pub fn new(structured: Value, summary: impl Into<String>) -> Self {
        Self {
            structured,
            summary: summary.into(),
            meta: json!({}),
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_success(&self) -> bool {
        self.structured
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// MCP `CallToolResult` shape.
    pub fn into_call_result(self) -> Value {
        json!({
            "structuredContent": self.structured,
            "content": [ { "type": "text", "text": self.summary } ],
            "_meta": self.meta,
        })
    }
}

pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn success_envelope(endpoint: &str, response: &ApiResponse) -> Value {
    json!({
        "success": true,
        "data": response.data,
        "status": response.status,
        "endpoint": endpoint,
        "timestamp": timestamp_now(),
    })
}

pub fn failure_envelope(endpoint: &str, error: &ApiError) -> Value {
    json!({
        "success": false,
        "error": error.to_string(),
        "endpoint": endpoint,
        "timestamp": timestamp_now(),
    })
}

pub fn failure_meta(error: &ApiError) -> Value {
    let mut meta = json!({
        "errorDetails": format!("{:?}", error),
        "errorKind": error.kind(),
    });
    if let Some(status) = error.status() {
        meta["status"] = json!(status);
    }
    meta
}
