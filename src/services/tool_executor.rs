use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{ToolError, ToolErrorKind};
use crate::mcp::envelope::ToolOutcome;
use crate::services::logger::Logger;
use crate::utils::redact::redact_object;

/// One tool's behavior. Remote API failures come back as a failure-shaped
/// `ToolOutcome`; `Err` is reserved for calls that never reached the API.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<ToolOutcome, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
    alias_map: HashMap<String, String>,
}

impl ToolExecutor {
    pub fn new(
        logger: Logger,
        handlers: HashMap<String, Arc<dyn ToolHandler>>,
        alias_map: HashMap<String, String>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
            alias_map,
        }
    }

    pub fn resolve_tool<'a>(&'a self, tool: &'a str) -> &'a str {
        if self.handlers.contains_key(tool) {
            return tool;
        }
        self.alias_map
            .get(tool)
            .map(String::as_str)
            .unwrap_or(tool)
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<ToolOutcome, ToolError> {
        let canonical = self.resolve_tool(tool).to_string();
        let handler = self.handlers.get(&canonical).cloned().ok_or_else(|| {
            ToolError::not_found(format!("Unknown tool: {}", tool))
                .with_hint(format!("Use one of: {}.", self.tool_names().join(", ")))
        })?;

        let request_id = uuid::Uuid::new_v4().to_string();
        self.logger.info(
            "tool call",
            Some(&serde_json::json!({
                "request_id": request_id,
                "tool": canonical,
                "invoked_as": if canonical != tool { Some(tool) } else { None },
                "args": redact_object(&args),
            })),
        );

        let started = Instant::now();
        let result = handler.handle(args).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(outcome) => self.logger.info(
                "tool call finished",
                Some(&serde_json::json!({
                    "request_id": request_id,
                    "tool": canonical,
                    "success": outcome.is_success(),
                    "duration_ms": duration_ms,
                })),
            ),
            Err(err) => {
                let meta = serde_json::json!({
                    "request_id": request_id,
                    "tool": canonical,
                    "error": err,
                    "duration_ms": duration_ms,
                });
                if err.kind == ToolErrorKind::Internal {
                    self.logger.error("tool call failed", Some(&meta));
                } else {
                    self.logger.warn("tool call rejected", Some(&meta));
                }
            }
        }
        result
    }
}
