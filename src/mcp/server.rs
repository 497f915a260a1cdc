use crate::app::App;
use crate::config::ServerConfig;
use crate::constants::server;
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::aliases::canonical_tool_name;
use crate::mcp::catalog::{list_tools, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::mcp::resources::{list_resources, read_resource};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

#[derive(Clone)]
pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    pub fn from_config(config: ServerConfig) -> Result<Self, ToolError> {
        Ok(Self::new(App::initialize(config)?))
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": server::PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "listChanged": false },
            },
            "serverInfo": { "name": server::NAME, "version": server::VERSION },
        })
    }

    fn handle_tools_list(&self) -> Value {
        json!({ "tools": list_tools() })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            return Err(McpError::invalid_params("Missing tool name"));
        }
        let args = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args) => args.clone(),
        };

        let canonical = canonical_tool_name(name);
        validate_tool_args(canonical, &args)?;

        let outcome = self
            .app
            .tool_executor
            .execute(name, args)
            .await
            .map_err(|err| err.to_mcp_error(canonical))?;
        Ok(outcome.into_call_result())
    }

    fn handle_resources_read(&self, params: &Value) -> Result<Value, McpError> {
        let uri = params.get("uri").and_then(Value::as_str).unwrap_or("");
        if uri.is_empty() {
            return Err(McpError::invalid_params("Missing resource uri"));
        }
        read_resource(uri)
    }

    /// Routes one decoded message. Returns `None` for notifications.
    pub async fn handle_message(&self, message: Value) -> Option<JsonRpcResponse> {
        let fallback_id = message.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(req) => req,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    fallback_id,
                    ErrorCode::InvalidRequest.as_i32(),
                    "Invalid request".to_string(),
                ))
            }
        };

        let Some(id) = request.id.clone().filter(|id| !id.is_null()) else {
            self.app.logger.debug(
                "notification",
                Some(&json!({ "method": request.method })),
            );
            return None;
        };

        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(json!({})),
            method if method.starts_with("notifications/") => Ok(json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            "resources/list" => Ok(list_resources()),
            "resources/read" => self.handle_resources_read(&request.params),
            _ => Err(McpError::new(ErrorCode::MethodNotFound, "Method not found")),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => JsonRpcResponse::failure(id, err.code.as_i32(), err.message),
        })
    }

    /// Decodes one raw JSON-RPC text and routes it.
    pub async fn handle_text(&self, raw: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(message) => self.handle_message(message).await,
            Err(_) => Some(JsonRpcResponse::failure(
                Value::Null,
                ErrorCode::ParseError.as_i32(),
                "Parse error".to_string(),
            )),
        }
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        self.app.logger.info("stdio transport ready", None);
        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_text(trimmed).await {
                write_line(&mut writer, &response).await?;
            }
        }
        self.app.logger.info("stdin closed, shutting down", None);
        Ok(())
    }
}

async fn write_line<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<(), ToolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_string(response)
        .map_err(|err| ToolError::internal(format!("response encoding failed: {}", err)))?;
    writer.write_all(payload.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub async fn run_stdio(config: ServerConfig) -> Result<(), ToolError> {
    let server = McpServer::from_config(config)?;
    server.run_stdio().await
}
