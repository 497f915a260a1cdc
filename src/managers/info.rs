use crate::config::ServerConfig;
use crate::constants::server;
use crate::errors::ToolError;
use crate::mcp::envelope::{timestamp_now, ToolOutcome};
use crate::services::api_client::ApiClient;
use crate::services::auth_state::AuthStatus;
use crate::services::tool_executor::ToolHandler;
use serde_json::{json, Value};
use std::sync::Arc;

/// `get_info`: server identity plus a presence-only view of the API setup.
pub struct InfoManager {
    client: Arc<ApiClient>,
    base_url_configured: bool,
    api_key_configured: bool,
    auth_token_from_env: bool,
}

impl InfoManager {
    pub fn new(client: Arc<ApiClient>, config: &ServerConfig) -> Self {
        Self {
            client,
            base_url_configured: config.base_url_configured,
            api_key_configured: config.api_key_configured,
            auth_token_from_env: config.auth_token_from_env,
        }
    }

    pub fn describe(&self) -> Value {
        let api = self.client.config();
        json!({
            "serverName": server::NAME,
            "version": server::VERSION,
            "status": "running",
            "features": server::FEATURES,
            "apiConfig": {
                "baseUrl": api.base_url.as_str(),
                "baseUrlConfigured": self.base_url_configured,
                "hasApiKey": self.api_key_configured,
                "hasAuthTokenFromEnv": self.auth_token_from_env,
                "hasAuthTokenInMemory": self.client.auth_status() == AuthStatus::Authenticated,
                "timeoutMs": api.timeout_ms(),
            },
            "timestamp": timestamp_now(),
        })
    }
}

#[async_trait::async_trait]
impl ToolHandler for InfoManager {
    async fn handle(&self, _args: Value) -> Result<ToolOutcome, ToolError> {
        let info = self.describe();
        let summary = format!(
            "{} v{} is running against {}",
            server::NAME,
            server::VERSION,
            info["apiConfig"]["baseUrl"].as_str().unwrap_or_default()
        );
        Ok(ToolOutcome::new(info, summary))
    }
}
