#![allow(dead_code)]

use api_bridge::app::App;
use api_bridge::config::ServerConfig;
use api_bridge::mcp::server::McpServer;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Configuration pointing at `base_url`, with `extra` standing in for the
/// rest of the process environment.
pub fn config_for(base_url: &str, extra: &[(&str, &str)]) -> ServerConfig {
    let mut env: HashMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    env.insert("API_BASE_URL".to_string(), base_url.to_string());
    ServerConfig::from_lookup(|key| env.get(key).cloned()).expect("config")
}

pub fn app_for(base_url: &str, extra: &[(&str, &str)]) -> App {
    App::initialize(config_for(base_url, extra)).expect("app")
}

pub fn server_for(base_url: &str, extra: &[(&str, &str)]) -> McpServer {
    McpServer::new(app_for(base_url, extra))
}

/// Sends `tools/call` and returns the whole JSON-RPC reply as a value.
pub async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> Value {
    let reply = server
        .handle_message(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments },
        }))
        .await
        .expect("tools/call must reply");
    serde_json::to_value(reply).expect("reply json")
}
