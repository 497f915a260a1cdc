mod common;
use common::{call_tool, server_for, ENV_LOCK};

use api_bridge::config::ServerConfig;
use api_bridge::mcp::http::build_router;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE: &str = "http://127.0.0.1:9";

async fn rpc(method: &str, params: Value) -> Value {
    let server = server_for(BASE, &[]);
    let reply = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 42, "method": method, "params": params}))
        .await
        .expect("reply");
    serde_json::to_value(reply).expect("json")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn tools_list_exposes_every_canonical_tool() {
    let reply = rpc("tools/list", json!({})).await;
    assert_eq!(reply["id"], 42);
    let tools = reply["result"]["tools"].as_array().expect("tools");
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    for expected in [
        "api_auth",
        "api_get",
        "api_post",
        "api_put",
        "api_patch",
        "api_delete",
        "api_logout",
        "get_info",
    ] {
        assert!(names.contains(&expected), "{} missing from tools/list", expected);
    }
    let get = tools
        .iter()
        .find(|t| t["name"] == "api_get")
        .expect("api_get");
    assert_eq!(get["inputSchema"]["required"], json!(["endpoint"]));
    assert_eq!(get["_meta"]["openai/outputTemplate"], "ui://widget/api-result.html");
    assert_eq!(get["title"], "Get Data from API");
}

#[tokio::test]
async fn unknown_tool_is_invalid_params_with_hint() {
    let server = server_for(BASE, &[]);
    let reply = call_tool(&server, "api_frobnicate", json!({})).await;
    assert_eq!(reply["error"]["code"], -32602);
    let message = reply["error"]["message"].as_str().unwrap_or_default();
    assert!(message.contains("Unknown tool: api_frobnicate"));
    assert!(message.contains("api_get"));
}

#[tokio::test]
async fn schema_violation_names_the_field() {
    let server = server_for(BASE, &[]);
    let reply = call_tool(&server, "api_post", json!({"endpoint": "/x"})).await;
    assert_eq!(reply["error"]["code"], -32602);
    assert!(reply["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("missing required field 'data'")));

    let reply = call_tool(&server, "get", json!({"endpoint": "/x", "parms": {}})).await;
    let message = reply["error"]["message"].as_str().unwrap_or_default();
    assert!(message.contains("unknown field 'parms'"));
    assert!(message.contains("params"));
}

#[tokio::test]
async fn widget_resource_is_listed_and_readable() {
    let listed = rpc("resources/list", json!({})).await;
    assert_eq!(
        listed["result"]["resources"][0]["uri"],
        "ui://widget/api-result.html"
    );

    let read = rpc("resources/read", json!({"uri": "ui://widget/api-result.html"})).await;
    let content = &read["result"]["contents"][0];
    assert_eq!(content["mimeType"], "text/html+skybridge");
    assert!(content["text"].as_str().is_some_and(|t| t.contains("<html")));

    let missing = rpc("resources/read", json!({"uri": "ui://widget/nope.html"})).await;
    assert_eq!(missing["error"]["code"], -32602);
}

#[tokio::test]
async fn ping_and_initialize() {
    assert_eq!(rpc("ping", json!({})).await["result"], json!({}));
    let init = rpc("initialize", json!({"protocolVersion": "2025-06-18"})).await;
    assert_eq!(init["result"]["serverInfo"]["name"], "api-bridge");
    assert!(init["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn config_reads_process_environment() {
    let _guard = ENV_LOCK.lock().await;
    let keys = ["API_BASE_URL", "API_TIMEOUT", "API_KEY", "AUTH_TOKEN", "PORT"];
    let previous: Vec<(&str, Option<String>)> =
        keys.iter().map(|k| (*k, std::env::var(k).ok())).collect();

    for key in keys {
        std::env::remove_var(key);
    }
    std::env::set_var("API_BASE_URL", "https://env.test/api/");
    std::env::set_var("API_TIMEOUT", "1234");
    let config = ServerConfig::from_env();

    for (key, value) in previous {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    let config = config.expect("config");
    assert_eq!(config.api.base_url.as_str(), "https://env.test/api/");
    assert_eq!(config.api.timeout_ms(), 1234);
    assert!(!config.api_key_configured);
}

#[tokio::test]
async fn http_health_endpoint() {
    let router = build_router(server_for(BASE, &[]));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn http_post_routes_json_rpc() {
    let router = build_router(server_for(BASE, &[]));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}).to_string(),
        ))
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], "a");
    assert!(body["result"]["tools"].as_array().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn http_parse_error_and_notification() {
    let router = build_router(server_for(BASE, &[]));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .body(Body::from("not json"))
        .expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .body(Body::from(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        ))
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn http_cors_preflight_is_allowed() {
    let router = build_router(server_for(BASE, &[]));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/mcp")
        .header(header::ORIGIN, "https://chat.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
