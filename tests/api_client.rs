use api_bridge::config::ApiConfig;
use api_bridge::errors::ApiError;
use api_bridge::services::api_client::{ApiClient, ApiRequest, ApiVerb};
use api_bridge::services::logger::Logger;
use mockito::Matcher;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

fn client_with(config: ApiConfig) -> ApiClient {
    ApiClient::new(Logger::new("test"), config).expect("client")
}

fn client_for(base: &str) -> ApiClient {
    client_with(ApiConfig::new(base).expect("config"))
}

/// Accepts connections and never answers. Returns the listener's base URL.
async fn silent_peer() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn get_returns_json_payload_and_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/widgets/7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("x-request-id", "r-1")
        .with_body(r#"{"id":7}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let response = client.get("/widgets/7", None).await.expect("response");

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"id": 7}));
    assert_eq!(response.headers.get("x-request-id").map(String::as_str), Some("r-1"));
    mock.assert_async().await;
}

#[tokio::test]
async fn query_params_skip_nulls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/items")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("q".into(), "blue box".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let params = json!({"page": 2, "q": "blue box", "cursor": null});
    let response = client
        .get("/items", params.as_object().cloned())
        .await
        .expect("response");
    assert_eq!(response.data, json!([]));
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_becomes_http_status_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("DELETE", "/widgets/7")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"gone"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.delete("/widgets/7").await.expect_err("404");
    match &err {
        ApiError::HttpStatus {
            status,
            status_text,
            body,
        } => {
            assert_eq!(*status, 404);
            assert_eq!(status_text, "Not Found");
            assert_eq!(body, &json!({"message": "gone"}));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().starts_with("API Error: 404 Not Found - "));
    assert!(err.to_string().contains("gone"));
}

#[tokio::test]
async fn bearer_header_follows_auth_state() {
    let mut server = mockito::Server::new_async().await;
    let with_token = server
        .mock("GET", "/me")
        .match_header("authorization", "Bearer abc")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let client = client_for(&server.url());
    client.set_auth_token(Some("abc".to_string()));
    client.get("/me", None).await.expect("authorized call");
    with_token.assert_async().await;

    let without_token = server
        .mock("GET", "/public")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;
    client.set_auth_token(None);
    client.get("/public", None).await.expect("anonymous call");
    without_token.assert_async().await;
}

#[tokio::test]
async fn static_key_and_defaults_are_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/orders")
        .match_header("api-key", "k-123")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"sku": "A1", "qty": 2})))
        .with_status(201)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{"id":"o-1"}"#)
        .create_async()
        .await;

    let config = ApiConfig::new(&server.url())
        .expect("config")
        .with_api_key("k-123");
    let client = client_with(config);
    let response = client
        .post("/orders", Some(json!({"sku": "A1", "qty": 2})))
        .await
        .expect("created");
    assert_eq!(response.status, 201);
    assert_eq!(response.data["id"], "o-1");
    mock.assert_async().await;
}

#[tokio::test]
async fn per_call_headers_override_authorization() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PATCH", "/orders/1")
        .match_header("authorization", "Basic override")
        .with_status(204)
        .create_async()
        .await;

    let config = ApiConfig::new(&server.url())
        .expect("config")
        .with_auth_token("stored");
    let client = client_with(config);
    let request = ApiRequest::new(ApiVerb::Patch, "/orders/1")
        .with_body(Some(json!({"qty": 3})))
        .with_header("Authorization", "Basic override");
    let response = client.execute(request).await.expect("patched");
    assert_eq!(response.status, 204);
    mock.assert_async().await;
}

#[tokio::test]
async fn text_content_type_yields_text_payload() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("PUT", "/notes/1")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("saved")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let response = client
        .put("/notes/1", Some(json!({"text": "hi"})))
        .await
        .expect("response");
    assert_eq!(response.data, Value::String("saved".to_string()));
}

#[tokio::test]
async fn silent_server_times_out_within_bound() {
    let base = silent_peer().await;
    let config = ApiConfig::new(&base)
        .expect("config")
        .with_timeout(Duration::from_millis(200));
    let client = client_with(config);

    let started = Instant::now();
    let err = client.get("/slow", None).await.expect_err("timeout");
    let elapsed = started.elapsed();

    assert!(matches!(err, ApiError::Timeout { timeout_ms: 200 }));
    assert_eq!(err.to_string(), "Request timeout after 200ms");
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
}

#[tokio::test]
async fn timed_out_call_does_not_disturb_a_concurrent_one() {
    let silent = silent_peer().await;
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/fast")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"fast":true}"#)
        .create_async()
        .await;

    let config = ApiConfig::new(&server.url())
        .expect("config")
        .with_timeout(Duration::from_millis(300));
    let client = client_with(config);

    let slow_url = format!("{}/slow", silent);
    let (slow, fast) = tokio::join!(client.get(&slow_url, None), client.get("/fast", None));
    assert!(matches!(slow, Err(ApiError::Timeout { .. })));
    assert_eq!(fast.expect("fast call").data, json!({"fast": true}));
}

#[tokio::test]
async fn connection_refused_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = client_for(&format!("http://{}", addr));
    let err = client.get("/x", None).await.expect_err("refused");
    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
}
