//! Streamable-HTTP style transport: `POST /mcp` carries one JSON-RPC message,
//! `GET /health` answers liveness probes.

use crate::constants::server;
use crate::errors::HttpTransportError;
use crate::mcp::server::McpServer;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub fn build_router(server: McpServer) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(server)
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": server::NAME,
        "version": server::VERSION,
    }))
}

async fn handle_mcp(State(server): State<McpServer>, body: String) -> Response {
    let Some(reply) = server.handle_text(&body).await else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match serde_json::to_string(&reply) {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            text,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32603, "message": err.to_string() },
            })),
        )
            .into_response(),
    }
}

pub async fn serve(server: McpServer, port: u16) -> Result<(), HttpTransportError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| HttpTransportError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    server.app().logger.info(
        "http transport ready",
        Some(&json!({ "addr": addr.to_string(), "endpoint": "/mcp" })),
    );

    axum::serve(listener, build_router(server))
        .await
        .map_err(|err| HttpTransportError::Serve(err.to_string()))
}
