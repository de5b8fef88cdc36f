//! Minimal HTTP gateway: health check and webhook intake.

use std::net::SocketAddr;

use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

/// Default bind address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Build the gateway router.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .fallback(not_found)
}

/// Serve the gateway until the process exits.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("gateway listening on {}", addr);
    axum::serve(listener, router()).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "service": "bareclaw"}))
}

async fn webhook(_body: String) -> Json<Value> {
    Json(json!({"received": true}))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
