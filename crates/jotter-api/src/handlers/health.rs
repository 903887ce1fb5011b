//! Liveness endpoints.

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe.
///
/// # Returns
/// - 200 OK with `{status, version}`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Connectivity check used by the web client.
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
