// src/routes/health.rs
//! API health check endpoint for the telemetry dashboard.
//!
//! This module defines the `/health` route used by container orchestrators
//! (e.g., Docker, Kubernetes) and CI pipelines to verify that the service is
//! running and able to respond to HTTP requests. It is a sibling module in the
//! `routes` directory and follows the Explicit Module Boundary Pattern (EMBP):
//! - Internal to this file: endpoint handler(s) and related types
//! - Exports to the gateway (`mod.rs`): a subrouter containing the `/health` route
//!
//! The service stays healthy while the telemetry source is down; that state is
//! reported, not failed on.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    telemetry: &'static str,
}

/// Handle `GET /health`.
///
/// Reads the cached connection state only. No query is sent to the telemetry
/// source, so this stays cheap enough for frequent liveness checks.
async fn health(State((dashboard, _)): State<AppState>) -> Json<HealthResponse> {
    // ---
    let telemetry = if dashboard.status().await.connected {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: "ok",
        telemetry,
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
