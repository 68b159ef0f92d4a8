use axum::{extract::State, response::IntoResponse, routing::get, routing::post, Json, Router};
use tracing::info;

use super::AppState;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/connect", post(connect_handler))
        .route("/api/status", get(status_handler))
}

/// Manual reconnect from the dashboard button.
async fn connect_handler(State((dashboard, _config)): State<AppState>) -> impl IntoResponse {
    // ---
    info!("POST /api/connect - reconnecting");
    let status = dashboard.reconnect().await;
    info!(
        "POST /api/connect - connected={} source={}",
        status.connected, status.source
    );
    Json(status)
}

async fn status_handler(State((dashboard, _config)): State<AppState>) -> impl IntoResponse {
    Json(dashboard.status().await)
}
