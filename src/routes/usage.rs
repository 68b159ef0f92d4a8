use axum::{
    extract::Query, extract::State, response::IntoResponse, routing::get, Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::AppState;
use crate::Period;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/usage", get(usage_handler))
        .route("/api/raw", get(raw_handler))
}

/// Query parameters for the usage view
#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    /// `daily`, `weekly`, `monthly`; anything else returns raw readings
    period: Option<String>,
}

async fn usage_handler(
    Query(params): Query<UsageQuery>,
    State((dashboard, _config)): State<AppState>,
) -> impl IntoResponse {
    // ---
    let period = params
        .period
        .as_deref()
        .map(Period::parse)
        .unwrap_or_default();

    info!("GET /api/usage - period={}", period);

    let view = dashboard.load(period).await;

    debug!(
        "GET /api/usage - {} points, connected={}",
        view.points.len(),
        view.connected
    );
    Json(view)
}

async fn raw_handler(State((dashboard, _config)): State<AppState>) -> impl IntoResponse {
    // ---
    let records = dashboard.raw_records().await;
    debug!("GET /api/raw - {} records", records.len());
    Json(records)
}
