use axum::{extract::State, response::Html, routing::get, Router};

use super::AppState;
use crate::ui::{render_dashboard, render_splash};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/", get(splash))
        .route("/dashboard", get(dashboard))
}

async fn splash(State((_, config)): State<AppState>) -> Html<String> {
    Html(render_splash(config.splash_ms))
}

async fn dashboard() -> Html<String> {
    Html(render_dashboard())
}
