use std::sync::Arc;

use axum::Router;

use crate::{Config, Dashboard};

mod connection;
mod health;
mod pages;
mod usage;

// ---

/// Shared state handed to every route.
pub type AppState = (Arc<Dashboard>, Config);

pub fn router(dashboard: Arc<Dashboard>, config: Config) -> Router {
    // ---
    Router::new()
        .merge(usage::router())
        .merge(connection::router())
        .merge(pages::router())
        .merge(health::router())
        .with_state((dashboard, config))
}
