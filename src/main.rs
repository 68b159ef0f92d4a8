//! Application entry point for the `hydrolock-telemetry` service.
//!
//! This binary orchestrates the full startup sequence for the water usage
//! dashboard, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Resolving the fallback dataset policy
//! - Connecting to the telemetry source (a failure here is not fatal)
//! - Mounting all API and page routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `FIRESTORE_PROJECT_ID` (**required** for the firestore backend)
//! - `DATABASE_URL` (**required** for the postgres backend)
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the full list.
use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use hydrolock_telemetry::{config, router, Connector, Dashboard, FallbackPolicy, SourceConnector};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let fallback = FallbackPolicy::from_setting(&cfg.fallback_dataset)
        .context("Failed to resolve FALLBACK_DATASET")?;
    tracing::info!("Fallback dataset: {}", fallback.describe());

    // Start degraded rather than refuse to serve
    let connector = SourceConnector::from_config(&cfg);
    let dashboard = match connector.connect().await {
        Ok(source) => {
            tracing::info!("Connected to {} telemetry source", source.name());
            Dashboard::with_source(connector, source, fallback, cfg.fetch_limit)
        }
        Err(e) => {
            tracing::warn!("Starting disconnected: {}", e);
            Dashboard::new(connector, fallback, cfg.fetch_limit)
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));

    // Build app from routes gateway (EMBP)
    let app: Router = router(Arc::new(dashboard), cfg);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `AXUM_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked. It installs the subscriber globally
/// for the lifetime of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AXUM_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!(
            "{level},sqlx::query=warn,hyper_util=info,reqwest=info"
        ))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
