//! Configuration loader for the `hydrolock-telemetry` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
//! Parsing runs against a lookup function so tests can feed a map instead of
//! mutating the process environment.
use std::env;

use anyhow::{anyhow, bail, Result};

/// Parse an optional integer variable with a default value.
macro_rules! parse_num {
    ($lookup:expr, $ty:ty, $var_name:expr, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string variable.
macro_rules! require_var {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Where telemetry readings are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    // ---
    /// Firestore REST API.
    Firestore {
        base_url: String,
        project_id: String,
        api_key: Option<String>,
    },

    /// A PostgreSQL table with the same columns.
    Postgres { db_url: String, db_pool_max: u32 },
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Telemetry backend and its connection parameters.
    pub backend: Backend,

    /// Collection (or table) holding the readings.
    pub collection: String,

    /// Number of most recent readings fetched per request.
    pub fetch_limit: u32,

    /// HTTP timeout for telemetry requests, in seconds.
    pub fetch_timeout_secs: u64,

    /// `builtin`, `none`, or a path to a JSON dataset.
    pub fallback_dataset: String,

    /// Port the HTTP server listens on.
    pub port: u16,

    /// How long the splash page shows before the dashboard, in milliseconds.
    pub splash_ms: u64,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `FIRESTORE_PROJECT_ID` – when `TELEMETRY_BACKEND=firestore` (the default)
/// - `DATABASE_URL` – when `TELEMETRY_BACKEND=postgres`
///
/// Optional:
/// - `FIRESTORE_API_KEY` – web API key (default: none)
/// - `FIRESTORE_BASE_URL` – REST endpoint (default: Google's public endpoint)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `TELEMETRY_COLLECTION` – collection name (default: `waterData`)
/// - `FETCH_LIMIT` – readings per fetch (default: 30)
/// - `FETCH_TIMEOUT_SECS` – request timeout, at least 1 (default: 10)
/// - `FALLBACK_DATASET` – fallback policy (default: `builtin`)
/// - `PORT` – listen port (default: 8080)
/// - `SPLASH_MS` – splash duration (default: 3000)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    load_from(|name| env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_from<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let backend_name = lookup("TELEMETRY_BACKEND").unwrap_or_else(|| "firestore".to_string());

    let backend = match backend_name.trim().to_ascii_lowercase().as_str() {
        "firestore" => Backend::Firestore {
            base_url: lookup("FIRESTORE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            project_id: require_var!(lookup, "FIRESTORE_PROJECT_ID"),
            api_key: lookup("FIRESTORE_API_KEY").filter(|k| !k.trim().is_empty()),
        },
        "postgres" => Backend::Postgres {
            db_url: require_var!(lookup, "DATABASE_URL"),
            db_pool_max: parse_num!(lookup, u32, "DB_POOL_MAX", 5),
        },
        other => bail!("Invalid TELEMETRY_BACKEND: {other} (expected firestore or postgres)"),
    };

    let collection = lookup("TELEMETRY_COLLECTION").unwrap_or_else(|| "waterData".to_string());
    let fetch_limit = parse_num!(lookup, u32, "FETCH_LIMIT", 30);
    let fetch_timeout_secs = parse_num!(lookup, u64, "FETCH_TIMEOUT_SECS", 10);
    let fallback_dataset = lookup("FALLBACK_DATASET").unwrap_or_else(|| "builtin".to_string());
    let port = parse_num!(lookup, u16, "PORT", 8080);
    let splash_ms = parse_num!(lookup, u64, "SPLASH_MS", 3000);

    if fetch_limit == 0 {
        bail!("Invalid FETCH_LIMIT: must be at least 1");
    }
    if fetch_timeout_secs == 0 {
        bail!("Invalid FETCH_TIMEOUT_SECS: must be at least 1");
    }

    Ok(Config {
        backend,
        collection,
        fetch_limit,
        fetch_timeout_secs,
        fallback_dataset,
        port,
        splash_ms,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords and API keys while
    /// showing all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        match &self.backend {
            Backend::Firestore {
                base_url,
                project_id,
                api_key,
            } => {
                tracing::info!("  TELEMETRY_BACKEND    : firestore");
                tracing::info!("  FIRESTORE_BASE_URL   : {}", base_url);
                tracing::info!("  FIRESTORE_PROJECT_ID : {}", project_id);
                tracing::info!(
                    "  FIRESTORE_API_KEY    : {}",
                    api_key.as_deref().map_or("(none)".to_string(), mask_secret)
                );
            }
            Backend::Postgres {
                db_url,
                db_pool_max,
            } => {
                tracing::info!("  TELEMETRY_BACKEND    : postgres");
                tracing::info!("  DATABASE_URL         : {}", mask_db_url(db_url));
                tracing::info!("  DB_POOL_MAX          : {}", db_pool_max);
            }
        }
        tracing::info!("  TELEMETRY_COLLECTION : {}", self.collection);
        tracing::info!("  FETCH_LIMIT          : {}", self.fetch_limit);
        tracing::info!("  FETCH_TIMEOUT_SECS   : {}", self.fetch_timeout_secs);
        tracing::info!("  FALLBACK_DATASET     : {}", self.fallback_dataset);
        tracing::info!("  PORT                 : {}", self.port);
        tracing::info!("  SPLASH_MS            : {}", self.splash_ms);
    }
}

/// Mask the password in a database URL (`user:****@host`).
pub fn mask_db_url(db_url: &str) -> String {
    // ---
    if let Some(at_pos) = db_url.rfind('@') {
        if let Some(colon_pos) = db_url[..at_pos].rfind(':') {
            // Skip the scheme separator in `postgres://host` style URLs
            if !db_url[colon_pos..].starts_with("://") {
                return format!("{}:****{}", &db_url[..colon_pos], &db_url[at_pos..]);
            }
        }
    }
    db_url.to_string()
}

/// Keep the first four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}****")
}
