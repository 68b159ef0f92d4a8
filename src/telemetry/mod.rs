//! Telemetry sources.
//!
//! A source answers exactly one query: the most recent `limit` readings,
//! newest first. Connecting is an explicit factory step ([`Connector`]) that
//! hands back an owned handle; nothing is cached at module level.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::config::{Backend, Config};
use crate::error::TelemetryError;
use crate::models::WaterReading;

mod firestore;
mod postgres;

pub use firestore::{decode_run_query, FirestoreSource};
pub use postgres::PgSource;

// ---

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Short name used in logs and status responses.
    fn name(&self) -> &'static str;

    /// Fetch up to `limit` readings ordered by timestamp, newest first.
    async fn fetch_recent(&self, limit: u32) -> Result<Vec<WaterReading>, TelemetryError>;
}

/// Builds a connected [`TelemetrySource`].
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn TelemetrySource>, TelemetryError>;
}

/// Connector for the backend selected in [`Config`].
#[derive(Debug, Clone)]
pub struct SourceConnector {
    backend: Backend,
    collection: String,
    timeout: Duration,
}

impl SourceConnector {
    // ---
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            backend: cfg.backend.clone(),
            collection: cfg.collection.clone(),
            timeout: Duration::from_secs(cfg.fetch_timeout_secs),
        }
    }
}

#[async_trait]
impl Connector for SourceConnector {
    async fn connect(&self) -> Result<Arc<dyn TelemetrySource>, TelemetryError> {
        // ---
        match &self.backend {
            Backend::Firestore {
                base_url,
                project_id,
                api_key,
            } => {
                let source = FirestoreSource::new(
                    base_url,
                    project_id,
                    api_key.clone(),
                    &self.collection,
                    self.timeout,
                )?;
                Ok(Arc::new(source))
            }
            Backend::Postgres {
                db_url,
                db_pool_max,
            } => {
                let source = PgSource::connect(db_url, *db_pool_max, &self.collection).await?;
                Ok(Arc::new(source))
            }
        }
    }
}
