//! Dashboard service: fetch, aggregate, and fall back.
//!
//! Holds the only mutable state in the service: the current source handle
//! and the raw records of the most recent completed fetch. Both are simply
//! overwritten; concurrent requests are not ordered and the last one to
//! finish wins.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::aggregate::aggregate;
use crate::error::TelemetryError;
use crate::fallback::FallbackPolicy;
use crate::models::{ChartPoint, Period, WaterReading};
use crate::summary::{summarize, UsageSummary};
use crate::telemetry::{Connector, TelemetrySource};

// ---

/// Connection state reported to the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    // ---
    pub connected: bool,
    /// Backend name, or `fallback` while disconnected.
    pub source: String,
    pub error: Option<String>,
}

/// Everything the dashboard renders for one period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageView {
    // ---
    pub period: Period,
    pub connected: bool,
    pub source: String,
    /// Human-readable failure, set whenever fallback data is shown.
    pub error: Option<String>,
    pub points: Vec<ChartPoint>,
    pub summary: UsageSummary,
}

pub struct Dashboard {
    connector: Box<dyn Connector>,
    fallback: FallbackPolicy,
    fetch_limit: u32,
    source: RwLock<Option<Arc<dyn TelemetrySource>>>,
    last_raw: RwLock<Vec<WaterReading>>,
    last_error: RwLock<Option<String>>,
}

impl Dashboard {
    /// Create a disconnected dashboard. The first `load` connects.
    pub fn new(connector: impl Connector + 'static, fallback: FallbackPolicy, fetch_limit: u32) -> Self {
        // ---
        Self {
            connector: Box::new(connector),
            fallback,
            fetch_limit,
            source: RwLock::new(None),
            last_raw: RwLock::new(Vec::new()),
            last_error: RwLock::new(None),
        }
    }

    /// Create a dashboard that starts with an already connected source.
    pub fn with_source(
        connector: impl Connector + 'static,
        source: Arc<dyn TelemetrySource>,
        fallback: FallbackPolicy,
        fetch_limit: u32,
    ) -> Self {
        // ---
        let dashboard = Self::new(connector, fallback, fetch_limit);
        Self {
            source: RwLock::new(Some(source)),
            ..dashboard
        }
    }

    /// Fetch recent readings and aggregate them for `period`.
    ///
    /// Never fails: connection and fetch failures both switch to the fallback
    /// dataset and report the failure in [`UsageView::error`].
    pub async fn load(&self, period: Period) -> UsageView {
        // ---
        let source = match self.current_source().await {
            Some(source) => source,
            None => match self.connect().await {
                Ok(source) => source,
                Err(e) => {
                    let message = format!("Failed to connect to telemetry source: {}", e.detail());
                    return self.degraded(period, message).await;
                }
            },
        };

        match source.fetch_recent(self.fetch_limit).await {
            Ok(records) => {
                info!(
                    "Loaded {} readings from {} for {} view",
                    records.len(),
                    source.name(),
                    period
                );
                *self.last_raw.write().await = records.clone();
                *self.last_error.write().await = None;

                let data_points = records.len();
                let points = aggregate(records, &period);
                UsageView {
                    summary: summarize(&points, data_points),
                    period,
                    connected: true,
                    source: source.name().to_string(),
                    error: None,
                    points,
                }
            }
            Err(e) => {
                error!("Error fetching water data from {}: {}", source.name(), e);
                // Degraded until the next successful connect
                *self.source.write().await = None;
                let message = format!("Failed to fetch water data: {}", e.detail());
                self.degraded(period, message).await
            }
        }
    }

    /// Drop the current handle and connect again.
    pub async fn reconnect(&self) -> ConnectionStatus {
        // ---
        *self.source.write().await = None;
        match self.connect().await {
            Ok(source) => ConnectionStatus {
                connected: true,
                source: source.name().to_string(),
                error: None,
            },
            Err(e) => ConnectionStatus {
                connected: false,
                source: "fallback".to_string(),
                error: Some(format!(
                    "Failed to connect to telemetry source: {}",
                    e.detail()
                )),
            },
        }
    }

    pub async fn status(&self) -> ConnectionStatus {
        // ---
        let source = self.current_source().await;
        ConnectionStatus {
            connected: source.is_some(),
            source: source.map_or("fallback", |s| s.name()).to_string(),
            error: self.last_error.read().await.clone(),
        }
    }

    /// Raw records behind the most recent view.
    pub async fn raw_records(&self) -> Vec<WaterReading> {
        self.last_raw.read().await.clone()
    }

    async fn current_source(&self) -> Option<Arc<dyn TelemetrySource>> {
        self.source.read().await.clone()
    }

    async fn connect(&self) -> Result<Arc<dyn TelemetrySource>, TelemetryError> {
        // ---
        match self.connector.connect().await {
            Ok(source) => {
                info!("Connected to {} telemetry source", source.name());
                *self.source.write().await = Some(Arc::clone(&source));
                *self.last_error.write().await = None;
                Ok(source)
            }
            Err(e) => {
                error!("Telemetry connection error: {}", e);
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn degraded(&self, period: Period, message: String) -> UsageView {
        // ---
        if self.fallback.is_enabled() {
            warn!("Serving fallback data ({}): {}", self.fallback.describe(), message);
        } else {
            warn!("No fallback dataset configured, serving empty view: {}", message);
        }
        *self.last_error.write().await = Some(message.clone());

        let records = self.fallback.dataset();
        *self.last_raw.write().await = records.clone();

        let data_points = records.len();
        let points = aggregate(records, &period);
        UsageView {
            summary: summarize(&points, data_points),
            period,
            connected: false,
            source: "fallback".to_string(),
            error: Some(message),
            points,
        }
    }
}
