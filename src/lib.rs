//! Water usage telemetry dashboard.
//!
//! Readings are fetched from a document store (or Postgres), bucketed into
//! daily/weekly/monthly chart points by [`aggregate()`], and served to a
//! browser dashboard over axum.
//!
//! Module boundaries follow the Explicit Module Boundary Pattern (EMBP): each
//! module is reached through the re-exports below, so `routes/*.rs` only know
//! their parent gateway and not the files that implement each concern.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fallback;
pub mod models;
pub mod routes;
pub mod schema;
pub mod summary;
pub mod telemetry;
pub mod timestamp;
pub mod ui;

pub use aggregate::aggregate;
pub use config::Config;
pub use dashboard::{ConnectionStatus, Dashboard, UsageView};
pub use error::TelemetryError;
pub use fallback::FallbackPolicy;
pub use models::{ChartPoint, Period, RawWaterRecord, WaterReading};
pub use routes::router;
pub use summary::{UsageStatus, UsageSummary};
pub use telemetry::{Connector, SourceConnector, TelemetrySource};
