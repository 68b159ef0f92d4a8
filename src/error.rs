//! Failure kinds raised by telemetry sources.
//!
//! Only the source layer can fail. The aggregator is total and the dashboard
//! converts every [`TelemetryError`] into a degraded view instead of an HTTP
//! error.

use thiserror::Error;

/// Errors surfaced by a [`crate::telemetry::TelemetrySource`] or its connector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The telemetry source could not be reached or initialized.
    #[error("connection failure: {0}")]
    Connection(String),

    /// A query failed after a connection was established.
    #[error("fetch failure: {0}")]
    Fetch(String),
}

impl TelemetryError {
    // ---
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// The message shown to dashboard users, without the kind prefix.
    pub fn detail(&self) -> &str {
        // ---
        match self {
            Self::Connection(message) | Self::Fetch(message) => message,
        }
    }
}

impl From<reqwest::Error> for TelemetryError {
    fn from(err: reqwest::Error) -> Self {
        // ---
        if err.is_connect() || err.is_builder() {
            Self::Connection(err.to_string())
        } else {
            Self::Fetch(err.to_string())
        }
    }
}
