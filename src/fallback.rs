//! Fallback dataset used when the telemetry source is unavailable.
//!
//! The policy is chosen in configuration (`FALLBACK_DATASET`):
//! - `builtin` – the bundled sample week of readings (default)
//! - `none` – no fallback; degraded views are empty
//! - anything else – path to a JSON array of raw records

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};

use crate::models::{RawWaterRecord, WaterReading};

// ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackPolicy {
    dataset: Option<Vec<WaterReading>>,
}

impl FallbackPolicy {
    // ---
    pub fn none() -> Self {
        Self { dataset: None }
    }

    pub fn builtin() -> Self {
        Self::with_dataset(sample_dataset())
    }

    pub fn with_dataset(dataset: Vec<WaterReading>) -> Self {
        Self {
            dataset: Some(dataset),
        }
    }

    /// Resolve the `FALLBACK_DATASET` setting.
    pub fn from_setting(setting: &str) -> Result<Self> {
        // ---
        match setting.trim() {
            "" | "builtin" => Ok(Self::builtin()),
            "none" => Ok(Self::none()),
            path => Self::from_file(Path::new(path)),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        // ---
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fallback dataset {}", path.display()))?;
        let records: Vec<RawWaterRecord> = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid fallback dataset {}", path.display()))?;

        Ok(Self::with_dataset(
            records.iter().map(RawWaterRecord::normalize).collect(),
        ))
    }

    /// Readings to show in degraded mode; empty when disabled.
    pub fn dataset(&self) -> Vec<WaterReading> {
        self.dataset.clone().unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn describe(&self) -> String {
        match &self.dataset {
            Some(d) => format!("{} readings", d.len()),
            None => "disabled".to_string(),
        }
    }
}

/// A week of readings from a single meter, newest first.
pub fn sample_dataset() -> Vec<WaterReading> {
    // ---
    let at = |d, h, m, s| {
        Utc.with_ymd_and_hms(2025, 7, d, h, m, s)
            .single()
            .unwrap_or_default()
    };

    vec![
        WaterReading::new("1004055", 0.0, at(11, 11, 27, 3), 0.481),
        WaterReading::new("1008561", 2.1, at(10, 10, 30, 0), 125.7),
        WaterReading::new("1014296", 2.4, at(9, 9, 15, 0), 140.8),
        WaterReading::new("1019824", 2.2, at(8, 8, 45, 0), 130.4),
        WaterReading::new("1023200", 2.5, at(7, 7, 20, 0), 145.1),
        WaterReading::new("1025150", 1.9, at(6, 6, 30, 0), 110.8),
        WaterReading::new("1031295", 2.3, at(5, 5, 45, 0), 135.2),
    ]
}
