//! Data models for water usage telemetry.
//!
//! Raw records are deliberately loose (`serde_json::Value` fields) because
//! document stores do not enforce a schema. [`RawWaterRecord::normalize`]
//! turns one into a [`WaterReading`], which is what the aggregator consumes.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::timestamp::RawTimestamp;

// ---

/// Daily usage target in liters.
pub const DAILY_TARGET_LITERS: f64 = 150.0;

/// Weekly usage target in liters.
pub const WEEKLY_TARGET_LITERS: f64 = 1050.0;

/// Monthly usage target in liters.
pub const MONTHLY_TARGET_LITERS: f64 = 4500.0;

/// A telemetry record as stored in the document database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWaterRecord {
    // ---
    #[serde(default)]
    pub id: String,
    #[serde(rename = "flowRate", default)]
    pub flow_rate: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(rename = "totalLiters", default)]
    pub total_liters: Option<Value>,
}

impl RawWaterRecord {
    /// Normalize numbers and timestamp.
    ///
    /// Non-numeric values become `None`; so does a timestamp that cannot be
    /// parsed. The record itself is never rejected here.
    pub fn normalize(&self) -> WaterReading {
        // ---
        WaterReading {
            id: self.id.clone(),
            flow_rate: self.flow_rate.as_ref().and_then(finite_number),
            timestamp: self
                .timestamp
                .as_ref()
                .and_then(|v| RawTimestamp::from_json(v).normalize()),
            total_liters: self.total_liters.as_ref().and_then(finite_number),
        }
    }
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

/// A normalized telemetry reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterReading {
    // ---
    pub id: String,
    /// Instantaneous flow in liters per minute.
    pub flow_rate: Option<f64>,
    /// `None` when the source timestamp was missing or unparseable.
    pub timestamp: Option<DateTime<Utc>>,
    /// Cumulative volume in liters.
    pub total_liters: Option<f64>,
}

impl WaterReading {
    // ---
    pub fn new(
        id: impl Into<String>,
        flow_rate: f64,
        timestamp: DateTime<Utc>,
        total_liters: f64,
    ) -> Self {
        Self {
            id: id.into(),
            flow_rate: Some(flow_rate),
            timestamp: Some(timestamp),
            total_liters: Some(total_liters),
        }
    }

    pub fn usage(&self) -> f64 {
        self.total_liters.unwrap_or(0.0)
    }

    pub fn flow(&self) -> f64 {
        self.flow_rate.unwrap_or(0.0)
    }
}

/// Period selector for aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Period {
    // ---
    #[default]
    Daily,
    Weekly,
    Monthly,
    /// Unrecognized selector; aggregation passes readings through.
    Other(String),
}

impl Period {
    // ---
    pub fn parse(s: &str) -> Self {
        match s {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One reading on the daily line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    // ---
    pub date: NaiveDate,
    pub usage: f64,
    pub target: f64,
    pub flow_rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// One Sunday-starting week bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPoint {
    // ---
    /// `Week N`, where N is the week-of-month of the week start.
    pub week: String,
    /// Sunday the bucket starts on; disambiguates repeated labels.
    pub week_start: NaiveDate,
    pub usage: f64,
    pub target: f64,
    /// Mean flow rate across the bucket.
    pub flow_rate: f64,
}

/// One calendar-month bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    // ---
    /// Three-letter English month name.
    pub month: String,
    pub usage: f64,
    pub target: f64,
    /// Mean flow rate across the bucket.
    pub flow_rate: f64,
}

/// A chart-ready point. Serialized without a tag so the JSON matches what the
/// chart layer keys on (`date`, `week`, `month`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartPoint {
    // ---
    Daily(DailyPoint),
    Weekly(WeeklyPoint),
    Monthly(MonthlyPoint),
    Reading(WaterReading),
}

impl ChartPoint {
    // ---
    pub fn usage(&self) -> f64 {
        match self {
            Self::Daily(p) => p.usage,
            Self::Weekly(p) => p.usage,
            Self::Monthly(p) => p.usage,
            Self::Reading(r) => r.usage(),
        }
    }

    /// Passthrough readings carry no target.
    pub fn target(&self) -> f64 {
        match self {
            Self::Daily(p) => p.target,
            Self::Weekly(p) => p.target,
            Self::Monthly(p) => p.target,
            Self::Reading(_) => 0.0,
        }
    }

    pub fn flow_rate(&self) -> f64 {
        match self {
            Self::Daily(p) => p.flow_rate,
            Self::Weekly(p) => p.flow_rate,
            Self::Monthly(p) => p.flow_rate,
            Self::Reading(r) => r.flow(),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_normalize_full_record() {
        // ---
        let raw: RawWaterRecord = serde_json::from_value(json!({
            "id": "1008561",
            "flowRate": 2.1,
            "timestamp": "2025-07-10T10:30:00",
            "totalLiters": 125.7
        }))
        .unwrap();

        let reading = raw.normalize();
        assert_eq!(reading.id, "1008561");
        assert_eq!(reading.flow_rate, Some(2.1));
        assert_eq!(reading.total_liters, Some(125.7));
        assert_eq!(
            reading.timestamp,
            Some(Utc.with_ymd_and_hms(2025, 7, 10, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_normalize_tolerates_bad_fields() {
        // ---
        let raw: RawWaterRecord = serde_json::from_value(json!({
            "flowRate": "fast",
            "timestamp": "not a date",
        }))
        .unwrap();

        let reading = raw.normalize();
        assert_eq!(reading.id, "");
        assert_eq!(reading.flow_rate, None);
        assert_eq!(reading.total_liters, None);
        assert_eq!(reading.timestamp, None);
        assert_eq!(reading.usage(), 0.0);
        assert_eq!(reading.flow(), 0.0);
    }

    #[test]
    fn test_period_parse() {
        // ---
        assert_eq!(Period::parse("daily"), Period::Daily);
        assert_eq!(Period::parse("weekly"), Period::Weekly);
        assert_eq!(Period::parse("monthly"), Period::Monthly);
        assert_eq!(Period::parse("Daily"), Period::Other("Daily".into()));
        assert_eq!(Period::parse("hourly").to_string(), "hourly");
    }

    #[test]
    fn test_chart_point_json_shape() {
        // ---
        let point = ChartPoint::Weekly(WeeklyPoint {
            week: "Week 1".into(),
            week_start: NaiveDate::from_ymd_opt(2025, 7, 6).unwrap(),
            usage: 150.0,
            target: WEEKLY_TARGET_LITERS,
            flow_rate: 3.0,
        });

        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(
            value,
            json!({
                "week": "Week 1",
                "weekStart": "2025-07-06",
                "usage": 150.0,
                "target": 1050.0,
                "flowRate": 3.0
            })
        );
    }
}
