//! Summary tiles shown above the usage chart.

use serde::Serialize;

use crate::models::ChartPoint;

// ---

/// Usage level of the most recent point relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UsageStatus {
    Low,
    Normal,
    High,
}

impl UsageStatus {
    /// `Low` up to 80 % of target, `Normal` up to 95 %, `High` above.
    pub fn from_percentage(percentage: f64) -> Self {
        // ---
        if percentage <= 80.0 {
            Self::Low
        } else if percentage <= 95.0 {
            Self::Normal
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    // ---
    pub current_usage: f64,
    pub current_flow_rate: f64,
    pub average_usage: f64,
    /// Current usage as a percentage of the current target.
    pub target_percentage: f64,
    pub status: UsageStatus,
    /// Raw records behind the view, not chart points.
    pub data_points: usize,
}

/// Build the tiles from aggregated points and the raw record count.
pub fn summarize(points: &[ChartPoint], data_points: usize) -> UsageSummary {
    // ---
    let (current_usage, current_flow_rate, target) = match points.last() {
        Some(last) => (round_to(last.usage(), 2), last.flow_rate(), last.target()),
        None => (0.0, 0.0, 0.0),
    };

    let average_usage = if points.is_empty() {
        0.0
    } else {
        let total: f64 = points.iter().map(ChartPoint::usage).sum();
        round_to(total / points.len() as f64, 2)
    };

    let target_percentage = if target > 0.0 {
        round_to(current_usage / target * 100.0, 1)
    } else {
        0.0
    };

    UsageSummary {
        current_usage,
        current_flow_rate,
        average_usage,
        target_percentage,
        status: UsageStatus::from_percentage(target_percentage),
        data_points,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
