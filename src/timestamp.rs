//! Timestamp normalization for raw telemetry records.
//!
//! Readings reach us as plain date strings, epoch milliseconds, or
//! database-specific wrapper objects. Everything is folded into a single
//! `DateTime<Utc>` before any comparison happens; anything that cannot be
//! read becomes `None` and is skipped by the aggregator.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

// ---

/// A timestamp as it arrived from the source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    // ---
    /// Textual date (RFC 3339, naive date-time, or plain date).
    Text(String),

    /// Milliseconds since the Unix epoch.
    Millis(f64),

    /// Seconds/nanoseconds wrapper used by document stores.
    Parts { seconds: i64, nanoseconds: u32 },

    /// Present but not recognizable as a timestamp.
    Invalid,
}

impl RawTimestamp {
    /// Interpret an arbitrary JSON value as a raw timestamp.
    pub fn from_json(value: &Value) -> Self {
        // ---
        match value {
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => n.as_f64().map_or(Self::Invalid, Self::Millis),
            Value::Object(map) => {
                let seconds = map
                    .get("seconds")
                    .or_else(|| map.get("_seconds"))
                    .and_then(integer_like);
                let nanoseconds = map
                    .get("nanoseconds")
                    .or_else(|| map.get("_nanoseconds"))
                    .or_else(|| map.get("nanos"))
                    .and_then(integer_like)
                    .unwrap_or(0);

                match (seconds, u32::try_from(nanoseconds)) {
                    (Some(seconds), Ok(nanoseconds)) => Self::Parts {
                        seconds,
                        nanoseconds,
                    },
                    _ => Self::Invalid,
                }
            }
            _ => Self::Invalid,
        }
    }

    /// Normalize into UTC. Returns `None` for anything unparseable.
    pub fn normalize(&self) -> Option<DateTime<Utc>> {
        // ---
        match self {
            Self::Text(s) => parse_text(s),
            Self::Millis(ms) => {
                if !ms.is_finite() {
                    return None;
                }
                DateTime::from_timestamp_millis(ms.trunc() as i64)
            }
            Self::Parts {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            Self::Invalid => None,
        }
    }
}

/// Wrapper fields sometimes arrive as strings (`"1720000000"`).
fn integer_like(value: &Value) -> Option<i64> {
    // ---
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    // ---
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Zone-less date-times are read as UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_text_forms() {
        // ---
        let expected = utc(2025, 7, 11, 11, 27, 3);

        let cases = [
            "2025-07-11T11:27:03Z",
            "2025-07-11T13:27:03+02:00",
            "2025-07-11T11:27:03",
            "2025-07-11 11:27:03",
            "  2025-07-11T11:27:03.000Z ",
        ];
        for case in cases {
            assert_eq!(
                RawTimestamp::Text(case.to_string()).normalize(),
                Some(expected),
                "failed to parse {case}"
            );
        }

        assert_eq!(
            RawTimestamp::Text("2025-07-11".into()).normalize(),
            Some(utc(2025, 7, 11, 0, 0, 0))
        );
    }

    #[test]
    fn test_invalid_text() {
        // ---
        for case in ["", "yesterday", "2025-13-40", "11/07/2025"] {
            assert_eq!(RawTimestamp::Text(case.into()).normalize(), None, "{case}");
        }
        assert_eq!(RawTimestamp::Invalid.normalize(), None);
    }

    #[test]
    fn test_millis_and_parts() {
        // ---
        let expected = utc(2025, 7, 1, 0, 0, 0);
        let secs = expected.timestamp();

        assert_eq!(
            RawTimestamp::Millis((secs * 1000) as f64).normalize(),
            Some(expected)
        );
        assert_eq!(RawTimestamp::Millis(f64::NAN).normalize(), None);
        assert_eq!(
            RawTimestamp::Parts {
                seconds: secs,
                nanoseconds: 0
            }
            .normalize(),
            Some(expected)
        );
    }

    #[test]
    fn test_from_json_wrapper_aliases() {
        // ---
        let expected = utc(2025, 7, 1, 0, 0, 0);
        let secs = expected.timestamp();

        let firestore_sdk = json!({ "seconds": secs, "nanoseconds": 0 });
        let admin_export = json!({ "_seconds": secs, "_nanoseconds": 0 });
        let stringly = json!({ "seconds": secs.to_string(), "nanos": 0 });

        for value in [firestore_sdk, admin_export, stringly] {
            assert_eq!(RawTimestamp::from_json(&value).normalize(), Some(expected));
        }
    }

    #[test]
    fn test_from_json_rejects_other_shapes() {
        // ---
        assert_eq!(RawTimestamp::from_json(&json!(true)), RawTimestamp::Invalid);
        assert_eq!(RawTimestamp::from_json(&json!(null)), RawTimestamp::Invalid);
        assert_eq!(
            RawTimestamp::from_json(&json!({ "when": 5 })),
            RawTimestamp::Invalid
        );
        assert_eq!(
            RawTimestamp::from_json(&json!({ "seconds": 1, "nanoseconds": -4 })),
            RawTimestamp::Invalid
        );
    }
}
