//! Time-bucketing of water readings into chart points.
//!
//! [`aggregate`] is a pure, total function: it sorts, buckets, and sums in a
//! single pass and never fails. Readings whose timestamp could not be parsed
//! are dropped from every bucketed view.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::{
    ChartPoint, DailyPoint, MonthlyPoint, Period, WaterReading, WeeklyPoint, DAILY_TARGET_LITERS,
    MONTHLY_TARGET_LITERS, WEEKLY_TARGET_LITERS,
};

// ---

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Aggregate `readings` for the given period.
///
/// - `Daily`: one point per timed reading.
/// - `Weekly`: one point per Sunday-starting week, labelled `Week N`.
/// - `Monthly`: one point per abbreviated month name.
/// - `Other`: the sorted readings, unchanged.
///
/// Output follows ascending reading time. Bucketed usage is a sum of
/// `totalLiters`; bucketed flow rate is the mean over every reading in the
/// bucket, with missing values counted as zero.
pub fn aggregate(mut readings: Vec<WaterReading>, period: &Period) -> Vec<ChartPoint> {
    // ---
    sort_by_time(&mut readings);

    match period {
        Period::Daily => readings.iter().filter_map(daily_point).collect(),
        Period::Weekly => bucket(&readings, week_start).map(|(start, acc)| {
            ChartPoint::Weekly(WeeklyPoint {
                week: week_label(start),
                week_start: start,
                usage: acc.usage,
                target: WEEKLY_TARGET_LITERS,
                flow_rate: acc.mean_flow(),
            })
        }),
        Period::Monthly => bucket(&readings, month_key).map(|(month, acc)| {
            ChartPoint::Monthly(MonthlyPoint {
                month: month.to_string(),
                usage: acc.usage,
                target: MONTHLY_TARGET_LITERS,
                flow_rate: acc.mean_flow(),
            })
        }),
        Period::Other(_) => readings.into_iter().map(ChartPoint::Reading).collect(),
    }
}

/// Stable ascending sort. Untimed readings go last.
fn sort_by_time(readings: &mut [WaterReading]) {
    // ---
    readings.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

fn daily_point(reading: &WaterReading) -> Option<ChartPoint> {
    // ---
    let timestamp = reading.timestamp?;
    Some(ChartPoint::Daily(DailyPoint {
        date: timestamp.date_naive(),
        usage: reading.usage(),
        target: DAILY_TARGET_LITERS,
        flow_rate: reading.flow(),
        timestamp,
    }))
}

/// Sunday on or before the reading's UTC date, or `None` when that Sunday
/// falls before the earliest representable date.
pub fn week_start(timestamp: DateTime<Utc>) -> Option<NaiveDate> {
    // ---
    let date = timestamp.date_naive();
    date.checked_sub_signed(Duration::days(i64::from(
        date.weekday().num_days_from_sunday(),
    )))
}

/// `Week N` where `N = ceil(day_of_month / 7)` of the week start.
pub fn week_label(start: NaiveDate) -> String {
    format!("Week {}", start.day().div_ceil(7))
}

fn month_key(timestamp: DateTime<Utc>) -> Option<&'static str> {
    MONTH_ABBREVIATIONS.get(timestamp.month0() as usize).copied()
}

#[derive(Debug, Default)]
struct Accumulator {
    usage: f64,
    flow_sum: f64,
    count: u32,
}

impl Accumulator {
    // ---
    fn add(&mut self, reading: &WaterReading) {
        self.usage += reading.usage();
        self.flow_sum += reading.flow();
        self.count += 1;
    }

    fn mean_flow(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.flow_sum / f64::from(self.count)
        }
    }
}

/// Group timed readings by `key`, preserving first-seen key order, then map
/// each bucket to a chart point. Readings with no key are dropped.
fn bucket<K, F>(readings: &[WaterReading], key: F) -> Buckets<K>
where
    K: Eq + Hash + Clone,
    F: Fn(DateTime<Utc>) -> Option<K>,
{
    // ---
    let mut order: Vec<(K, Accumulator)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for reading in readings {
        let Some(k) = reading.timestamp.and_then(&key) else {
            continue;
        };
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            order.push((k, Accumulator::default()));
            order.len() - 1
        });
        order[slot].1.add(reading);
    }

    Buckets(order)
}

struct Buckets<K>(Vec<(K, Accumulator)>);

impl<K> Buckets<K> {
    fn map<F>(self, f: F) -> Vec<ChartPoint>
    where
        F: Fn((K, Accumulator)) -> ChartPoint,
    {
        self.0.into_iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn reading(id: &str, liters: f64, flow: f64, ts: DateTime<Utc>) -> WaterReading {
        WaterReading::new(id, flow, ts, liters)
    }

    fn untimed(id: &str, liters: f64) -> WaterReading {
        WaterReading {
            id: id.into(),
            flow_rate: Some(1.0),
            timestamp: None,
            total_liters: Some(liters),
        }
    }

    fn weekly(points: &[ChartPoint]) -> Vec<&WeeklyPoint> {
        points
            .iter()
            .map(|p| match p {
                ChartPoint::Weekly(w) => w,
                other => panic!("expected weekly point, got {other:?}"),
            })
            .collect()
    }

    fn reading_ids(points: &[ChartPoint]) -> Vec<&str> {
        points
            .iter()
            .map(|p| match p {
                ChartPoint::Reading(r) => r.id.as_str(),
                other => panic!("expected raw reading, got {other:?}"),
            })
            .collect()
    }

    fn monthly(points: &[ChartPoint]) -> Vec<&MonthlyPoint> {
        points
            .iter()
            .map(|p| match p {
                ChartPoint::Monthly(m) => m,
                other => panic!("expected monthly point, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        // ---
        for period in [
            Period::Daily,
            Period::Weekly,
            Period::Monthly,
            Period::Other("hourly".into()),
        ] {
            assert!(aggregate(Vec::new(), &period).is_empty(), "{period}");
        }
    }

    #[test]
    fn test_daily_example() {
        // ---
        // Supplied newest first, as the source returns them
        let readings = vec![
            reading("b", 50.0, 4.0, at(2025, 7, 2)),
            reading("a", 100.0, 2.0, at(2025, 7, 1)),
        ];

        let points = aggregate(readings, &Period::Daily);
        assert_eq!(points.len(), 2);

        let ChartPoint::Daily(first) = &points[0] else {
            panic!("expected daily point");
        };
        let ChartPoint::Daily(second) = &points[1] else {
            panic!("expected daily point");
        };

        assert_eq!(first.date.to_string(), "2025-07-01");
        assert_eq!(second.date.to_string(), "2025-07-02");
        assert_eq!(first.usage, 100.0);
        assert_eq!(second.usage, 50.0);
        assert_eq!(first.target, 150.0);
        assert_eq!(second.target, 150.0);
        assert_eq!(first.flow_rate, 2.0);
    }

    #[test]
    fn test_daily_skips_untimed_and_defaults_missing() {
        // ---
        let mut missing = reading("m", 0.0, 0.0, at(2025, 7, 3));
        missing.total_liters = None;
        missing.flow_rate = None;

        let readings = vec![untimed("x", 10.0), missing, reading("a", 5.0, 1.0, at(2025, 7, 1))];

        let points = aggregate(readings, &Period::Daily);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].usage(), 5.0);
        assert_eq!(points[1].usage(), 0.0);
        assert_eq!(points[1].flow_rate(), 0.0);
    }

    #[test]
    fn test_weekly_same_week_sums() {
        // ---
        // 2025-07-06 is a Sunday, 2025-07-09 the Wednesday after
        let readings = vec![
            reading("a", 100.0, 2.0, at(2025, 7, 6)),
            reading("b", 50.0, 4.0, at(2025, 7, 9)),
        ];

        let points = aggregate(readings, &Period::Weekly);
        let weeks = weekly(&points);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].week, "Week 1");
        assert_eq!(weeks[0].usage, 150.0);
        assert_eq!(weeks[0].flow_rate, 3.0);
        assert_eq!(weeks[0].target, 1050.0);
        assert_eq!(weeks[0].week_start.to_string(), "2025-07-06");
    }

    #[test]
    fn test_weekly_week_start_in_previous_month() {
        // ---
        // 2025-07-01 is a Tuesday; its week starts Sunday 2025-06-29
        let readings = vec![
            reading("a", 10.0, 1.0, at(2025, 6, 30)),
            reading("b", 20.0, 3.0, at(2025, 7, 1)),
            reading("c", 40.0, 5.0, at(2025, 7, 7)),
        ];

        let points = aggregate(readings, &Period::Weekly);
        let weeks = weekly(&points);
        assert_eq!(weeks.len(), 2);

        assert_eq!(weeks[0].week, "Week 5");
        assert_eq!(weeks[0].week_start.to_string(), "2025-06-29");
        assert_eq!(weeks[0].usage, 30.0);
        assert_eq!(weeks[0].flow_rate, 2.0);

        assert_eq!(weeks[1].week, "Week 1");
        assert_eq!(weeks[1].week_start.to_string(), "2025-07-06");
        assert_eq!(weeks[1].usage, 40.0);
    }

    #[test]
    fn test_weekly_same_label_different_months_stay_apart() {
        // ---
        // Both weeks start on the 1st/6th of their month and label as Week 1
        let readings = vec![
            reading("jun", 10.0, 1.0, at(2025, 6, 2)),
            reading("jul", 20.0, 1.0, at(2025, 7, 8)),
        ];

        let points = aggregate(readings, &Period::Weekly);
        let weeks = weekly(&points);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week, "Week 1");
        assert_eq!(weeks[1].week, "Week 1");
        assert_ne!(weeks[0].week_start, weeks[1].week_start);
    }

    #[test]
    fn test_weekly_invalid_timestamp_excluded() {
        // ---
        let readings = vec![untimed("bad", 999.0), reading("a", 100.0, 2.0, at(2025, 7, 6))];

        let points = aggregate(readings, &Period::Weekly);
        let weeks = weekly(&points);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].usage, 100.0);
    }

    #[test]
    fn test_weekly_min_timestamp_dropped() {
        // ---
        // Earliest representable instant; its Sunday lies out of range
        let earliest = reading("min", 999.0, 9.0, DateTime::<Utc>::MIN_UTC);
        assert_eq!(week_start(DateTime::<Utc>::MIN_UTC), None);

        assert!(aggregate(vec![earliest.clone()], &Period::Weekly).is_empty());

        let readings = vec![earliest, reading("a", 100.0, 2.0, at(2025, 7, 6))];
        let points = aggregate(readings.clone(), &Period::Weekly);
        let weeks = weekly(&points);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].usage, 100.0);
        assert_eq!(weeks[0].flow_rate, 2.0);

        // Other views still accept it
        assert_eq!(aggregate(readings.clone(), &Period::Daily).len(), 2);
        let points = aggregate(readings, &Period::Monthly);
        let months = monthly(&points);
        assert_eq!(months[0].month, "Jan");
        assert_eq!(months[0].usage, 999.0);
    }

    #[test]
    fn test_weekly_missing_flow_counts_in_denominator() {
        // ---
        let mut no_flow = reading("b", 50.0, 0.0, at(2025, 7, 7));
        no_flow.flow_rate = None;

        let readings = vec![reading("a", 100.0, 4.0, at(2025, 7, 6)), no_flow];

        let points = aggregate(readings, &Period::Weekly);
        let weeks = weekly(&points);
        assert_eq!(weeks[0].flow_rate, 2.0);
        assert_eq!(weeks[0].usage, 150.0);
    }

    #[test]
    fn test_monthly_buckets_in_time_order() {
        // ---
        let readings = vec![
            reading("c", 5.0, 6.0, at(2025, 8, 2)),
            reading("a", 10.0, 1.0, at(2025, 7, 5)),
            reading("b", 20.0, 2.0, at(2025, 7, 20)),
            untimed("bad", 100.0),
        ];

        let points = aggregate(readings, &Period::Monthly);
        let months = monthly(&points);
        assert_eq!(months.len(), 2);

        assert_eq!(months[0].month, "Jul");
        assert_eq!(months[0].usage, 30.0);
        assert_eq!(months[0].flow_rate, 1.5);
        assert_eq!(months[0].target, 4500.0);

        assert_eq!(months[1].month, "Aug");
        assert_eq!(months[1].usage, 5.0);
    }

    #[test]
    fn test_unknown_period_passthrough_sorted() {
        // ---
        let readings = vec![
            untimed("bad", 1.0),
            reading("b", 2.0, 0.0, at(2025, 7, 2)),
            reading("a", 1.0, 0.0, at(2025, 7, 1)),
        ];

        let points = aggregate(readings, &Period::parse("yearly"));
        let ids = reading_ids(&points);
        assert_eq!(ids, vec!["a", "b", "bad"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        // ---
        let ts = at(2025, 7, 1);
        let readings = vec![
            reading("first", 1.0, 0.0, ts),
            reading("second", 2.0, 0.0, ts),
        ];

        let points = aggregate(readings, &Period::Other(String::new()));
        let ids = reading_ids(&points);
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_idempotent() {
        // ---
        let readings = vec![
            reading("a", 100.0, 2.0, at(2025, 7, 6)),
            reading("b", 50.0, 4.0, at(2025, 7, 15)),
        ];

        for period in [Period::Daily, Period::Weekly, Period::Monthly] {
            let once = aggregate(readings.clone(), &period);
            let twice = aggregate(readings.clone(), &period);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_week_start_is_previous_sunday() {
        // ---
        let sunday = |m, d| NaiveDate::from_ymd_opt(2025, m, d);
        assert_eq!(week_start(at(2025, 7, 1)), sunday(6, 29));
        assert_eq!(week_start(at(2025, 7, 6)), sunday(7, 6));
        assert_eq!(week_start(at(2025, 7, 12)), sunday(7, 6));
    }

    #[test]
    fn test_week_label_boundaries() {
        // ---
        let day = |d| NaiveDate::from_ymd_opt(2025, 8, d).unwrap();
        assert_eq!(week_label(day(1)), "Week 1");
        assert_eq!(week_label(day(7)), "Week 1");
        assert_eq!(week_label(day(8)), "Week 2");
        assert_eq!(week_label(day(31)), "Week 5");
    }
}
