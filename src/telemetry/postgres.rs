//! Postgres-backed telemetry source.
//!
//! Reads the same four fields from a table instead of a document collection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::TelemetrySource;
use crate::config::mask_db_url;
use crate::error::TelemetryError;
use crate::models::WaterReading;
use crate::schema;

// ---

#[derive(Debug, sqlx::FromRow)]
struct WaterDataRow {
    id: String,
    flow_rate: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
    total_liters: Option<f64>,
}

impl From<WaterDataRow> for WaterReading {
    fn from(row: WaterDataRow) -> Self {
        WaterReading {
            id: row.id,
            flow_rate: row.flow_rate.filter(|v| v.is_finite()),
            timestamp: row.timestamp,
            total_liters: row.total_liters.filter(|v| v.is_finite()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
    select_sql: String,
}

impl PgSource {
    /// Open a pool and make sure the readings table exists.
    pub async fn connect(db_url: &str, pool_max: u32, table: &str) -> Result<Self, TelemetryError> {
        // ---
        let quoted = schema::quoted_table(table)
            .ok_or_else(|| TelemetryError::connection(format!("invalid table name '{table}'")))?;

        info!("Attempting to connect to database: {}", mask_db_url(db_url));

        let pool = PgPoolOptions::new()
            .max_connections(pool_max)
            .connect(db_url)
            .await
            .map_err(|e| {
                TelemetryError::connection(format!(
                    "failed to connect to database '{}': {}",
                    mask_db_url(db_url),
                    e
                ))
            })?;

        info!("Successfully connected to database");

        schema::create_schema(&pool, &quoted)
            .await
            .map_err(|e| TelemetryError::connection(format!("schema setup failed: {e}")))?;

        Ok(Self {
            pool,
            select_sql: select_sql(&quoted),
        })
    }
}

/// Latest-first query over an already quoted table name.
fn select_sql(quoted: &str) -> String {
    format!(
        r#"
        SELECT id, flow_rate, "timestamp", total_liters
        FROM {quoted}
        ORDER BY "timestamp" DESC NULLS LAST
        LIMIT $1
        "#
    )
}

#[async_trait]
impl TelemetrySource for PgSource {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_recent(&self, limit: u32) -> Result<Vec<WaterReading>, TelemetryError> {
        // ---
        let rows: Vec<WaterDataRow> = sqlx::query_as(&self.select_sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TelemetryError::fetch(e.to_string()))?;

        info!("Fetched {} readings from postgres", rows.len());
        Ok(rows.into_iter().map(WaterReading::from).collect())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn row(flow_rate: Option<f64>, total_liters: Option<f64>) -> WaterDataRow {
        WaterDataRow {
            id: "r1".to_string(),
            flow_rate,
            timestamp: Some(Utc.with_ymd_and_hms(2025, 7, 6, 8, 0, 0).unwrap()),
            total_liters,
        }
    }

    #[test]
    fn test_row_keeps_finite_values() {
        // ---
        let reading = WaterReading::from(row(Some(2.5), Some(120.0)));
        assert_eq!(reading.id, "r1");
        assert_eq!(reading.flow_rate, Some(2.5));
        assert_eq!(reading.total_liters, Some(120.0));
        assert_eq!(
            reading.timestamp,
            Some(Utc.with_ymd_and_hms(2025, 7, 6, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_row_drops_non_finite_values() {
        // ---
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let reading = WaterReading::from(row(Some(bad), Some(bad)));
            assert_eq!(reading.flow_rate, None, "flow_rate {bad}");
            assert_eq!(reading.total_liters, None, "total_liters {bad}");
            assert_eq!(reading.usage(), 0.0);
            assert_eq!(reading.flow(), 0.0);
        }

        // Mixed: one finite, one not
        let reading = WaterReading::from(row(Some(f64::NAN), Some(42.0)));
        assert_eq!(reading.flow_rate, None);
        assert_eq!(reading.total_liters, Some(42.0));
    }

    #[test]
    fn test_row_null_columns() {
        // ---
        let mut nulls = row(None, None);
        nulls.timestamp = None;

        let reading = WaterReading::from(nulls);
        assert_eq!(reading.flow_rate, None);
        assert_eq!(reading.total_liters, None);
        assert_eq!(reading.timestamp, None);
    }

    #[test]
    fn test_select_sql_shape() {
        // ---
        let quoted = schema::quoted_table("waterData").unwrap();
        let sql = select_sql(&quoted);

        assert!(sql.contains(r#"FROM "waterData""#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "timestamp" DESC NULLS LAST"#), "{sql}");
        assert!(sql.contains("LIMIT $1"), "{sql}");
        assert!(sql.contains("flow_rate") && sql.contains("total_liters"), "{sql}");
    }
}
