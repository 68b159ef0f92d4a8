//! Database schema management for the Postgres telemetry backend.
//!
//! Ensures the readings table and its timestamp index exist before the first
//! query. Applied once when [`crate::telemetry::PgSource`] connects.

use sqlx::PgPool;

// ---

/// Quote a table name after checking it is a plain identifier.
///
/// Table names come from configuration and cannot be bound as parameters.
pub fn quoted_table(name: &str) -> Option<String> {
    // ---
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());

    valid.then(|| format!("\"{name}\""))
}

/// Create the readings table (idempotent).
///
/// Columns mirror the document fields. Every value column is nullable because
/// the document store never enforced them either. Safe to call on every
/// startup; no-op if the objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id            TEXT PRIMARY KEY,
            flow_rate     DOUBLE PRECISION,
            "timestamp"   TIMESTAMPTZ,
            total_liters  DOUBLE PRECISION
        );
        "#
    ))
    .execute(&mut *tx)
    .await?;

    // Recent-first reads
    let index = format!(
        "idx_{}_timestamp",
        table.trim_matches('"').to_ascii_lowercase()
    );
    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS {index}
            ON {table} ("timestamp" DESC);
        "#
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
