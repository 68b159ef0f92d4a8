//! Firestore REST client.
//!
//! Uses the `documents:runQuery` endpoint with a structured query so ordering
//! and limiting happen server-side. Firestore wraps every field in a typed
//! value (`{"doubleValue": 2.1}`); those are flattened to plain JSON and then
//! normalized like any other raw record.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::TelemetrySource;
use crate::error::TelemetryError;
use crate::models::{RawWaterRecord, WaterReading};

// ---

#[derive(Debug, Clone)]
pub struct FirestoreSource {
    client: reqwest::Client,
    query_url: String,
    api_key: Option<String>,
    collection: String,
}

impl FirestoreSource {
    /// Build a client for `projects/{project_id}` under `base_url`.
    ///
    /// No request is made here; an empty project id or a client that cannot
    /// be built is reported as a connection failure.
    pub fn new(
        base_url: &str,
        project_id: &str,
        api_key: Option<String>,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, TelemetryError> {
        // ---
        if project_id.trim().is_empty() {
            return Err(TelemetryError::connection("Firestore project id is empty"));
        }
        if collection.trim().is_empty() {
            return Err(TelemetryError::connection("collection name is empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::connection(format!("failed to build client: {e}")))?;

        let query_url = format!(
            "{}/projects/{}/databases/(default)/documents:runQuery",
            base_url.trim_end_matches('/'),
            project_id
        );

        info!("Firestore source ready: {}", query_url);

        Ok(Self {
            client,
            query_url,
            api_key,
            collection: collection.to_string(),
        })
    }

    fn structured_query(&self, limit: u32) -> Value {
        // ---
        json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "orderBy": [{
                    "field": { "fieldPath": "timestamp" },
                    "direction": "DESCENDING"
                }],
                "limit": limit
            }
        })
    }
}

#[async_trait]
impl TelemetrySource for FirestoreSource {
    fn name(&self) -> &'static str {
        "firestore"
    }

    async fn fetch_recent(&self, limit: u32) -> Result<Vec<WaterReading>, TelemetryError> {
        // ---
        let mut request = self
            .client
            .post(&self.query_url)
            .json(&self.structured_query(limit));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        debug!("Querying {} (limit {})", self.collection, limit);

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| TelemetryError::fetch(format!("unreadable response ({status}): {e}")))?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            return Err(TelemetryError::fetch(format!(
                "Firestore returned {status}: {message}"
            )));
        }

        let readings = decode_run_query(&body)?;
        info!(
            "Fetched {} readings from {}",
            readings.len(),
            self.collection
        );
        Ok(readings)
    }
}

/// Decode a `runQuery` response body into readings.
///
/// Rows without a `document` (e.g. the lone `readTime` row of an empty result)
/// are skipped.
pub fn decode_run_query(body: &Value) -> Result<Vec<WaterReading>, TelemetryError> {
    // ---
    let rows = body
        .as_array()
        .ok_or_else(|| TelemetryError::fetch("runQuery response is not an array"))?;

    let mut readings = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let Some(document) = row.get("document") else {
            continue;
        };

        let id = document
            .get("name")
            .and_then(Value::as_str)
            .and_then(|name| name.rsplit('/').next())
            .unwrap_or_default()
            .to_string();

        let fields = match document.get("fields") {
            Some(Value::Object(fields)) => flatten_fields(fields),
            _ => Map::new(),
        };

        let record = RawWaterRecord {
            id,
            flow_rate: fields.get("flowRate").cloned(),
            timestamp: fields.get("timestamp").cloned(),
            total_liters: fields.get("totalLiters").cloned(),
        };

        let reading = record.normalize();
        if reading.timestamp.is_none() {
            debug!("Row {} ({}) has no usable timestamp", i, reading.id);
        }
        readings.push(reading);
    }

    Ok(readings)
}

fn flatten_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, typed)| (name.clone(), flatten_value(typed)))
        .collect()
}

/// Convert one Firestore typed value to plain JSON.
fn flatten_value(typed: &Value) -> Value {
    // ---
    let Some(obj) = typed.as_object() else {
        return Value::Null;
    };

    if let Some(v) = obj.get("doubleValue") {
        // NaN and Infinity arrive as strings
        return match v {
            Value::Number(_) => v.clone(),
            _ => Value::Null,
        };
    }
    if let Some(v) = obj.get("integerValue") {
        return match v {
            Value::String(s) => s.parse::<i64>().map_or(Value::Null, Value::from),
            Value::Number(_) => v.clone(),
            _ => Value::Null,
        };
    }
    if let Some(v) = obj
        .get("timestampValue")
        .or_else(|| obj.get("stringValue"))
    {
        return v.clone();
    }
    if let Some(v) = obj.get("booleanValue") {
        return v.clone();
    }
    if let Some(map) = obj.get("mapValue") {
        return match map.get("fields") {
            Some(Value::Object(fields)) => Value::Object(flatten_fields(fields)),
            _ => Value::Object(Map::new()),
        };
    }
    if let Some(array) = obj.get("arrayValue") {
        let values = array
            .get("values")
            .and_then(Value::as_array)
            .map(|vs| vs.iter().map(flatten_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }

    Value::Null
}
