//! Poll-cycle aggregation.
//!
//! Runs one primary fetch and `endpoint_count` secondary fetches, strictly in
//! sequence, and normalizes whatever comes back into an [`AggregationResult`].
//! Fetch failures become sentinel records; nothing here returns an error.

use super::classify::StatusTier;
use super::models::*;
use crate::fetch::{FetchError, MonitorSource};

use chrono::Utc;
use serde_json::{Map, Value};

/// Run one poll cycle.
pub async fn aggregate<S: MonitorSource>(source: &S, endpoint_count: u32) -> AggregationResult {
    aggregate_with_progress(source, endpoint_count, |_, _| {}).await
}

/// Run one poll cycle, calling `on_progress(completed, total)` after each
/// secondary fetch. Secondary indices are visited in ascending order.
pub async fn aggregate_with_progress<S, F>(
    source: &S,
    endpoint_count: u32,
    mut on_progress: F,
) -> AggregationResult
where
    S: MonitorSource,
    F: FnMut(u32, u32),
{
    let polled_at = Utc::now();

    let mut result = AggregationResult {
        overall_status: UNKNOWN_STATUS.to_string(),
        overall_tier: StatusTier::Unknown,
        timestamp: None,
        services: Vec::new(),
        lag_entries: Vec::new(),
        diagnostics: Vec::new(),
        primary_fetch_failed: false,
        primary_raw: None,
        primary_error: None,
        polled_at,
    };

    match source.fetch_primary().await.and_then(require_object) {
        Ok(payload) => {
            if let Value::Object(fields) = &payload {
                apply_primary(&mut result, fields);
            }
            result.primary_raw = Some(payload);
        }
        Err(e) => {
            if e.is_network() {
                tracing::warn!("Monitor endpoint unreachable: {}", e);
            } else {
                tracing::warn!("Monitor endpoint returned unusable data: {}", e);
            }
            result.primary_fetch_failed = true;
            result.primary_error = Some(e.to_string());
        }
    }

    // Lag endpoints are polled regardless of the primary outcome.
    for index in 1..=endpoint_count {
        let url = source.secondary_url(index);
        let outcome = source.fetch_secondary(index).await.and_then(require_lag_payload);

        let (record, entry) = match outcome {
            Ok(payload) => {
                let record = normalize_lag(index, &payload);
                let entry = DiagnosticEntry {
                    endpoint_index: index,
                    url,
                    response: DiagnosticResponse::Payload(payload),
                    message: format!("Endpoint {} OK", index),
                    error: None,
                };
                (record, entry)
            }
            Err(e) => {
                if e.is_malformed() {
                    tracing::warn!("Lag endpoint {} ({}) returned unusable data: {}", index, url, e);
                } else {
                    tracing::warn!("Lag endpoint {} ({}) failed: {}", index, url, e);
                }
                let entry = DiagnosticEntry {
                    endpoint_index: index,
                    url,
                    response: DiagnosticResponse::Error,
                    message: format!("Endpoint {} returned error", index),
                    error: Some(e.to_string()),
                };
                (LagRecord::sentinel(index), entry)
            }
        };

        result.lag_entries.push(record);
        result.diagnostics.push(entry);
        on_progress(index, endpoint_count);
    }

    tracing::info!(
        "Poll cycle complete: status {} ({}), {} services, {}/{} lag endpoints OK",
        result.overall_status,
        result.overall_tier,
        result.services.len(),
        result.lag_success_count(),
        endpoint_count
    );

    result
}

fn apply_primary(result: &mut AggregationResult, fields: &Map<String, Value>) {
    result.overall_status = text_of(fields.get("status")).unwrap_or_else(|| UNKNOWN_STATUS.to_string());
    result.overall_tier = StatusTier::classify_value(fields.get("status"));
    result.timestamp = text_of(fields.get("timestamp"));
    result.services = fields
        .get("results")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(normalize_service).collect())
        .unwrap_or_default();
}

/// Build a service record from one element of `results`.
pub fn normalize_service(item: &Value) -> ServiceRecord {
    let field = |key: &str| item.as_object().and_then(|o| o.get(key));

    let tags = field("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .map(|t| match t {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    ServiceRecord {
        name: text_of(field("name")).unwrap_or_else(|| UNNAMED_SERVICE.to_string()),
        raw_status: text_of(field("status")).unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
        tier: StatusTier::classify_value(field("status")),
        description: text_of(field("description")).filter(|d| !d.is_empty()),
        tags,
    }
}

fn normalize_lag(index: u32, payload: &Value) -> LagRecord {
    let lag = match payload.get("lag") {
        None | Some(Value::Null) => LagValue::NotAvailable,
        Some(v) => LagValue::Reported(v.clone()),
    };

    LagRecord {
        endpoint_index: index,
        topic: text_of(payload.get("topic")).unwrap_or_else(|| UNKNOWN_TOPIC.to_string()),
        lag,
        succeeded: true,
    }
}

/// Render a JSON field as display text. Null counts as absent.
fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn require_object(payload: Value) -> Result<Value, FetchError> {
    match payload {
        Value::Object(_) => Ok(payload),
        other => Err(FetchError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn require_lag_payload(payload: Value) -> Result<Value, FetchError> {
    match &payload {
        Value::Object(fields) if fields.is_empty() => {
            Err(FetchError::Malformed("empty response".to_string()))
        }
        _ => require_object(payload),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
