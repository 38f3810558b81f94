//! Status model types produced by one poll cycle.

use super::classify::StatusTier;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

pub const UNNAMED_SERVICE: &str = "Unnamed Service";
pub const UNKNOWN_STATUS: &str = "unknown";
pub const UNKNOWN_TOPIC: &str = "Unknown";
/// Description placeholder in the table view.
pub const TABLE_DESCRIPTION_FALLBACK: &str = "N/A";
/// Description placeholder in the card view.
pub const CARD_DESCRIPTION_FALLBACK: &str = "No details provided";

/// One service from the primary payload's `results` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub name: String,
    pub raw_status: String,
    pub tier: StatusTier,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl ServiceRecord {
    pub fn table_description(&self) -> &str {
        self.description.as_deref().unwrap_or(TABLE_DESCRIPTION_FALLBACK)
    }

    pub fn card_description(&self) -> &str {
        self.description.as_deref().unwrap_or(CARD_DESCRIPTION_FALLBACK)
    }
}

/// Lag reported by a secondary endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum LagValue {
    /// Value as sent by the endpoint, kept opaque.
    Reported(Value),
    /// The endpoint answered without a `lag` field.
    NotAvailable,
    /// The endpoint call failed.
    Error,
}

impl fmt::Display for LagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LagValue::Reported(Value::String(s)) => f.write_str(s),
            LagValue::Reported(v) => write!(f, "{}", v),
            LagValue::NotAvailable => f.write_str("N/A"),
            LagValue::Error => f.write_str("Error"),
        }
    }
}

impl Serialize for LagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LagValue::Reported(v) => v.serialize(serializer),
            LagValue::NotAvailable => serializer.serialize_str("N/A"),
            LagValue::Error => serializer.serialize_str("Error"),
        }
    }
}

/// One row of the lag table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagRecord {
    pub endpoint_index: u32,
    pub topic: String,
    pub lag: LagValue,
    pub succeeded: bool,
}

impl LagRecord {
    /// Placeholder record for a failed endpoint call.
    pub fn sentinel(endpoint_index: u32) -> Self {
        Self {
            endpoint_index,
            topic: format!("Endpoint {}", endpoint_index),
            lag: LagValue::Error,
            succeeded: false,
        }
    }
}

/// Raw response of a secondary call, or the error marker.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticResponse {
    Payload(Value),
    Error,
}

impl Serialize for DiagnosticResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DiagnosticResponse::Payload(v) => v.serialize(serializer),
            DiagnosticResponse::Error => serializer.serialize_str("Error"),
        }
    }
}

/// Debug information about one secondary call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEntry {
    pub endpoint_index: u32,
    pub url: String,
    pub response: DiagnosticResponse,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything one poll cycle produced.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationResult {
    pub overall_status: String,
    pub overall_tier: StatusTier,
    pub timestamp: Option<String>,
    pub services: Vec<ServiceRecord>,
    pub lag_entries: Vec<LagRecord>,
    pub diagnostics: Vec<DiagnosticEntry>,
    pub primary_fetch_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_error: Option<String>,
    pub polled_at: DateTime<Utc>,
}

impl AggregationResult {
    pub fn lag_success_count(&self) -> usize {
        self.lag_entries.iter().filter(|e| e.succeeded).count()
    }
}
