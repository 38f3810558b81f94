//! Fetch collaborators for the monitor and lag endpoints.

mod http;

pub use http::*;

use serde_json::Value;
use std::future::Future;
use thiserror::Error;

/// Fetch error types.
///
/// The aggregator treats every variant the same way; the split only matters
/// for logging and the debug view.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::Malformed(_))
    }

    /// Transport failures and non-2xx answers.
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Status(_))
    }
}


/// Source of raw monitor payloads.
///
/// Implementations own URL construction; callers only deal in 1-based
/// secondary indices.
pub trait MonitorSource {
    /// Fetch the overall health payload.
    fn fetch_primary(&self) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// URL used for the secondary endpoint at `index`.
    fn secondary_url(&self, index: u32) -> String;

    /// Fetch the lag payload of the secondary endpoint at `index`.
    fn fetch_secondary(&self, index: u32) -> impl Future<Output = Result<Value, FetchError>> + Send;
}
