//! HTTP fetch implementation.

use super::{FetchError, MonitorSource};
use serde_json::Value;
use std::time::Duration;

/// Fetches monitor and lag payloads over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    monitor_url: String,
    lag_base_url: String,
}

impl HttpSource {
    /// Create a source. No timeout is applied unless one is given.
    pub fn new(monitor_url: &str, lag_base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            monitor_url: monitor_url.to_string(),
            lag_base_url: lag_base_url.to_string(),
        })
    }

    pub fn monitor_url(&self) -> &str {
        &self.monitor_url
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Network(format!("request to {} timed out", url))
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

impl MonitorSource for HttpSource {
    async fn fetch_primary(&self) -> Result<Value, FetchError> {
        self.get_json(&self.monitor_url).await
    }

    fn secondary_url(&self, index: u32) -> String {
        format!("{}{}", self.lag_base_url, index)
    }

    async fn fetch_secondary(&self, index: u32) -> Result<Value, FetchError> {
        let url = self.secondary_url(index);
        self.get_json(&url).await
    }
}
