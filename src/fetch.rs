//! Upstream API client.
//!
//! Fetches the full record set from the configured upstream endpoint with a
//! bearer token. The client is side-effect free: replacing the store and
//! rewriting the tabular exports is the fetch handler's job, so an upstream
//! failure never disturbs existing state.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::store::Record;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status. `detail` carries the
    /// response body, parsed as JSON when possible, so the HTTP surface can
    /// echo it back to the caller.
    #[error("upstream API returned status {status}")]
    Upstream { status: u16, detail: Value },
    #[error("failed to reach upstream API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream response was not a JSON array of records: {0}")]
    Decode(serde_json::Error),
}

/// Client for the upstream record API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl UpstreamClient {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_url,
            api_key,
        }
    }

    /// GETs the configured endpoint and parses the body as a sequence of
    /// open-schema records. The record shapes are not validated beyond
    /// being JSON objects.
    pub async fn fetch_records(&self) -> Result<Vec<Record>, FetchError> {
        info!(url = %self.api_url, "Fetching records from upstream API");

        let response = self
            .http
            .get(&self.api_url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, url = %self.api_url, "Upstream API returned an error");
            let detail = serde_json::from_str(&body)
                .unwrap_or_else(|_| Value::String(body.clone()));
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let records: Vec<Record> = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to decode upstream response body");
            FetchError::Decode(e)
        })?;
        info!(count = records.len(), "Fetched records from upstream API");
        Ok(records)
    }
}
