//! Service configuration, loaded from the environment.
//!
//! All variables are required and there are no defaults: a missing variable
//! fails startup with a message naming it. Secrets (client secret, API key)
//! are never logged.

use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub sharepoint_site_url: String,
    pub sharepoint_client_id: String,
    pub sharepoint_client_secret: String,
    pub sharepoint_site_name: String,
    pub sharepoint_doc_library: String,
    pub upstream_api_key: String,
    pub upstream_api_url: String,
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set in the environment"))
}

impl Config {
    /// Reads all required variables. Call `dotenvy::dotenv()` beforehand if
    /// a `.env` file should be honored.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            sharepoint_site_url: require("SHAREPOINT_SITE_URL")?
                .trim_end_matches('/')
                .to_string(),
            sharepoint_client_id: require("SHAREPOINT_CLIENT_ID")?,
            sharepoint_client_secret: require("SHAREPOINT_CLIENT_SECRET")?,
            sharepoint_site_name: require("SHAREPOINT_SITE_NAME")?,
            sharepoint_doc_library: require("SHAREPOINT_DOC_LIBRARY")?,
            upstream_api_key: require("UPSTREAM_API_KEY")?,
            upstream_api_url: require("UPSTREAM_API_URL")?,
        })
    }

    pub fn trace_loaded(&self) {
        info!(
            site_url = %self.sharepoint_site_url,
            site_name = %self.sharepoint_site_name,
            doc_library = %self.sharepoint_doc_library,
            upstream_url = %self.upstream_api_url,
            "Loaded Config"
        );
    }
}
