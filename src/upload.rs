//! Document backend uploader.
//!
//! Defines the [`DocumentStore`] trait for pushing exported files into a
//! remote document library, plus the real SharePoint implementation. The
//! trait is annotated for `mockall` so the HTTP surface can be exercised in
//! tests without a live SharePoint tenant.
//!
//! The SharePoint session is not held for the process lifetime: an access
//! token is acquired on demand for each upload via the client-credentials
//! grant, using the id/secret from configuration. Uploads send the full
//! byte content in one request; there is no chunking and no retry.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to acquire SharePoint access token: {0}")]
    Token(String),
    #[error("SharePoint rejected the upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("failed to reach SharePoint: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Destination for exported files. Implemented by [`SharePointClient`] and
/// by generated mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upload the full byte content of a file into the configured library
    /// folder, overwriting any existing file with the same name.
    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<(), UploadError>;
}

/// Client for a SharePoint document library, authenticated with
/// client credentials.
pub struct SharePointClient {
    http: Client,
    site_url: String,
    client_id: String,
    client_secret: String,
    folder_url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl SharePointClient {
    pub fn new(config: &Config) -> Self {
        let folder_url = format!(
            "/sites/{}/Shared Documents/{}",
            config.sharepoint_site_name, config.sharepoint_doc_library
        );
        Self {
            http: Client::new(),
            site_url: config.sharepoint_site_url.clone(),
            client_id: config.sharepoint_client_id.clone(),
            client_secret: config.sharepoint_client_secret.clone(),
            folder_url,
        }
    }

    /// Client-credentials grant against the site's token endpoint.
    async fn acquire_token(&self) -> Result<String, UploadError> {
        let token_url = format!("{}/_api/oauth2/token", self.site_url);
        let response = self
            .http
            .post(&token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "SharePoint token request failed");
            return Err(UploadError::Token(format!("status {status}: {body}")));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Token(e.to_string()))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl DocumentStore for SharePointClient {
    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<(), UploadError> {
        let token = self.acquire_token().await?;
        let upload_url = format!(
            "{}/_api/web/GetFolderByServerRelativeUrl('{}')/Files/add(url='{}',overwrite=true)",
            self.site_url, self.folder_url, file_name
        );

        info!(
            file = file_name,
            bytes = content.len(),
            folder = %self.folder_url,
            "Uploading file to SharePoint"
        );
        let response = self
            .http
            .post(&upload_url)
            .bearer_auth(&token)
            .body(content)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, file = file_name, "SharePoint rejected the upload");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(file = file_name, "File uploaded to SharePoint");
        Ok(())
    }
}
