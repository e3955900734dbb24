//! CLI glue: argument parsing and the async entrypoint that wires
//! configuration into the HTTP server. Callable from `main` and from
//! integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::fetch::UpstreamClient;
use crate::server::{self, AppState};
use crate::store::DataStore;
use crate::upload::SharePointClient;

/// HTTP bridge between an upstream record API and a SharePoint library.
#[derive(Parser)]
#[clap(
    name = "sharebridge",
    version,
    about = "Fetch upstream records, snapshot them to CSV/XLSX, and publish the files to a SharePoint document library"
)]
pub struct Cli {
    /// Address to bind the HTTP server on
    #[clap(long, default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Directory where tabular exports are written
    #[clap(long, default_value = ".")]
    pub export_dir: PathBuf,
}

/// Extracted async entrypoint for main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    config.trace_loaded();

    let state = AppState {
        store: Arc::new(Mutex::new(DataStore::new())),
        fetcher: UpstreamClient::new(
            config.upstream_api_url.clone(),
            config.upstream_api_key.clone(),
        ),
        uploader: Arc::new(SharePointClient::new(&config)),
        export_dir: cli.export_dir,
    };

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, "HTTP server listening");

    axum::serve(listener, server::router(state))
        .await
        .context("HTTP server error")?;
    Ok(())
}
