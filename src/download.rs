//! Concurrent file downloads with progress reporting
//!
//! Call `download::download_all(&client, &addresses, folder, &config).await`
//! with a `reqwest::Client` configured by the caller. At most
//! `config.concurrency` transfers run at once, and the call returns only
//! after every address has finished, one [`DownloadOutcome`] per address in
//! input order.

use std::path::{Path, PathBuf};

use futures::{stream, StreamExt};
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("No file name in address '{0}'")]
    NoFileName(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download configuration
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of simultaneous transfers
    pub concurrency: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl DownloadConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Result for one requested address
#[derive(Debug)]
pub struct DownloadOutcome {
    pub address: String,
    pub result: Result<PathBuf, DownloadError>,
}

impl DownloadOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Bytes received so far against the announced length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub total: Option<u64>,
    pub current: u64,
}

impl Progress {
    pub fn new(total: Option<u64>) -> Self {
        Self { total, current: 0 }
    }

    pub fn advance(&mut self, bytes: u64) {
        self.current += bytes;
    }

    /// Percentage complete, `None` when the length is unknown
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(100.0),
            Some(total) => Some(self.current as f64 * 100.0 / total as f64),
            None => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.current >= total)
    }
}

/// Last non-empty path segment of `address`
pub fn file_name_from_url(address: &str) -> Result<String, DownloadError> {
    let url = Url::parse(address).map_err(|e| DownloadError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| DownloadError::NoFileName(address.to_string()))
}

/// Download every address into `folder`, bounded by `config.concurrency`
pub async fn download_all(
    client: &Client,
    addresses: &[String],
    folder: &Path,
    config: &DownloadConfig,
) -> Vec<DownloadOutcome> {
    stream::iter(addresses.iter().cloned())
        .map(|address| async move {
            let result = download_file(client, &address, folder).await;
            if let Err(e) = &result {
                warn!(address = %address, error = %e, "download failed");
            }
            DownloadOutcome { address, result }
        })
        .buffered(config.concurrency.max(1))
        .collect()
        .await
}

/// Stream one address to `<folder>/<file name>`
#[instrument(level = "debug", skip(client, folder))]
pub async fn download_file(
    client: &Client,
    address: &str,
    folder: &Path,
) -> Result<PathBuf, DownloadError> {
    let file_name = file_name_from_url(address)?;
    let path = folder.join(&file_name);

    let mut response = client.get(address).send().await?.error_for_status()?;
    let mut file = tokio::fs::File::create(&path).await?;
    let mut progress = Progress::new(response.content_length());
    let mut last_decile = 0u64;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        progress.advance(chunk.len() as u64);

        if let Some(percent) = progress.percent() {
            let decile = (percent / 10.0) as u64;
            if decile > last_decile {
                last_decile = decile;
                debug!(file = %file_name, percent, "download progress");
            }
        }
    }
    file.flush().await?;

    info!(path = %path.display(), bytes = progress.current, "download complete");
    Ok(path)
}
