#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Downloader: fetches the remote package index and versioned artifact
//! archives over HTTPS. Runs in-process via `reqwest`, mirroring the
//! network layer used throughout the pack this crate was grounded on;
//! hashing and verification stay in `spm-hash`, not here.

use futures::StreamExt;
use spm_errors::{Error, NetworkError};
use spm_events::{Event, EventEmitter, EventSender};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A thin wrapper around a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct NetClient {
    client: reqwest::Client,
}

impl NetClient {
    /// # Errors
    ///
    /// Returns an error if the underlying TLS/client configuration
    /// cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Default for NetClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(60)).expect("default reqwest client")
    }
}

/// Fetch the index document as text (spec §6: "served over HTTPS from a
/// fixed URL").
///
/// # Errors
///
/// Returns [`NetworkError::IndexFetchFailed`] on transport or status
/// errors.
pub async fn fetch_index_text(client: &NetClient, url: &str) -> Result<String, Error> {
    let response = client
        .client
        .get(url)
        .send()
        .await
        .map_err(|e| NetworkError::IndexFetchFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(NetworkError::HttpStatus {
            status: response.status().as_u16(),
            message: response.status().to_string(),
        }
        .into());
    }

    response
        .text()
        .await
        .map_err(|e| NetworkError::IndexFetchFailed(e.to_string()).into())
}

/// Download `url` into `dest`, streaming to disk (spec §4.7 step b).
///
/// # Errors
///
/// Returns [`NetworkError::DownloadFailed`] on transport, status, or I/O
/// errors.
pub async fn download_to_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    events: Option<&EventSender>,
) -> Result<u64, Error> {
    let response = client
        .client
        .get(url)
        .send()
        .await
        .map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(NetworkError::HttpStatus {
            status: response.status().as_u16(),
            message: response.status().to_string(),
        }
        .into());
    }

    let content_length = response.content_length();
    events.emit(Event::DownloadStarted {
        url: url.to_string(),
        size: content_length,
    });

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        events.emit(Event::DownloadProgress {
            url: url.to_string(),
            downloaded,
            total: content_length,
        });
    }
    file.flush().await?;
    debug!(url, downloaded, "download complete");
    events.emit(Event::DownloadFinished { url: url.to_string() });

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_default_timeout() {
        let client = NetClient::new(Duration::from_secs(30));
        assert!(client.is_ok());
    }
}
