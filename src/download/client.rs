//! HTTP client wrapper for fetching listing pages and streaming resources.
//!
//! This module provides the `HttpClient` struct which handles page fetches
//! and streaming resource downloads with proper timeout configuration,
//! content-type validation, and shared progress accounting.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;
use super::progress::ProgressCounters;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Browser-like User-Agent sent on every request.
///
/// The source service rejects unidentified clients, so both listing-page
/// fetches and resource downloads identify as a regular browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// HTTP client for page fetches and streaming resource downloads.
///
/// This client is designed to be created once and reused for every fetch in
/// a run, taking advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes (for large files)
    /// - Gzip decompression: enabled
    /// - Browser-like User-Agent on every request
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .read_timeout(std::time::Duration::from_secs(read_timeout_secs))
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches a listing or landing page and returns its body as text.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the request fails
    /// (network error, timeout), or the server returns an error status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.send_get(url).await?;
        response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))
    }

    /// Streams a resource to `dest`, validating content type and reporting
    /// progress.
    ///
    /// Behavior per resource:
    /// - The declared `Content-Length`, when present, is added to the shared
    ///   expected total before streaming begins.
    /// - When `allowed_types` is supplied, the response's declared content
    ///   type (MIME essence, parameters stripped) must be in the list;
    ///   a mismatch or absent header fails with
    ///   [`DownloadError::ContentType`].
    /// - The body is streamed in chunks to `dest`; the shared transferred
    ///   counter is bumped after every chunk.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the request fails, the
    /// server returns an error status, content-type validation fails, or
    /// writing to disk fails. On failure the partial file at `dest` is
    /// removed.
    #[instrument(skip(self, counters), fields(url = %url, dest = %dest.display()))]
    pub async fn fetch_resource(
        &self,
        url: &str,
        dest: &Path,
        allowed_types: Option<&[String]>,
        counters: &ProgressCounters,
    ) -> Result<u64, DownloadError> {
        let response = self.send_get(url).await?;

        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if let Some(length) = content_length {
            counters.add_expected(length);
        } else {
            debug!("no declared content length; total stays partial");
        }

        let declared_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| mime_essence(v).to_string());

        if let Some(allowed) = allowed_types {
            let matches = declared_type
                .as_deref()
                .is_some_and(|actual| allowed.iter().any(|t| t.eq_ignore_ascii_case(actual)));
            if !matches {
                return Err(DownloadError::content_type(
                    url,
                    allowed.to_vec(),
                    declared_type,
                ));
            }
        }

        debug!(
            content_length = ?content_length,
            content_type = ?declared_type,
            "streaming resource"
        );

        let file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;

        let stream_result = stream_to_file(file, response, url, dest, counters).await;

        if stream_result.is_err() {
            // Drop the partial file so a failed resource never reaches assembly.
            let _ = tokio::fs::remove_file(dest).await;
        }

        let bytes_written = stream_result?;

        info!(bytes = bytes_written, "resource download complete");
        Ok(bytes_written)
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        // Validate URL before handing it to reqwest for a clearer error.
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        if !response.status().is_success() {
            return Err(DownloadError::http_status(url, response.status().as_u16()));
        }

        Ok(response)
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Streams the response body to `file`, returning bytes written.
///
/// The shared transferred counter is bumped after every chunk so progress is
/// observable while other workers are mid-stream.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    dest: &Path,
    counters: &ProgressCounters,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;

        bytes_written += chunk.len() as u64;
        counters.add_transferred(chunk.len() as u64);
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(dest, e))?;

    Ok(bytes_written)
}

/// Strips MIME parameters (`; charset=...`) and surrounding whitespace.
fn mime_essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}
