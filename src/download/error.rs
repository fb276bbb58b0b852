//! Error types for the download module.
//!
//! This module defines structured errors for page and resource fetches,
//! providing context-rich error messages for debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching pages or downloading resources.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response's declared content type is not in the resource's allow-list.
    ///
    /// A wrong content type usually means the resource is not actually
    /// downloadable content, e.g. an access-denied HTML page served with 200.
    #[error("unexpected content type for {url}: expected one of {expected:?}, got {actual:?}")]
    ContentType {
        /// The URL whose response failed validation.
        url: String,
        /// The allow-list the resource was declared with.
        expected: Vec<String>,
        /// The content type the server declared, if any.
        actual: Option<String>,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a content-type mismatch error.
    pub fn content_type(
        url: impl Into<String>,
        expected: Vec<String>,
        actual: Option<String>,
    ) -> Self {
        Self::ContentType {
            url: url.into(),
            expected,
            actual,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or `From<std::io::Error>`
// because our error variants require context (url, path) that the source errors
// don't provide. The helper constructor methods are the correct pattern here.
