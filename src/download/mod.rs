//! HTTP fetch layer: page retrieval and concurrent resource downloads.
//!
//! This module provides the streaming `HttpClient`, the semaphore-bounded
//! `DownloadManager`, and the shared `ProgressCounters` every worker reports
//! into.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Per-resource content-type allow-list validation
//! - Aggregate (transferred, total) byte accounting across workers
//! - Configurable timeouts (30s connect, 5min read by default)
//! - Structured error types with full context

mod client;
mod error;
mod manager;
mod progress;

pub use client::{BROWSER_USER_AGENT, CONNECT_TIMEOUT_SECS, HttpClient, READ_TIMEOUT_SECS};
pub use error::DownloadError;
pub use manager::{
    DEFAULT_CONCURRENCY, DownloadManager, FetchOutcome, ManagerError, ResourceRequest,
    ResourceState,
};
pub use progress::ProgressCounters;
