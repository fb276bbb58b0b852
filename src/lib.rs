//! bookdl core library
//!
//! This library implements the pipeline behind the `bookdl` tool, which
//! discovers the paginated table of contents of a multi-chapter online
//! document, downloads every chapter and the cover image concurrently, and
//! assembles the parts into one ordered PDF.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`discover`] - pagination walk, link classification, document model
//! - [`download`] - streaming HTTP client, bounded-concurrency manager,
//!   shared progress counters
//! - [`assemble`] - external-tool merge pipeline and toolchain discovery
//! - [`staging`] - per-run temporary working directory
//! - [`filename`] - title transliteration for the output artifact
//! - [`runlog`] - append-only run journal
//! - [`run`] - end-to-end orchestration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assemble;
pub mod discover;
pub mod download;
pub mod filename;
pub mod run;
pub mod runlog;
pub mod staging;

// Re-export commonly used types
pub use assemble::{AssemblyError, AssemblyPipeline, ConfigError, Toolchain};
pub use discover::{
    Chapter, ChapterStatus, CoverResource, Discoverer, DiscoveryError, Document, PageExtractor,
    SpringerExtractor,
};
pub use download::{
    DEFAULT_CONCURRENCY, DownloadError, DownloadManager, FetchOutcome, HttpClient, ManagerError,
    ProgressCounters, ResourceRequest, ResourceState,
};
pub use filename::{AsciiSlug, Transliterate};
pub use run::{RunError, RunOptions, RunOutput, RunSummary, run};
pub use runlog::RunLog;
pub use staging::StagingArea;
