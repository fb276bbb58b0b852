//! End-to-end run orchestration: discover, download, assemble.
//!
//! `run` is the library entry point the binary drives. It owns the staging
//! area for the whole sequence and guarantees its teardown: removed after a
//! successful merge, kept (with its path reported) in no-merge mode and on
//! assembly failure, removed best-effort on every fatal error path.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::assemble::{AssemblyError, AssemblyPipeline, ConfigError, Toolchain};
use crate::discover::{ChapterStatus, Discoverer, Document, PageExtractor};
use crate::download::{
    DownloadError, DownloadManager, HttpClient, ManagerError, ProgressCounters, ResourceRequest,
    ResourceState,
};
use crate::staging::StagingArea;

/// Content types a chapter download may declare.
const CHAPTER_CONTENT_TYPES: [&str; 1] = ["application/pdf"];

/// Content types a cover download may declare.
const COVER_CONTENT_TYPES: [&str; 3] = ["image/png", "image/gif", "image/jpeg"];

/// Parameters for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Scheme + host of the source service.
    pub base_url: Url,
    /// Canonical document identifier.
    pub content_id: String,
    /// Merge parts into one artifact (false = no-merge mode).
    pub merge: bool,
    /// Bounded download parallelism.
    pub concurrency: usize,
    /// Directory receiving the final artifact.
    pub output_dir: PathBuf,
}

/// Where the run's result ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutput {
    /// Single merged artifact at this path.
    Merged(PathBuf),
    /// No-merge mode: ordered parts left in this (kept) staging directory.
    Unmerged(PathBuf),
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Document title.
    pub title: String,
    /// Number of chapters downloaded.
    pub chapters: usize,
    /// Total bytes transferred.
    pub bytes: u64,
    /// Final location of the result.
    pub output: RunOutput,
}

/// Fatal run errors, each reported once with a non-zero exit.
#[derive(Debug, Error)]
pub enum RunError {
    /// Discovery failed (bad link, no title, no chapters, page fetch).
    #[error(transparent)]
    Discovery(#[from] crate::discover::DiscoveryError),

    /// A resource download failed (transport or content-type).
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Download manager misconfiguration or internal failure.
    #[error(transparent)]
    Manager(#[from] ManagerError),

    /// Startup configuration problem (missing tool, output collision).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Assembly failed; the unmerged parts were preserved.
    #[error("assembly failed ({source}); unmerged parts kept in {parts_dir}")]
    Assembly {
        /// The kept staging directory holding the parts.
        parts_dir: PathBuf,
        /// The underlying assembly error.
        #[source]
        source: AssemblyError,
    },

    /// File system failure outside download/assembly.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Runs the whole pipeline for one document.
///
/// # Errors
///
/// Returns [`RunError`] on any fatal condition; see the error type for the
/// taxonomy. The staging area is removed on all error paths except assembly
/// failure, where it is kept so the parts remain retrievable.
#[instrument(skip_all, fields(content_id = %options.content_id))]
pub async fn run(
    options: &RunOptions,
    client: &HttpClient,
    extractor: &dyn PageExtractor,
    tools: &Toolchain,
    counters: &Arc<ProgressCounters>,
) -> Result<RunSummary, RunError> {
    let staging = StagingArea::new().map_err(|e| RunError::Io {
        path: std::env::temp_dir(),
        source: e,
    })?;

    let discoverer = Discoverer::new(client, options.base_url.clone(), extractor);
    let mut document = discoverer.discover(&options.content_id, &staging).await?;
    info!(
        title = %document.title,
        chapters = document.chapters.len(),
        cover = document.cover.is_some(),
        "document discovered"
    );

    let output_path = options.output_dir.join(format!(
        "{}.pdf",
        tools.transliterator.transliterate(&document.title)
    ));
    if options.merge && output_path.exists() {
        return Err(ConfigError::OutputExists { path: output_path }.into());
    }

    let resources = build_resources(&document);
    let manager = DownloadManager::new(client.clone(), options.concurrency)?;
    let outcome = manager.fetch_all(&resources, counters).await?;

    apply_outcome(&mut document, &outcome.states);

    if let Some(error) = outcome.first_error {
        // Staging is dropped here; failed-run cleanup is best-effort.
        return Err(error.into());
    }

    let chapters = document.chapters.len();

    if !options.merge {
        let parts_dir = staging.keep();
        info!(parts_dir = %parts_dir.display(), "no-merge run complete; parts kept");
        return Ok(RunSummary {
            title: document.title,
            chapters,
            bytes: counters.transferred(),
            output: RunOutput::Unmerged(parts_dir),
        });
    }

    let pipeline = AssemblyPipeline::new(tools);

    let mut parts: Vec<PathBuf> = Vec::with_capacity(chapters + 1);
    if let Some(cover) = &document.cover {
        if cover.status == ChapterStatus::Succeeded {
            if let Some(cover_page) = pipeline
                .prepare_cover(&cover.path, &staging.cover_page_path())
                .await
            {
                parts.push(cover_page);
            }
        }
    }
    parts.extend(document.chapters.iter().map(|c| c.path.clone()));

    if let Err(source) = pipeline.assemble(&parts, &output_path).await {
        let parts_dir = staging.keep();
        return Err(RunError::Assembly { parts_dir, source });
    }

    if let Err(e) = staging.close() {
        // The artifact is complete; a lingering staging dir is only noise.
        warn!(error = %e, "failed to remove staging area after merge");
    }

    let bytes = tokio::fs::metadata(&output_path)
        .await
        .map(|m| m.len())
        .unwrap_or_else(|_| counters.transferred());

    info!(output = %output_path.display(), bytes, "run complete");

    Ok(RunSummary {
        title: document.title,
        chapters,
        bytes,
        output: RunOutput::Merged(output_path),
    })
}

/// Builds the run's resource set: cover first (when present), then chapters
/// in discovery order.
fn build_resources(document: &Document) -> Vec<ResourceRequest> {
    let mut resources = Vec::with_capacity(document.chapters.len() + 1);
    if let Some(cover) = &document.cover {
        resources.push(
            ResourceRequest::new(cover.url.clone(), cover.path.clone())
                .with_allowed_types(&COVER_CONTENT_TYPES),
        );
    }
    for chapter in &document.chapters {
        resources.push(
            ResourceRequest::new(chapter.url.clone(), chapter.path.clone())
                .with_allowed_types(&CHAPTER_CONTENT_TYPES),
        );
    }
    resources
}

/// Writes per-resource terminal states back onto the document, which retains
/// ownership of its chapters and cover throughout.
fn apply_outcome(document: &mut Document, states: &[ResourceState]) {
    let mut iter = states.iter();
    if let Some(cover) = document.cover.as_mut() {
        if let Some(state) = iter.next() {
            cover.status = chapter_status(*state);
        }
    }
    for chapter in &mut document.chapters {
        if let Some(state) = iter.next() {
            chapter.status = chapter_status(*state);
        }
    }
}

fn chapter_status(state: ResourceState) -> ChapterStatus {
    match state {
        ResourceState::Succeeded => ChapterStatus::Succeeded,
        ResourceState::Failed | ResourceState::Skipped => ChapterStatus::Failed,
    }
}
