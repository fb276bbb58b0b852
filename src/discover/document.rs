//! Data model for a discovered document and its downloadable parts.

use std::path::PathBuf;

/// Terminal status of one downloadable part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterStatus {
    /// Created during discovery, not yet downloaded.
    Pending,
    /// Downloaded to its staging destination.
    Succeeded,
    /// Download failed.
    Failed,
}

/// One retrievable unit of the document.
///
/// `index` is assigned at discovery time, in page order across all listing
/// pages, and is immutable: it alone defines the final assembly order,
/// regardless of download completion order.
#[derive(Debug, Clone)]
pub struct Chapter {
    /// Source URL of the chapter file.
    pub url: String,
    /// Zero-based discovery index.
    pub index: usize,
    /// Destination path within the staging area.
    pub path: PathBuf,
    /// Terminal status, mutated only by this chapter's own download outcome.
    pub status: ChapterStatus,
}

impl Chapter {
    /// Creates a pending chapter at the given discovery index.
    #[must_use]
    pub fn new(url: impl Into<String>, index: usize, path: PathBuf) -> Self {
        Self {
            url: url.into(),
            index,
            path,
            status: ChapterStatus::Pending,
        }
    }
}

/// The optional cover image: same shape as a chapter but logically first in
/// assembly order, and converted to page format before inclusion.
#[derive(Debug, Clone)]
pub struct CoverResource {
    /// Source URL of the cover image.
    pub url: String,
    /// Destination path of the raw image within the staging area.
    pub path: PathBuf,
    /// Terminal status of the cover download.
    pub status: ChapterStatus,
}

impl CoverResource {
    /// Creates a pending cover resource.
    #[must_use]
    pub fn new(url: impl Into<String>, path: PathBuf) -> Self {
        Self {
            url: url.into(),
            path,
            status: ChapterStatus::Pending,
        }
    }
}

/// The multi-part work being retrieved.
///
/// The chapter sequence is append-only during discovery and frozen before
/// download begins; the title is non-empty once discovery succeeds.
#[derive(Debug)]
pub struct Document {
    /// Stable identifier extracted from the landing URL.
    pub content_id: String,
    /// Display title, HTML tags stripped.
    pub title: String,
    /// Optional subtitle.
    pub subtitle: Option<String>,
    /// Ordered chapter sequence.
    pub chapters: Vec<Chapter>,
    /// Optional cover image resource.
    pub cover: Option<CoverResource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_starts_pending() {
        let chapter = Chapter::new("https://example.com/0.pdf", 0, PathBuf::from("/tmp/0.pdf"));
        assert_eq!(chapter.status, ChapterStatus::Pending);
        assert_eq!(chapter.index, 0);
    }
}
