//! Pagination-driven chapter discovery.
//!
//! Walks a document's listing pages from the landing URL, classifying and
//! filtering chapter links page by page until no "next" link remains. The
//! walk is an explicit loop (not recursion) so arbitrarily long listings
//! cannot grow the call stack.

use tracing::{debug, info, instrument};
use url::Url;

use super::document::{Chapter, CoverResource, Document};
use super::error::DiscoveryError;
use super::extractor::PageExtractor;
use crate::download::{DownloadError, HttpClient};
use crate::staging::StagingArea;

/// A back-matter link is suppressed while fewer than this many chapters have
/// been collected. Guards against a spurious lone "back matter" page being
/// mistaken for the whole document. Policy constant preserved from the
/// original tool, not re-derived.
const BACK_MATTER_MIN_CHAPTERS: usize = 2;

/// Link-name markers for structurally special parts.
const FRONT_MATTER_MARKER: &str = "front-matter.pdf";
const BACK_MATTER_MARKER: &str = "back-matter.pdf";

/// Walks pagination links and produces an ordered, deduplicated chapter
/// sequence for one document.
pub struct Discoverer<'a> {
    client: &'a HttpClient,
    base: Url,
    extractor: &'a dyn PageExtractor,
}

impl<'a> Discoverer<'a> {
    /// Creates a discoverer rooted at `base` (scheme + host of the source
    /// service).
    #[must_use]
    pub fn new(client: &'a HttpClient, base: Url, extractor: &'a dyn PageExtractor) -> Self {
        Self {
            client,
            base,
            extractor,
        }
    }

    /// Discovers the document identified by `content_id`.
    ///
    /// Fetches the landing page for metadata, then iterates listing pages,
    /// appending chapters in page order with monotonically increasing
    /// indices. Destination paths are assigned inside `staging`.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::Metadata`] when the landing page yields no title
    /// - [`DiscoveryError::NoChapters`] when pagination is exhausted without
    ///   a single chapter link
    /// - [`DiscoveryError::Transport`] when any page fetch fails
    #[instrument(skip(self, staging), fields(content_id = %content_id))]
    pub async fn discover(
        &self,
        content_id: &str,
        staging: &StagingArea,
    ) -> Result<Document, DiscoveryError> {
        let landing = self.join(&format!("content/{content_id}/contents"))?;
        let mut page = self.client.fetch_page(landing.as_str()).await?;

        let metadata = self
            .extractor
            .metadata(&page)
            .ok_or_else(|| DiscoveryError::Metadata {
                url: landing.to_string(),
            })?;
        debug!(title = %metadata.title, "landing page metadata extracted");

        let cover = match metadata.cover_id.as_deref() {
            Some(cover_id) => {
                let url = self.join(&format!("content/{cover_id}/cover-large.gif"))?;
                Some(CoverResource::new(url, staging.cover_image_path()))
            }
            None => None,
        };

        let mut chapters: Vec<Chapter> = Vec::new();
        let mut front_matter_seen = false;

        loop {
            let next_link = self.extractor.next_page_link(&page);

            for link in self.extractor.chapter_links(&page) {
                // Absolute links point off-site; they are not chapters.
                if link.starts_with("http://") || link.starts_with("https://") {
                    debug!(link = %link, "skipping external link");
                    continue;
                }

                // Front matter recurs in repeated headers/footers; keep the
                // first occurrence only.
                if link.contains(FRONT_MATTER_MARKER) {
                    if front_matter_seen {
                        continue;
                    }
                    front_matter_seen = true;
                }

                // Back matter recurs verbatim on the final page; count it
                // there, and never let it stand in for a whole document.
                if link.contains(BACK_MATTER_MARKER)
                    && (next_link.is_some() || chapters.len() < BACK_MATTER_MIN_CHAPTERS)
                {
                    debug!(link = %link, "suppressing back-matter link");
                    continue;
                }

                let resolved = self.resolve_chapter_link(content_id, &link)?;
                let index = chapters.len();
                chapters.push(Chapter::new(resolved, index, staging.chapter_path(index)));
            }

            match next_link {
                Some(href) => {
                    let next = self.join(&href.replace("&amp;", "&"))?;
                    debug!(url = %next, "following next-page link");
                    page = self.client.fetch_page(next.as_str()).await?;
                }
                None => break,
            }
        }

        if chapters.is_empty() {
            return Err(DiscoveryError::NoChapters {
                url: landing.to_string(),
            });
        }

        info!(chapters = chapters.len(), "discovery complete");

        Ok(Document {
            content_id: content_id.to_string(),
            title: metadata.title,
            subtitle: metadata.subtitle,
            chapters,
            cover,
        })
    }

    /// Resolves a relative chapter link to an absolute URL.
    ///
    /// Root-relative links resolve against the host; other relative links
    /// resolve against the document's own base path. `..`-style segments
    /// collapse during resolution.
    fn resolve_chapter_link(
        &self,
        content_id: &str,
        link: &str,
    ) -> Result<String, DiscoveryError> {
        let resolved = if link.starts_with('/') {
            self.join(link)?
        } else {
            self.join(&format!("content/{content_id}/"))?
                .join(link)
                .map_err(|_| DownloadError::invalid_url(link))?
        };
        Ok(resolved.to_string())
    }

    fn join(&self, relative: &str) -> Result<Url, DiscoveryError> {
        Ok(self
            .base
            .join(relative)
            .map_err(|_| DownloadError::invalid_url(relative))?)
    }
}
