//! Page-extraction seam: pulls metadata and links out of listing-page markup.
//!
//! The discoverer is deliberately ignorant of any one site's HTML grammar;
//! it consumes a `PageExtractor` supplied by the caller. The default
//! `SpringerExtractor` understands the SpringerLink markup the tool was built
//! for; tests substitute fixture extractors.

use regex::Regex;

/// Metadata extracted from a document's landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    /// Document title, tags stripped, non-empty.
    pub title: String,
    /// Optional subtitle.
    pub subtitle: Option<String>,
    /// Content id of the cover image, when the page advertises one.
    pub cover_id: Option<String>,
}

/// Extracts chapter links, pagination links, and document metadata from raw
/// page markup.
pub trait PageExtractor: Send + Sync {
    /// Extracts the document title, subtitle, and cover id from the landing
    /// page. Returns `None` when no non-empty title can be found.
    fn metadata(&self, page: &str) -> Option<PageMetadata>;

    /// Returns every chapter-file link on the page, in page order, exactly as
    /// written in the markup (relative or absolute).
    fn chapter_links(&self, page: &str) -> Vec<String>;

    /// Returns the "next page" link when the page links to a further listing.
    fn next_page_link(&self, page: &str) -> Option<String>;
}

/// Default extractor for SpringerLink-shaped listing markup.
#[derive(Debug)]
pub struct SpringerExtractor {
    title: Regex,
    tag: Regex,
    cover: Regex,
    chapter: Regex,
    next: Regex,
}

impl Default for SpringerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SpringerExtractor {
    /// Compiles the extraction patterns.
    ///
    /// # Panics
    ///
    /// Panics if a static pattern fails to compile. This should never happen
    /// in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            title: Regex::new(
                r#"(?s)<h1[^<]+class="title">(.+?)(?:<br/>\s*<span class="subtitle">(.+?)</span>\s*)?</h1>"#,
            )
            .expect("static title pattern"),
            tag: Regex::new(r"<[^>]*?>").expect("static tag pattern"),
            cover: Regex::new(
                r#"<div class="coverImage" title="Cover Image" style="background-image: url\(/content/([^/]+)/cover-medium\.gif\)">"#,
            )
            .expect("static cover pattern"),
            chapter: Regex::new(r#"href="([^"]+\.pdf)""#).expect("static chapter pattern"),
            next: Regex::new(r##"<a href="([^"#]+)"[^>]*>Next</a>"##).expect("static next pattern"),
        }
    }
}

impl PageExtractor for SpringerExtractor {
    fn metadata(&self, page: &str) -> Option<PageMetadata> {
        let captures = self.title.captures(page)?;

        let raw_title = captures.get(1).map(|m| m.as_str().trim())?;
        // Markup like <sub> can appear inside the heading.
        let title = self.tag.replace_all(raw_title, "").trim().to_string();
        if title.is_empty() {
            return None;
        }

        let subtitle = captures
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        let cover_id = self
            .cover
            .captures(page)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        Some(PageMetadata {
            title,
            subtitle,
            cover_id,
        })
    }

    fn chapter_links(&self, page: &str) -> Vec<String> {
        self.chapter
            .captures_iter(page)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn next_page_link(&self, page: &str) -> Option<String> {
        self.next
            .captures(page)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LANDING: &str = r#"
        <h1 lang="en" class="title">Pro Git<br/>
        <span class="subtitle">Everything distributed</span>
        </h1>
        <div class="coverImage" title="Cover Image" style="background-image: url(/content/abc123/cover-medium.gif)">
        <a href="front-matter.pdf">Front Matter</a>
        <a href="fulltext1.pdf">Chapter 1</a>
        <a href="https://elsewhere.example.com/external.pdf">External</a>
        <a href="/content/xyz/fulltext2.pdf">Chapter 2</a>
        <a href="?o=20" title="next page">Next</a>
    "#;

    #[test]
    fn test_metadata_title_subtitle_and_cover() {
        let extractor = SpringerExtractor::new();
        let meta = extractor.metadata(LANDING).unwrap();
        assert_eq!(meta.title, "Pro Git");
        assert_eq!(meta.subtitle.as_deref(), Some("Everything distributed"));
        assert_eq!(meta.cover_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_metadata_strips_inline_tags_from_title() {
        let extractor = SpringerExtractor::new();
        let page = r#"<h1 lang="en" class="title">CO<sub>2</sub> Capture</h1>"#;
        let meta = extractor.metadata(page).unwrap();
        assert_eq!(meta.title, "CO2 Capture");
        assert_eq!(meta.subtitle, None);
    }

    #[test]
    fn test_metadata_missing_title_is_none() {
        let extractor = SpringerExtractor::new();
        assert!(extractor.metadata("<html><body>nothing</body></html>").is_none());
        assert!(
            extractor
                .metadata(r#"<h1 lang="en" class="title">   </h1>"#)
                .is_none()
        );
    }

    #[test]
    fn test_chapter_links_in_page_order() {
        let extractor = SpringerExtractor::new();
        let links = extractor.chapter_links(LANDING);
        assert_eq!(
            links,
            vec![
                "front-matter.pdf",
                "fulltext1.pdf",
                "https://elsewhere.example.com/external.pdf",
                "/content/xyz/fulltext2.pdf",
            ]
        );
    }

    #[test]
    fn test_next_page_link_found() {
        let extractor = SpringerExtractor::new();
        assert_eq!(extractor.next_page_link(LANDING).as_deref(), Some("?o=20"));
    }

    #[test]
    fn test_next_page_link_absent_on_final_page() {
        let extractor = SpringerExtractor::new();
        assert_eq!(
            extractor.next_page_link(r#"<a href="last.pdf">Chapter</a>"#),
            None
        );
    }
}
