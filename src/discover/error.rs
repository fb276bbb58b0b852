//! Error types for chapter discovery.

use thiserror::Error;

use crate::download::DownloadError;

/// Errors that can occur while walking a document's listing pages.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The landing page yielded no usable document title.
    #[error("could not evaluate document title - bad link {url}?")]
    Metadata {
        /// The landing page URL.
        url: String,
    },

    /// Pagination was exhausted without collecting a single chapter.
    #[error("no chapters found at {url} - bad link?")]
    NoChapters {
        /// The landing page URL.
        url: String,
    },

    /// Transport failure while fetching the landing page or a listing page.
    /// Fatal to the whole run; there is no partial discovery retry.
    #[error(transparent)]
    Transport(#[from] DownloadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_error_display() {
        let error = DiscoveryError::Metadata {
            url: "https://example.com/content/x/contents".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("title"), "Expected 'title' in: {msg}");
        assert!(msg.contains("content/x"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_no_chapters_error_display() {
        let error = DiscoveryError::NoChapters {
            url: "https://example.com/content/x/contents".to_string(),
        };
        assert!(error.to_string().contains("no chapters found"));
    }
}
