//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use regex::Regex;

use bookdl::DEFAULT_CONCURRENCY;

/// Download paginated multi-chapter e-books and merge them into a single PDF.
///
/// The document is selected either by the landing-page link or directly by
/// its content id; exactly one of the two must be given.
#[derive(Parser, Debug)]
#[command(name = "bookdl")]
#[command(author, version, about)]
#[command(group = ArgGroup::new("selector").required(true).multiple(false))]
pub struct Args {
    /// Link to the document's landing page on the source site
    #[arg(short = 'l', long, value_name = "URL", group = "selector")]
    pub link: Option<String>,

    /// Content id of the document (the id segment of the landing link)
    #[arg(short = 'c', long = "content", value_name = "ID", group = "selector")]
    pub content: Option<String>,

    /// Only download the chapters; don't merge them into a single PDF
    #[arg(short = 'n', long)]
    pub no_merge: bool,

    /// Maximum concurrent downloads (1-20)
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=20))]
    pub concurrency: u8,

    /// Directory to save the final PDF to
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Extracts the canonical content id from a landing-page link.
///
/// Accepted form: `scheme://host/content/<id>/...` on the supported hosts,
/// where the id consists of lower-case latin characters, digits and hyphens.
/// Surrounding path and query are stripped.
///
/// # Panics
///
/// Panics if the static pattern fails to compile. This should never happen
/// in practice.
#[must_use]
pub fn content_id_from_link(link: &str) -> Option<String> {
    #[allow(clippy::expect_used)]
    let pattern = Regex::new(
        r"^(https?://)?(www\.)?springer(link)?\.(com|de)/(content|.*book)/(?P<id>[a-z0-9-]+)/?(\?[^/]*)?$",
    )
    .expect("static link pattern");
    pattern
        .captures(link)
        .and_then(|c| c.name("id"))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_a_selector() {
        let result = Args::try_parse_from(["bookdl"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_link_and_content_are_mutually_exclusive() {
        let result = Args::try_parse_from([
            "bookdl",
            "-l",
            "http://springerlink.com/content/abc123/",
            "-c",
            "abc123",
        ]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_content_selector_parses() {
        let args = Args::try_parse_from(["bookdl", "-c", "abc123"]).unwrap();
        assert_eq!(args.content.as_deref(), Some("abc123"));
        assert!(args.link.is_none());
        assert!(!args.no_merge);
        assert_eq!(args.concurrency, 7); // DEFAULT_CONCURRENCY
    }

    #[test]
    fn test_cli_no_merge_flag() {
        let args = Args::try_parse_from(["bookdl", "-c", "abc123", "-n"]).unwrap();
        assert!(args.no_merge);

        let args = Args::try_parse_from(["bookdl", "-c", "abc123", "--no-merge"]).unwrap();
        assert!(args.no_merge);
    }

    #[test]
    fn test_cli_concurrency_bounds() {
        let args = Args::try_parse_from(["bookdl", "-c", "x", "-j", "1"]).unwrap();
        assert_eq!(args.concurrency, 1);

        let args = Args::try_parse_from(["bookdl", "-c", "x", "-j", "20"]).unwrap();
        assert_eq!(args.concurrency, 20);

        let result = Args::try_parse_from(["bookdl", "-c", "x", "-j", "0"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["bookdl", "-c", "x", "-j", "21"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["bookdl", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_content_id_from_plain_content_link() {
        assert_eq!(
            content_id_from_link("http://springerlink.com/content/978-3-16-148410-0/").as_deref(),
            Some("978-3-16-148410-0")
        );
    }

    #[test]
    fn test_content_id_from_link_variants() {
        assert_eq!(
            content_id_from_link("https://www.springer.com/content/abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            content_id_from_link("springerlink.de/content/abc123?page=1").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            content_id_from_link("https://springer.com/us/book/abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_content_id_rejects_foreign_hosts() {
        assert_eq!(content_id_from_link("https://example.com/content/abc123"), None);
        assert_eq!(content_id_from_link("not a link"), None);
    }
}
