//! Title-to-filename transliteration for the final artifact.
//!
//! The final PDF is named after the document title, reduced to an ASCII-safe
//! filename component. The `Transliterate` trait keeps this substitutable
//! (tests use fixed-name doubles; an external transliteration tool could be
//! slotted in without touching the pipeline).

/// Converts a title string to an ASCII-safe filename component.
pub trait Transliterate: Send + Sync {
    /// Returns the transliterated form of `value`, safe to use as a filename
    /// stem on common filesystems.
    fn transliterate(&self, value: &str) -> String;
}

/// Default transliterator: drops everything but ASCII alphanumerics, then
/// collapses whitespace/hyphen runs into single hyphens.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiSlug;

impl Transliterate for AsciiSlug {
    fn transliterate(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut pending_sep = false;
        for ch in value.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                if pending_sep && !out.is_empty() {
                    out.push('-');
                }
                out.push(ch);
                pending_sep = false;
            } else if ch.is_whitespace() || ch == '-' {
                pending_sep = true;
            }
            // Everything else (punctuation, non-ASCII) is dropped.
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_spaces_become_hyphens() {
        assert_eq!(
            AsciiSlug.transliterate("Pro Git Second Edition"),
            "Pro-Git-Second-Edition"
        );
    }

    #[test]
    fn test_slug_punctuation_dropped() {
        assert_eq!(
            AsciiSlug.transliterate("Algorithms, 4th ed.: a guide"),
            "Algorithms-4th-ed-a-guide"
        );
    }

    #[test]
    fn test_slug_runs_collapse() {
        assert_eq!(AsciiSlug.transliterate("a  - -  b"), "a-b");
    }

    #[test]
    fn test_slug_non_ascii_dropped() {
        assert_eq!(AsciiSlug.transliterate("Höhere Mathematik"), "Hhere-Mathematik");
    }

    #[test]
    fn test_slug_leading_trailing_separators_trimmed() {
        assert_eq!(AsciiSlug.transliterate("  spaced out  "), "spaced-out");
    }
}
