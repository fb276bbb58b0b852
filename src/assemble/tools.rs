//! External tool seams: concatenation, cover conversion, transliteration.
//!
//! Third-party binaries are wrapped behind narrow traits so the pipeline
//! stays decoupled from any specific tool and tests can substitute doubles.
//! Discovery happens once at startup via PATH lookup; absence of a required
//! tool is a configuration error raised before any download work begins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::error::{AssemblyError, ConfigError};
use crate::filename::{AsciiSlug, Transliterate};

/// Merges an ordered list of input files into one output file.
#[async_trait]
pub trait Concatenator: Send + Sync {
    /// Concatenates `inputs`, in order, into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError`] if the tool cannot be launched or exits
    /// with a failure status.
    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), AssemblyError>;

    /// Tool name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Converts an image file to the output's native page format.
#[async_trait]
pub trait PageConverter: Send + Sync {
    /// Converts `src` into a page-formatted file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError`] if the tool cannot be launched or exits
    /// with a failure status.
    async fn convert(&self, src: &Path, dest: &Path) -> Result<(), AssemblyError>;
}

/// `pdftk <inputs...> cat output <out>`
pub struct PdftkConcatenator {
    binary: PathBuf,
}

impl PdftkConcatenator {
    /// Attempts to find pdftk in PATH.
    #[must_use]
    pub fn from_path() -> Option<Self> {
        which::which("pdftk").ok().map(|binary| Self { binary })
    }
}

#[async_trait]
impl Concatenator for PdftkConcatenator {
    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
        let status = Command::new(&self.binary)
            .args(inputs)
            .arg("cat")
            .arg("output")
            .arg(output)
            .status()
            .await
            .map_err(|e| AssemblyError::ToolLaunch {
                tool: "pdftk",
                source: e,
            })?;
        if !status.success() {
            return Err(AssemblyError::tool_failed("pdftk", status));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pdftk"
    }
}

/// `stapler cat <inputs...> <out>`
pub struct StaplerConcatenator {
    binary: PathBuf,
}

impl StaplerConcatenator {
    /// Attempts to find stapler in PATH.
    #[must_use]
    pub fn from_path() -> Option<Self> {
        which::which("stapler").ok().map(|binary| Self { binary })
    }
}

#[async_trait]
impl Concatenator for StaplerConcatenator {
    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
        let status = Command::new(&self.binary)
            .arg("cat")
            .args(inputs)
            .arg(output)
            .status()
            .await
            .map_err(|e| AssemblyError::ToolLaunch {
                tool: "stapler",
                source: e,
            })?;
        if !status.success() {
            return Err(AssemblyError::tool_failed("stapler", status));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stapler"
    }
}

/// ImageMagick `convert <src> <dest>`.
pub struct MagickConverter {
    binary: PathBuf,
}

impl MagickConverter {
    /// Attempts to find ImageMagick's convert in PATH.
    #[must_use]
    pub fn from_path() -> Option<Self> {
        which::which("convert").ok().map(|binary| Self { binary })
    }
}

#[async_trait]
impl PageConverter for MagickConverter {
    async fn convert(&self, src: &Path, dest: &Path) -> Result<(), AssemblyError> {
        let status = Command::new(&self.binary)
            .arg(src)
            .arg(dest)
            .status()
            .await
            .map_err(|e| AssemblyError::ToolLaunch {
                tool: "convert",
                source: e,
            })?;
        if !status.success() {
            return Err(AssemblyError::tool_failed("convert", status));
        }
        Ok(())
    }
}

/// The external tools one run needs, discovered up front.
pub struct Toolchain {
    /// Cover image to page format.
    pub converter: Box<dyn PageConverter>,
    /// Part merging; `None` only when the run will not merge.
    pub concatenator: Option<Box<dyn Concatenator>>,
    /// Title to ASCII-safe filename component.
    pub transliterator: Box<dyn Transliterate>,
}

impl Toolchain {
    /// Discovers the required external tools in PATH.
    ///
    /// The converter is always required; a concatenator (pdftk preferred,
    /// stapler accepted) only when `merge` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTool`] naming the first absent tool.
    pub fn discover(merge: bool) -> Result<Self, ConfigError> {
        let converter = MagickConverter::from_path().ok_or(ConfigError::MissingTool {
            name: "convert",
            hint: "install ImageMagick",
        })?;

        let concatenator: Option<Box<dyn Concatenator>> = if merge {
            let found = find_concatenator().ok_or(ConfigError::MissingTool {
                name: "pdftk or stapler",
                hint: "install pdftk (https://www.pdflabs.com/tools/pdftk-server/) or stapler (https://github.com/hellerbarde/stapler)",
            })?;
            debug!(tool = found.name(), "selected concatenation tool");
            Some(found)
        } else {
            None
        };

        Ok(Self {
            converter: Box::new(converter),
            concatenator,
            transliterator: Box::new(AsciiSlug),
        })
    }

    /// Builds a toolchain from explicit parts. Primarily for tests and
    /// embedders substituting their own tools.
    #[must_use]
    pub fn with_parts(
        converter: Box<dyn PageConverter>,
        concatenator: Option<Box<dyn Concatenator>>,
        transliterator: Box<dyn Transliterate>,
    ) -> Self {
        Self {
            converter,
            concatenator,
            transliterator,
        }
    }
}

/// Finds the first available concatenation tool, preferring pdftk.
#[must_use]
pub fn find_concatenator() -> Option<Box<dyn Concatenator>> {
    if let Some(pdftk) = PdftkConcatenator::from_path() {
        return Some(Box::new(pdftk));
    }
    if let Some(stapler) = StaplerConcatenator::from_path() {
        return Some(Box::new(stapler));
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_returns_none_for_nonexistent_binary() {
        // which() must not find a binary by this name
        assert!(which::which("nonexistent-concat-binary-xyz").is_err());
    }

    #[test]
    fn test_pdftk_discovery_matches_which() {
        let expected = which::which("pdftk").is_ok();
        assert_eq!(PdftkConcatenator::from_path().is_some(), expected);
    }

    #[test]
    fn test_concatenator_names() {
        if let Some(tool) = PdftkConcatenator::from_path() {
            assert_eq!(tool.name(), "pdftk");
        }
        if let Some(tool) = StaplerConcatenator::from_path() {
            assert_eq!(tool.name(), "stapler");
        }
    }
}
