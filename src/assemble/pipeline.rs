//! Merging downloaded parts into the final artifact.
//!
//! A single part is relocated, never re-encoded; multiple parts go through
//! the configured concatenation tool in chapter-index order (cover first).
//! The optional cover image is converted to page format beforehand; a failed
//! conversion only costs the cover, not the run.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::error::AssemblyError;
use super::tools::Toolchain;

/// Merges ordered parts into one output artifact using the run's toolchain.
pub struct AssemblyPipeline<'a> {
    tools: &'a Toolchain,
}

impl<'a> AssemblyPipeline<'a> {
    /// Creates a pipeline over an already-discovered toolchain.
    #[must_use]
    pub fn new(tools: &'a Toolchain) -> Self {
        Self { tools }
    }

    /// Converts the downloaded cover image to page format.
    ///
    /// Returns the converted path, or `None` when conversion fails - the
    /// cover is then omitted from assembly rather than aborting the run.
    #[instrument(skip(self), fields(src = %src.display()))]
    pub async fn prepare_cover(&self, src: &Path, dest: &Path) -> Option<PathBuf> {
        match self.tools.converter.convert(src, dest).await {
            Ok(()) => Some(dest.to_path_buf()),
            Err(e) => {
                warn!(error = %e, "cover conversion failed; omitting cover");
                None
            }
        }
    }

    /// Produces one output artifact from the ordered parts.
    ///
    /// Exactly one part is moved to `output` byte-for-byte; more than one
    /// part is concatenated in the given order by the external tool.
    ///
    /// # Errors
    ///
    /// - [`AssemblyError::NoConcatenator`] with multiple parts and no tool
    /// - [`AssemblyError::ToolFailed`] / [`AssemblyError::ToolLaunch`] when
    ///   the tool fails
    /// - [`AssemblyError::Io`] when relocation fails
    #[instrument(skip(self, parts), fields(parts = parts.len(), output = %output.display()))]
    pub async fn assemble(&self, parts: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
        match parts {
            [] => Err(AssemblyError::io(
                output,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parts to assemble"),
            )),
            [single] => {
                move_file(single, output).await?;
                info!("single part moved to output");
                Ok(())
            }
            _ => {
                let tool = self
                    .tools
                    .concatenator
                    .as_deref()
                    .ok_or(AssemblyError::NoConcatenator)?;
                tool.concatenate(parts, output).await?;
                info!(tool = tool.name(), "parts concatenated");
                Ok(())
            }
        }
    }
}

/// Moves `src` to `dest`, copying across filesystems when rename fails.
///
/// The staging area usually lives on a different mount than the output
/// directory, so the rename fast path cannot be assumed.
async fn move_file(src: &Path, dest: &Path) -> Result<(), AssemblyError> {
    if tokio::fs::rename(src, dest).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(src, dest)
        .await
        .map_err(|e| AssemblyError::io(dest, e))?;
    tokio::fs::remove_file(src)
        .await
        .map_err(|e| AssemblyError::io(src, e))?;
    Ok(())
}
