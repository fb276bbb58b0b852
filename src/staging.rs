//! Temporary staging area owning all on-disk parts for one run.
//!
//! One `StagingArea` is created before discovery begins and is destroyed
//! exactly once: dropped (removed) after a successful move into the final
//! output location, or kept explicitly when the caller decides the parts must
//! survive (no-merge mode, assembly failure). Removal on error paths is
//! best-effort; a staging directory that is already gone is not itself an
//! error, so `TempDir`'s drop swallowing removal failures is the behavior we
//! want.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

/// Temporary working directory for one run's chapter parts, cover files, and
/// merge candidate.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Allocates a fresh staging directory.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the temporary directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("bookdl-").tempdir()?;
        debug!(path = %dir.path().display(), "created staging area");
        Ok(Self { dir })
    }

    /// Path of the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Destination for the chapter with the given discovery index.
    #[must_use]
    pub fn chapter_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("{index}.pdf"))
    }

    /// Destination for the cover image as downloaded.
    #[must_use]
    pub fn cover_image_path(&self) -> PathBuf {
        self.dir.path().join("frontcover.gif")
    }

    /// Destination for the cover after conversion to page format.
    #[must_use]
    pub fn cover_page_path(&self) -> PathBuf {
        self.dir.path().join("frontcover.pdf")
    }

    /// Persists the staging directory and returns its path.
    ///
    /// Used when the downloaded parts must outlive the run: no-merge mode and
    /// assembly failures. After this call nothing will remove the directory.
    #[must_use]
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }

    /// Removes the staging directory now, reporting failures.
    ///
    /// Dropping the area also removes it, but silently; the success path
    /// calls this so removal problems are at least observable.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be deleted.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}
