//! Append-only run log.
//!
//! One line per completed run, one line per fatal error, appended to a log
//! file in the invocation directory. The log is a plain text journal, not a
//! structured store.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default log filename in the invocation directory.
pub const RUN_LOG_NAME: &str = "bookdl.log";

/// Append-only journal of run outcomes.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Creates a log handle for `RUN_LOG_NAME` inside `dir`. Nothing is
    /// written until the first record.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(RUN_LOG_NAME),
        }
    }

    /// Records a successful merged run.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the log cannot be appended.
    pub fn record_merged(&self, chapters: usize, bytes: u64, title: &str) -> io::Result<()> {
        let mib = bytes as f64 / f64::from(1 << 20);
        self.append(&format!(
            "downloaded {chapters} chapters ({mib:.2}MiB) of {title}\n"
        ))
    }

    /// Records a successful no-merge run (size of the merged artifact is not
    /// known because none exists).
    ///
    /// # Errors
    ///
    /// Returns an IO error if the log cannot be appended.
    pub fn record_unmerged(&self, chapters: usize, title: &str) -> io::Result<()> {
        self.append(&format!("downloaded {chapters} chapters of {title}\n"))
    }

    /// Records a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the log cannot be appended.
    pub fn record_error(&self, message: &str) -> io::Result<()> {
        self.append(&format!("ERR: {message}\n"))
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::in_dir(dir.path());

        log.record_merged(12, 3 * (1 << 20), "Pro Git").unwrap();
        log.record_unmerged(4, "Another Title").unwrap();
        log.record_error("HTTP 404 downloading http://x/0.pdf").unwrap();

        let contents = std::fs::read_to_string(dir.path().join(RUN_LOG_NAME)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "downloaded 12 chapters (3.00MiB) of Pro Git");
        assert_eq!(lines[1], "downloaded 4 chapters of Another Title");
        assert!(lines[2].starts_with("ERR: "));
    }

    #[test]
    fn test_run_log_creates_file_on_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::in_dir(dir.path());
        assert!(!dir.path().join(RUN_LOG_NAME).exists());
        log.record_error("boom").unwrap();
        assert!(dir.path().join(RUN_LOG_NAME).exists());
    }
}
