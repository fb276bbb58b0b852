//! Error types for assembly and external-tool configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while merging downloaded parts.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// No capable concatenation tool is available.
    #[error("no concatenation tool available: install pdftk or stapler")]
    NoConcatenator,

    /// An external tool exited with a failure status.
    #[error("{tool} failed with exit status {status:?}")]
    ToolFailed {
        /// Name of the external tool.
        tool: &'static str,
        /// Exit code, when the process terminated normally.
        status: Option<i32>,
    },

    /// Failed to launch an external tool.
    #[error("failed to run {tool}: {source}")]
    ToolLaunch {
        /// Name of the external tool.
        tool: &'static str,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// File system error while moving or copying parts.
    #[error("IO error assembling {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl AssemblyError {
    /// Creates a tool-failure error from an exit status.
    pub fn tool_failed(tool: &'static str, status: std::process::ExitStatus) -> Self {
        Self::ToolFailed {
            tool,
            status: status.code(),
        }
    }

    /// Creates an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Startup-time configuration errors, detected before any download work
/// begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required external tool is absent from PATH.
    #[error("required external tool not found: {name} ({hint})")]
    MissingTool {
        /// Binary name searched for.
        name: &'static str,
        /// How to obtain the tool.
        hint: &'static str,
    },

    /// The final output path already exists from a previous run.
    #[error("{path} already downloaded")]
    OutputExists {
        /// The colliding output path.
        path: PathBuf,
    },
}
