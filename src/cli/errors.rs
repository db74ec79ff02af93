//! CLI error types
//!
//! Every CLI error ends the process with a non-zero exit code. The display
//! form is `CLI_<KIND>: <message>`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, malformed or invalid
    #[error("CLI_CONFIG_ERROR: {0}")]
    Config(String),

    /// Stdout or file I/O failed
    #[error("CLI_IO_ERROR: {0}")]
    Io(#[from] io::Error),

    /// Response or config could not be encoded
    #[error("CLI_IO_ERROR: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CLI_ALREADY_INITIALIZED: Config file already exists: {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// Logging, store or server could not start
    #[error("CLI_BOOT_FAILED: {0}")]
    BootFailed(String),
}

impl CliError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CLI_CONFIG_ERROR",
            Self::Io(_) | Self::Json(_) => "CLI_IO_ERROR",
            Self::AlreadyInitialized(_) => "CLI_ALREADY_INITIALIZED",
            Self::BootFailed(_) => "CLI_BOOT_FAILED",
        }
    }
}
