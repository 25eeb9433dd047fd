//! Error types for CLI commands
//!
//! Library errors arrive as `hookline_core::Error`; the variants here cover
//! what only the command line can get wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// No configuration file where one was expected
    #[error("No config file found at {}\nRun `hookline sample-config > .pre-commit-config.yaml` to create one", .0.display())]
    ConfigNotFound(PathBuf),

    /// The working directory is not inside a git repository
    #[error("Not inside a git repository: {0}")]
    NotARepository(String),

    /// `--hook-type` named a stage git has no hook for
    #[error("'{0}' cannot be installed as a git hook")]
    NotInstallable(String),

    /// A requested file lies outside the repository
    #[error("{} is outside the repository at {}", .path.display(), .root.display())]
    OutsideRepository {
        /// The offending path
        path: PathBuf,
        /// Repository working tree root
        root: PathBuf,
    },

    /// One or more configuration files failed validation
    #[error("{failed} of {total} config files are invalid")]
    InvalidConfigs {
        /// Number of files that failed
        failed: usize,
        /// Number of files checked
        total: usize,
    },

    /// Error from the hookline libraries
    #[error(transparent)]
    Core(#[from] hookline_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
