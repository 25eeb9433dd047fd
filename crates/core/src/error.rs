//! Base error types for hookline
//!
//! This module provides the foundation error types that all crates can use.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read or parsed
    #[error("Failed to parse {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration is structurally valid YAML but semantically wrong
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid regular expression in `files`/`exclude`/pygrep entry
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Unknown lifecycle stage name
    #[error("Unknown hook stage '{0}'")]
    UnknownStage(String),

    /// Hook repository could not be resolved
    #[error("Repository error for {repo}: {message}")]
    Repository { repo: String, message: String },

    /// Hook execution error (command missing, not executable, ...)
    #[error("Hook execution error: {0}")]
    HookExecution(String),

    /// Git error
    #[error("Git error: {0}")]
    Git(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Create an `InvalidPattern` error from any displayable cause
    pub fn invalid_pattern(pattern: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: cause.to_string(),
        }
    }

    /// Create a `Repository` error from any displayable cause
    pub fn repository(repo: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Repository {
            repo: repo.into(),
            message: cause.to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
