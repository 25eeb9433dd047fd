//! Configuration management for hookline
//!
//! This crate handles:
//! - Loading and validating `.pre-commit-config.yaml`
//! - Hook definitions and manifest overlay
//! - The `ci` settings block
//! - XDG cache directory lookup
//! - Logging initialization
//! - The sample configuration

pub mod config;
pub mod dirs;
pub mod hooks;
pub mod logging;
pub mod sample;

// Re-export error types from core
pub use hookline_core::{Error, Result, Stage};

// Re-export main types
pub use config::{
    AutoupdateSchedule, CiSettings, DEFAULT_CONFIG_FILE, LOCAL_REPO, MANIFEST_FILE, META_REPO,
    PipelineConfig, RepoConfig, RepoKind,
};
pub use dirs::cache_dir;
pub use hooks::{HookConfig, HookDefinition, Language, META_HOOK_IDS, TYPE_TAGS};
