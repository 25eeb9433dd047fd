//! Pipeline configuration
//!
//! This module loads and validates `.pre-commit-config.yaml`: an ordered list
//! of repositories, each pinning a revision and listing the hooks to run, plus
//! top-level filters and a `ci` block consumed by an external CI service.

use crate::hooks::{HookConfig, META_HOOK_IDS};
use hookline_core::{Error, Result, Stage};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name, looked up at the repository root
pub const DEFAULT_CONFIG_FILE: &str = ".pre-commit-config.yaml";

/// Manifest file name inside a hook repository
pub const MANIFEST_FILE: &str = ".pre-commit-hooks.yaml";

/// Repository marker for hooks defined inline
pub const LOCAL_REPO: &str = "local";

/// Repository marker for built-in hooks
pub const META_REPO: &str = "meta";

fn default_files() -> String {
    String::new()
}

fn default_exclude() -> String {
    "^$".to_string()
}

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Hook repositories, executed in order
    pub repos: Vec<RepoConfig>,

    /// Stages for hooks that do not declare `stages`
    #[serde(default)]
    pub default_stages: Vec<Stage>,

    /// Git hooks `hookline install` writes when no `--hook-type` is given
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_install_hook_types: Vec<Stage>,

    /// Global include regex applied before every hook's own filter
    #[serde(default = "default_files")]
    pub files: String,

    /// Global exclude regex applied before every hook's own filter
    #[serde(default = "default_exclude")]
    pub exclude: String,

    /// Stop after the first failing hook
    #[serde(default)]
    pub fail_fast: bool,

    /// Minimum runner version the file was written for (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_pre_commit_version: Option<String>,

    /// Toolchain versions per language (informational)
    #[serde(default)]
    pub default_language_version: IndexMap<String, String>,

    /// Settings read by the CI service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<CiSettings>,

    /// Keys we do not understand, kept for warnings
    #[serde(flatten, skip_serializing)]
    pub unknown: IndexMap<String, serde_yaml::Value>,
}

impl PipelineConfig {
    /// Load and validate a config file
    ///
    /// Any error here is fatal: no hook may run on a malformed config.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: format!("cannot read file: {e}"),
        })?;

        Self::from_yaml(&content, path)
    }

    /// Parse and validate config text
    ///
    /// `origin` is only used in error messages.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| Error::ConfigParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(
            path = %origin.display(),
            repos = config.repos.len(),
            hooks = config.hook_count(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        for key in self.unknown.keys() {
            tracing::warn!(key = %key, "Unexpected key in configuration");
        }

        for pattern in [&self.files, &self.exclude] {
            regex::Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e))?;
        }

        for repo in &self.repos {
            repo.validate()?;
        }

        if let Some(ci) = &self.ci {
            for id in &ci.skip {
                if !self.hooks().any(|hook| hook.id == *id) {
                    tracing::warn!(hook_id = %id, "ci.skip names a hook that is not configured");
                }
            }
        }

        Ok(())
    }

    /// Iterate over every configured hook entry, in declaration order
    pub fn hooks(&self) -> impl Iterator<Item = &HookConfig> {
        self.repos.iter().flat_map(|repo| repo.hooks.iter())
    }

    /// Total number of hook entries
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.repos.iter().map(|repo| repo.hooks.len()).sum()
    }

    /// Hook ids skipped by the CI variant
    #[must_use]
    pub fn ci_skip(&self) -> &[String] {
        self.ci.as_ref().map_or(&[], |ci| ci.skip.as_slice())
    }
}

/// Kind of hook repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoKind {
    /// Hooks defined inline in the config file
    Local,
    /// Built-in hooks
    Meta,
    /// A git repository providing a manifest
    Remote,
}

/// One `repos:` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Repository URL or path, `local`, or `meta`
    pub repo: String,

    /// Pinned revision (required for remote repositories)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    /// Hooks to run from this repository, in order
    pub hooks: Vec<HookConfig>,

    /// Keys we do not understand, kept for warnings
    #[serde(flatten, skip_serializing)]
    pub unknown: IndexMap<String, serde_yaml::Value>,
}

impl RepoConfig {
    /// Classify this repository
    #[must_use]
    pub fn kind(&self) -> RepoKind {
        match self.repo.as_str() {
            LOCAL_REPO => RepoKind::Local,
            META_REPO => RepoKind::Meta,
            _ => RepoKind::Remote,
        }
    }

    /// Validate this repository and its hooks
    pub fn validate(&self) -> Result<()> {
        if self.repo.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "Repository 'repo' field cannot be empty".to_string(),
            ));
        }

        for key in self.unknown.keys() {
            tracing::warn!(repo = %self.repo, key = %key, "Unexpected key in repository");
        }

        match self.kind() {
            RepoKind::Remote => {
                if self.rev.as_deref().is_none_or(|rev| rev.trim().is_empty()) {
                    return Err(Error::InvalidConfig(format!(
                        "Repository '{}' is missing required field 'rev'",
                        self.repo
                    )));
                }
                for hook in &self.hooks {
                    hook.validate()?;
                }
            }
            RepoKind::Local => {
                self.reject_rev()?;
                for hook in &self.hooks {
                    hook.validate_local()?;
                }
            }
            RepoKind::Meta => {
                self.reject_rev()?;
                for hook in &self.hooks {
                    hook.validate()?;
                    if !META_HOOK_IDS.contains(&hook.id.as_str()) {
                        return Err(Error::InvalidConfig(format!(
                            "'{}' is not a meta hook. Valid meta hooks: {}",
                            hook.id,
                            META_HOOK_IDS.join(", ")
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn reject_rev(&self) -> Result<()> {
        if self.rev.is_some() {
            return Err(Error::InvalidConfig(format!(
                "Repository '{}' must not specify 'rev'",
                self.repo
            )));
        }
        Ok(())
    }
}

/// How often the CI service proposes `rev` updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AutoupdateSchedule {
    /// Once a week (default)
    #[default]
    Weekly,
    /// Once a month
    Monthly,
    /// Once a quarter
    Quarterly,
}

/// The trailing `ci:` block
///
/// Read by an external continuous-integration collaborator. The runner only
/// consults `skip`, and only when asked to behave like the CI variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CiSettings {
    /// Commit message used for automatic fixes
    #[serde(default = "default_autofix_commit_msg")]
    pub autofix_commit_msg: String,

    /// Push automatic fixes to pull requests
    #[serde(default = "default_true")]
    pub autofix_prs: bool,

    /// Branch to send autoupdate pull requests to (empty = default branch)
    #[serde(default)]
    pub autoupdate_branch: String,

    /// Commit message for autoupdate pull requests
    #[serde(default = "default_autoupdate_commit_msg")]
    pub autoupdate_commit_msg: String,

    /// Autoupdate frequency
    #[serde(default)]
    pub autoupdate_schedule: AutoupdateSchedule,

    /// Hook ids to skip in CI
    #[serde(default)]
    pub skip: Vec<String>,

    /// Recurse into submodules
    #[serde(default)]
    pub submodules: bool,
}

impl Default for CiSettings {
    fn default() -> Self {
        Self {
            autofix_commit_msg: default_autofix_commit_msg(),
            autofix_prs: true,
            autoupdate_branch: String::new(),
            autoupdate_commit_msg: default_autoupdate_commit_msg(),
            autoupdate_schedule: AutoupdateSchedule::default(),
            skip: Vec::new(),
            submodules: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_autofix_commit_msg() -> String {
    "[pre-commit.ci] auto fixes from pre-commit.com hooks".to_string()
}

fn default_autoupdate_commit_msg() -> String {
    "[pre-commit.ci] pre-commit autoupdate".to_string()
}
