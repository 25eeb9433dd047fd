//! Hook definitions
//!
//! A hook appears twice in the lifecycle of a run:
//!
//! - [`HookConfig`]: the entry as written in `.pre-commit-config.yaml` or in a
//!   repository's `.pre-commit-hooks.yaml` manifest. Every key except `id` is
//!   optional so that config entries can be overlaid on manifest entries.
//! - [`HookDefinition`]: the resolved, immutable hook the runner executes.

use hookline_core::{Error, Result, Stage};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Built-in hooks provided by `repo: meta`
pub const META_HOOK_IDS: &[&str] = &["check-hooks-apply", "check-useless-excludes", "identity"];

/// File type tags understood by `types`, `types_or` and `exclude_types`
pub const TYPE_TAGS: &[&str] = &[
    "file",
    "directory",
    "symlink",
    "executable",
    "non-executable",
    "text",
    "binary",
    "bash",
    "c",
    "c++",
    "cfg",
    "css",
    "csv",
    "dockerfile",
    "go",
    "html",
    "ini",
    "javascript",
    "json",
    "jsx",
    "jupyter",
    "makefile",
    "markdown",
    "plain-text",
    "pyi",
    "python",
    "rst",
    "ruby",
    "rust",
    "shell",
    "sql",
    "svg",
    "toml",
    "ts",
    "tsx",
    "xml",
    "yaml",
    "zsh",
];

fn default_exclude() -> String {
    "^$".to_string()
}

fn default_types() -> Vec<String> {
    vec!["file".to_string()]
}

/// How a hook's `entry` is executed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    /// Run `entry` as a command found on `PATH`
    System,
    /// Run `entry` as a path relative to the hook repository
    Script,
    /// Fail whenever any file matches, printing `entry` as the message
    Fail,
    /// Treat `entry` as a regular expression and fail on matching lines
    Pygrep,
    /// A language whose environment hookline does not provision
    ///
    /// These hooks run like `system` hooks and expect their tool to be installed.
    Unmanaged(String),
}

impl Language {
    /// Get the name of this language as written in config files
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Language::System => "system",
            Language::Script => "script",
            Language::Fail => "fail",
            Language::Pygrep => "pygrep",
            Language::Unmanaged(name) => name,
        }
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Language::System,
            "script" => Language::Script,
            "fail" => Language::Fail,
            "pygrep" => Language::Pygrep,
            _ => Language::Unmanaged(value),
        }
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A hook entry as written in a config file or manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookConfig {
    /// Hook identifier (required)
    pub id: String,

    /// Alternative id usable with `hookline run <id>` and `SKIP`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Command (or regex, for pygrep) to execute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Execution strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    /// Extra arguments placed between `entry` and the file names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Regex selecting files to pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,

    /// Regex selecting files to leave out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// File must carry all of these tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,

    /// File must carry at least one of these tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types_or: Option<Vec<String>>,

    /// File must carry none of these tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_types: Option<Vec<String>>,

    /// Stages this hook runs at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,

    /// Run even when no file matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_run: Option<bool>,

    /// Append matching file names to the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_filenames: Option<bool>,

    /// Print output even when the hook passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Stop the whole run when this hook fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,

    /// Run invocations one after another (hooks already run sequentially)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_serial: Option<bool>,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Also write hook output to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Packages for managed environments (recorded, not installed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_dependencies: Option<Vec<String>>,

    /// Language toolchain version (recorded, not installed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,

    /// Minimum tool version declared by manifests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_pre_commit_version: Option<String>,

    /// Keys we do not understand, kept for warnings
    #[serde(flatten, skip_serializing)]
    pub unknown: IndexMap<String, serde_yaml::Value>,
}

impl HookConfig {
    /// Overlay this entry on a base entry (usually from a manifest)
    ///
    /// Keys set on `self` win; unset keys fall back to `base`.
    #[must_use]
    pub fn overlay(&self, base: &HookConfig) -> HookConfig {
        macro_rules! pick {
            ($field:ident) => {
                self.$field.clone().or_else(|| base.$field.clone())
            };
        }

        HookConfig {
            id: self.id.clone(),
            alias: pick!(alias),
            name: pick!(name),
            entry: pick!(entry),
            language: pick!(language),
            args: pick!(args),
            files: pick!(files),
            exclude: pick!(exclude),
            types: pick!(types),
            types_or: pick!(types_or),
            exclude_types: pick!(exclude_types),
            stages: pick!(stages),
            always_run: pick!(always_run),
            pass_filenames: pick!(pass_filenames),
            verbose: pick!(verbose),
            fail_fast: pick!(fail_fast),
            require_serial: pick!(require_serial),
            description: pick!(description),
            log_file: pick!(log_file),
            additional_dependencies: pick!(additional_dependencies),
            language_version: pick!(language_version),
            minimum_pre_commit_version: pick!(minimum_pre_commit_version),
            unknown: self.unknown.clone(),
        }
    }

    /// Validate fields that must hold for every hook entry
    ///
    /// Checks for:
    /// - Non-empty id
    /// - Valid `files`/`exclude` regexes
    /// - Known type tags (unknown tags only warn)
    /// - Unknown keys (warn only)
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidConfig("Hook id cannot be empty".to_string()));
        }

        for pattern in [&self.files, &self.exclude].into_iter().flatten() {
            regex::Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e))?;
        }

        for tag in [&self.types, &self.types_or, &self.exclude_types]
            .into_iter()
            .flatten()
            .flatten()
        {
            if !TYPE_TAGS.contains(&tag.as_str()) {
                tracing::warn!(
                    hook_id = %self.id,
                    tag = %tag,
                    "Hook uses an unknown file type tag (typo?)"
                );
            }
        }

        for key in self.unknown.keys() {
            tracing::warn!(hook_id = %self.id, key = %key, "Unexpected key in hook definition");
        }

        if let Some(entry) = &self.entry
            && entry.trim().is_empty()
        {
            return Err(Error::InvalidConfig(format!(
                "Hook '{}' has empty 'entry' field",
                self.id
            )));
        }

        Ok(())
    }

    /// Validate a hook declared under `repo: local`
    ///
    /// Local hooks have no manifest to fall back on, so `name`, `entry` and
    /// `language` are required.
    pub fn validate_local(&self) -> Result<()> {
        self.validate()?;

        let missing = [
            ("name", self.name.is_none()),
            ("entry", self.entry.is_none()),
            ("language", self.language.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, is_missing)| is_missing.then_some(field))
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "Local hook '{}' is missing required field(s): {}",
                self.id,
                missing.join(", ")
            )))
        }
    }

    /// Turn this entry into an executable hook definition
    ///
    /// `default_stages` comes from the top-level config; an empty list means
    /// every stage.
    pub fn resolve(&self, default_stages: &[Stage]) -> Result<HookDefinition> {
        let entry = self.entry.clone().ok_or_else(|| {
            Error::InvalidConfig(format!(
                "Hook '{}' is missing required field 'entry'",
                self.id
            ))
        })?;

        let stages = match &self.stages {
            Some(stages) if !stages.is_empty() => stages.clone(),
            _ if !default_stages.is_empty() => default_stages.to_vec(),
            _ => Stage::ALL.to_vec(),
        };

        Ok(HookDefinition {
            id: self.id.clone(),
            alias: self.alias.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            entry,
            language: self.language.clone().unwrap_or(Language::System),
            args: self.args.clone().unwrap_or_default(),
            files: self.files.clone().unwrap_or_default(),
            exclude: self.exclude.clone().unwrap_or_else(default_exclude),
            types: self.types.clone().unwrap_or_else(default_types),
            types_or: self.types_or.clone().unwrap_or_default(),
            exclude_types: self.exclude_types.clone().unwrap_or_default(),
            stages,
            always_run: self.always_run.unwrap_or(false),
            pass_filenames: self.pass_filenames.unwrap_or(true),
            verbose: self.verbose.unwrap_or(false),
            fail_fast: self.fail_fast.unwrap_or(false),
            require_serial: self.require_serial.unwrap_or(false),
            description: self.description.clone().unwrap_or_default(),
            log_file: self.log_file.clone(),
            additional_dependencies: self.additional_dependencies.clone().unwrap_or_default(),
        })
    }
}

/// A resolved hook, ready to execute
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookDefinition {
    /// Hook identifier
    pub id: String,
    /// Alternative identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Display name
    pub name: String,
    /// Command (or pattern) to execute
    pub entry: String,
    /// Execution strategy
    pub language: Language,
    /// Arguments placed between `entry` and file names
    pub args: Vec<String>,
    /// Include regex (empty matches everything)
    pub files: String,
    /// Exclude regex
    pub exclude: String,
    /// All-of type tags
    pub types: Vec<String>,
    /// Any-of type tags
    pub types_or: Vec<String>,
    /// None-of type tags
    pub exclude_types: Vec<String>,
    /// Stages this hook runs at
    pub stages: Vec<Stage>,
    /// Run even with no matching files
    pub always_run: bool,
    /// Pass matching files as arguments
    pub pass_filenames: bool,
    /// Print output on success
    pub verbose: bool,
    /// Stop the run on failure
    pub fail_fast: bool,
    /// Run invocations one after another
    pub require_serial: bool,
    /// Free-form description
    pub description: String,
    /// Extra destination for hook output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Packages for managed environments (informational)
    pub additional_dependencies: Vec<String>,
}

impl HookDefinition {
    /// Check if this hook is eligible at the given stage
    #[must_use]
    pub fn runs_at(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Check if `id` names this hook (by id or alias)
    #[must_use]
    pub fn is_named(&self, id: &str) -> bool {
        self.id == id || self.alias.as_deref() == Some(id)
    }
}
