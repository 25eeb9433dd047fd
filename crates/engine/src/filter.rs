//! File selection for hooks
//!
//! A file reaches a hook only if it passes, in order:
//!
//! 1. the top-level `files`/`exclude` regexes,
//! 2. the hook's own `files`/`exclude` regexes,
//! 3. the hook's `types` (all of), `types_or` (any of) and `exclude_types`
//!    (none of) tag filters.
//!
//! Regexes are searched (not anchored) against the path relative to the
//! repository root, written with `/` separators.

use crate::identify::{self, Tags};
use hookline_config::HookDefinition;
use hookline_core::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// A changed file and the type tags it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path relative to the repository root
    pub path: PathBuf,
    /// Tags from [`identify::tags_from_path`]
    pub tags: Tags,
}

impl FileInfo {
    /// Path as matched by `files`/`exclude` regexes
    #[must_use]
    pub fn match_path(&self) -> String {
        normalize(&self.path)
    }
}

/// Tag every file, resolving paths against `root`
#[must_use]
pub fn classify(root: &Path, files: &[PathBuf]) -> Vec<FileInfo> {
    files
        .iter()
        .map(|path| FileInfo {
            path: path.clone(),
            tags: identify::tags_from_path(&root.join(path)),
        })
        .collect()
}

fn normalize(path: &Path) -> String {
    let path = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        path.into_owned()
    } else {
        path.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e))
}

/// An include/exclude regex pair
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Regex,
    exclude: Regex,
}

impl PathFilter {
    /// Compile a filter; an empty `include` matches every path
    pub fn new(include: &str, exclude: &str) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Check if a path passes this filter
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }

    /// Check if the exclude pattern matches a path
    #[must_use]
    pub fn excludes(&self, path: &str) -> bool {
        self.exclude.is_match(path)
    }

    /// Keep the files that pass this filter, preserving order
    #[must_use]
    pub fn apply<'f>(&self, files: &'f [FileInfo]) -> Vec<&'f FileInfo> {
        files
            .iter()
            .filter(|file| self.matches(&file.match_path()))
            .collect()
    }
}

/// Everything that decides which files a single hook sees
#[derive(Debug, Clone)]
pub struct HookFilter {
    paths: PathFilter,
    types: Vec<String>,
    types_or: Vec<String>,
    exclude_types: Vec<String>,
}

impl HookFilter {
    /// Build the filter for a hook
    pub fn from_hook(hook: &HookDefinition) -> Result<Self> {
        Ok(Self {
            paths: PathFilter::new(&hook.files, &hook.exclude)?,
            types: hook.types.clone(),
            types_or: hook.types_or.clone(),
            exclude_types: hook.exclude_types.clone(),
        })
    }

    /// The hook's own regex pair
    #[must_use]
    pub fn paths(&self) -> &PathFilter {
        &self.paths
    }

    /// Check if a file is selected by this hook
    #[must_use]
    pub fn matches(&self, file: &FileInfo) -> bool {
        self.paths.matches(&file.match_path()) && self.matches_tags(&file.tags)
    }

    fn matches_tags(&self, tags: &Tags) -> bool {
        let has = |tag: &String| tags.contains(tag.as_str());

        self.types.iter().all(has)
            && (self.types_or.is_empty() || self.types_or.iter().any(has))
            && !self.exclude_types.iter().any(has)
    }

    /// Paths of the files selected by this hook, in changeset order
    #[must_use]
    pub fn apply(&self, files: &[&FileInfo]) -> Vec<PathBuf> {
        files
            .iter()
            .filter(|file| self.matches(file))
            .map(|file| file.path.clone())
            .collect()
    }
}
