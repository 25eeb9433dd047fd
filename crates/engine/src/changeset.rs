//! The set of files a run looks at

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where a changeset came from (for display)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangesetSource {
    /// Files staged in the index
    Staged,
    /// Every tracked file
    AllFiles,
    /// Files named on the command line
    Explicit,
    /// Files changed between two revisions
    Range { from: String, to: String },
}

/// Changed files, relative to the repository root, in a stable order
///
/// Duplicates are dropped; the first occurrence keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changeset {
    files: Vec<PathBuf>,
    source: ChangesetSource,
}

impl Changeset {
    /// Build a changeset from paths relative to the repository root
    pub fn new<I, P>(files: I, source: ChangesetSource) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        let files = files
            .into_iter()
            .map(Into::into)
            .filter(|path: &PathBuf| seen.insert(path.clone()))
            .collect();

        Self { files, source }
    }

    /// Build a changeset from explicit paths
    pub fn from_paths<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(files, ChangesetSource::Explicit)
    }

    /// An empty changeset
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::<PathBuf>::new(), ChangesetSource::Explicit)
    }

    /// Files in this changeset
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Where this changeset came from
    #[must_use]
    pub fn source(&self) -> &ChangesetSource {
        &self.source
    }

    /// Number of files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if there are no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if a path is part of this changeset
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }
}
