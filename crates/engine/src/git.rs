//! Git operations
//!
//! Built on git2 (libgit2). Provides the changesets hooks run against, the
//! ability to re-stage files rewritten by hooks, and lookup of the hooks
//! directory for installation.

use crate::changeset::{Changeset, ChangesetSource};
use hookline_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Helper function to convert git2 errors to `hookline_core` errors
#[inline]
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn git_err(e: git2::Error) -> Error {
    Error::Git(e.message().to_string())
}

/// Gitlink entries (submodules) in the index
const GITLINK_MODE: u32 = 0o160_000;

/// A non-bare git repository with a working tree
pub struct GitRepo {
    repo: git2::Repository,
    root: PathBuf,
}

impl GitRepo {
    /// Find the repository containing `path`
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(path).map_err(git_err)?;
        let root = repo
            .workdir()
            .ok_or_else(|| Error::Git("Repository has no working tree (bare?)".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// Working tree root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory git looks in for hook scripts
    ///
    /// Honours `core.hooksPath`; relative values are taken from the working tree root.
    pub fn hooks_dir(&self) -> Result<PathBuf> {
        let config = self.repo.config().map_err(git_err)?;
        match config.get_path("core.hooksPath") {
            Ok(path) if path.is_absolute() => Ok(path),
            Ok(path) => Ok(self.root.join(path)),
            Err(_) => Ok(self.repo.path().join("hooks")),
        }
    }

    /// Files staged for commit (added, copied, modified, renamed, type-changed)
    #[tracing::instrument(skip(self))]
    pub fn staged_files(&self) -> Result<Changeset> {
        let head_tree = self.head_tree()?;
        let index = self.index()?;

        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)
            .map_err(git_err)?;

        let files = collect_new_paths(&diff);
        tracing::debug!(count = files.len(), "Collected staged files");
        Ok(Changeset::new(files, ChangesetSource::Staged))
    }

    /// Every file tracked in the index
    pub fn all_files(&self) -> Result<Changeset> {
        let index = self.index()?;
        let files = index
            .iter()
            .filter(|entry| entry.mode != GITLINK_MODE)
            .map(|entry| PathBuf::from(String::from_utf8_lossy(&entry.path).into_owned()))
            .collect::<Vec<_>>();

        tracing::debug!(count = files.len(), "Collected tracked files");
        Ok(Changeset::new(files, ChangesetSource::AllFiles))
    }

    /// Files changed between two revisions
    pub fn changed_between(&self, from: &str, to: &str) -> Result<Changeset> {
        let from_tree = self.tree_of(from)?;
        let to_tree = self.tree_of(to)?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), None)
            .map_err(git_err)?;

        Ok(Changeset::new(
            collect_new_paths(&diff),
            ChangesetSource::Range {
                from: from.to_string(),
                to: to.to_string(),
            },
        ))
    }

    /// Add files back to the index after hooks rewrote them
    ///
    /// Files that no longer exist are removed from the index.
    pub fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut index = self.index()?;
        for path in paths {
            if self.root.join(path).exists() {
                index.add_path(path).map_err(git_err)?;
            } else {
                index.remove_path(path).map_err(git_err)?;
            }
        }
        index.write().map_err(git_err)?;

        tracing::debug!(count = paths.len(), "Re-staged files");
        Ok(())
    }

    /// The index, reloaded if another process changed it on disk
    fn index(&self) -> Result<git2::Index> {
        let mut index = self.repo.index().map_err(git_err)?;
        index.read(false).map_err(git_err)?;
        Ok(index)
    }

    fn head_tree(&self) -> Result<Option<git2::Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_tree().map_err(git_err)?)),
            // Nothing committed yet: compare against the empty tree
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(git_err(e)),
        }
    }

    fn tree_of(&self, rev: &str) -> Result<git2::Tree<'_>> {
        self.repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_tree())
            .map_err(|e| Error::Git(format!("Cannot resolve '{rev}': {}", e.message())))
    }
}

fn collect_new_paths(diff: &git2::Diff<'_>) -> Vec<PathBuf> {
    use git2::Delta;

    diff.deltas()
        .filter(|delta| {
            matches!(
                delta.status(),
                Delta::Added | Delta::Copied | Delta::Modified | Delta::Renamed | Delta::Typechange
            )
        })
        .filter_map(|delta| delta.new_file().path().map(Path::to_path_buf))
        .collect()
}
