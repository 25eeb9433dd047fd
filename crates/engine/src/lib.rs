//! # Hookline Engine
//!
//! Core library for running git hook pipelines.
//!
//! - **Changesets**: which files a run looks at (staged, all, explicit, ref range)
//! - **Git**: changeset collection, re-staging, hook directory lookup
//! - **Identify**: file type tags used by `types` filters
//! - **Filter**: `files`/`exclude` regexes and type tag filtering
//! - **Repository**: resolving repos (local, meta, remote clones) into hook definitions
//! - **Hooks**: sequential hook execution and result aggregation

pub mod changeset;
pub mod filter;
pub mod git;
pub mod hooks;
pub mod identify;
pub mod repository;

// Re-export error types from core
pub use hookline_core::{Error, Result, Stage};

// Re-export commonly used types
pub use changeset::{Changeset, ChangesetSource};
pub use git::GitRepo;
pub use filter::{FileInfo, HookFilter, PathFilter};
pub use hooks::{HookRunner, HookRunnerBuilder, HookStatus, RunReport, RunResult};
pub use repository::{Pipeline, RepoSource, RepoStore, ResolvedRepo};
