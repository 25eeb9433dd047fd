//! Git hook lifecycle stages
//!
//! A stage names the point in the git workflow at which a hook becomes
//! eligible to run. Legacy short names (`commit`, `push`, `merge-commit`)
//! are accepted when parsing.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle point at which hooks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Before a commit is recorded (the default)
    #[serde(alias = "commit")]
    PreCommit,
    /// Before a merge commit is recorded
    #[serde(alias = "merge-commit")]
    PreMergeCommit,
    /// Before refs are pushed to a remote
    #[serde(alias = "push")]
    PrePush,
    /// After the default commit message is prepared
    PrepareCommitMsg,
    /// After the commit message is written
    CommitMsg,
    /// After a checkout or switch
    PostCheckout,
    /// After a commit is recorded
    PostCommit,
    /// After a merge
    PostMerge,
    /// After an amend or rebase rewrites commits
    PostRewrite,
    /// Before a rebase starts
    PreRebase,
    /// Only runs when explicitly requested with `--hook-stage manual`
    Manual,
}

impl Stage {
    /// Every stage, in the order git would typically reach them
    pub const ALL: [Stage; 11] = [
        Stage::PreCommit,
        Stage::PreMergeCommit,
        Stage::PrePush,
        Stage::PrepareCommitMsg,
        Stage::CommitMsg,
        Stage::PostCheckout,
        Stage::PostCommit,
        Stage::PostMerge,
        Stage::PostRewrite,
        Stage::PreRebase,
        Stage::Manual,
    ];

    /// Get the canonical name of this stage (also the git hook file name)
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::PreCommit => "pre-commit",
            Stage::PreMergeCommit => "pre-merge-commit",
            Stage::PrePush => "pre-push",
            Stage::PrepareCommitMsg => "prepare-commit-msg",
            Stage::CommitMsg => "commit-msg",
            Stage::PostCheckout => "post-checkout",
            Stage::PostCommit => "post-commit",
            Stage::PostMerge => "post-merge",
            Stage::PostRewrite => "post-rewrite",
            Stage::PreRebase => "pre-rebase",
            Stage::Manual => "manual",
        }
    }

    /// Whether a git hook script can be installed for this stage
    #[must_use]
    pub fn is_installable(&self) -> bool {
        !matches!(self, Stage::Manual)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => return Ok(Stage::PreCommit),
            "push" => return Ok(Stage::PrePush),
            "merge-commit" => return Ok(Stage::PreMergeCommit),
            _ => {}
        }

        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| Error::UnknownStage(s.to_string()))
    }
}
