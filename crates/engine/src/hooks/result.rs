//! Hook results and run reports

use hookline_core::Stage;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a single hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStatus {
    /// Exited 0 without touching any file
    Passed,
    /// Exited nonzero or modified files
    Failed,
    /// In the skip set, never invoked
    Skipped,
    /// No file matched and `always_run` is off, never invoked
    NoFiles,
    /// Could not be invoked (missing program, bad pattern, ...)
    Error,
}

impl HookStatus {
    /// Check if this status fails the run
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, HookStatus::Failed | HookStatus::Error)
    }

    /// Human readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            HookStatus::Passed => "Passed",
            HookStatus::Failed => "Failed",
            HookStatus::Skipped => "Skipped",
            HookStatus::NoFiles => "(no files to check)Skipped",
            HookStatus::Error => "Error",
        }
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// What happened when a hook ran (or did not)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Hook identifier
    pub hook_id: String,
    /// Display name
    pub name: String,
    /// Outcome
    pub status: HookStatus,
    /// Exit status of the first failing invocation (0 if all passed)
    ///
    /// `None` when the hook was never invoked.
    pub exit_code: Option<i32>,
    /// Changeset files whose content the hook changed
    pub modified_files: Vec<PathBuf>,
    /// Combined stdout/stderr of every invocation
    pub output: String,
    /// Wall time spent on the hook
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    /// Number of processes started (batches)
    pub invocations: usize,
    /// Show output even on success
    #[serde(skip)]
    pub verbose: bool,
}

impl RunResult {
    /// A result for a hook that was not invoked
    pub(crate) fn not_run(hook_id: &str, name: &str, status: HookStatus) -> Self {
        Self {
            hook_id: hook_id.to_string(),
            name: name.to_string(),
            status,
            exit_code: None,
            modified_files: Vec::new(),
            output: String::new(),
            duration: Duration::ZERO,
            invocations: 0,
            verbose: false,
        }
    }

    /// Check if the output should be shown to the user
    #[must_use]
    pub fn shows_output(&self) -> bool {
        !self.output.trim().is_empty() && (self.verbose || self.status.is_failure())
    }
}

/// Every result of one run, in execution order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Stage the run was for
    pub stage: Stage,
    /// One entry per hook eligible at `stage`
    pub results: Vec<RunResult>,
    /// A fail-fast hook stopped the run
    pub stopped_early: bool,
}

impl RunReport {
    /// Check if no hook failed or errored
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(|r| r.status.is_failure())
    }

    /// Files modified by any hook, first occurrence order
    #[must_use]
    pub fn modified_files(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.results
            .iter()
            .flat_map(|r| r.modified_files.iter())
            .filter(|path| seen.insert(*path))
            .cloned()
            .collect()
    }

    /// Number of results with a given status
    #[must_use]
    pub fn count(&self, status: HookStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Find the result of a hook
    #[must_use]
    pub fn get(&self, hook_id: &str) -> Option<&RunResult> {
        self.results.iter().find(|r| r.hook_id == hook_id)
    }
}
