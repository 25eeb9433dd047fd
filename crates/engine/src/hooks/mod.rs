//! Hook execution
//!
//! ## Execution Model
//!
//! - Hooks run one at a time, in the order they are declared
//! - Hooks not registered for the current stage are left out
//! - Hooks in the skip set are reported as skipped and never invoked
//! - A failing hook does not stop the run unless `fail_fast` is set
//! - A hook that rewrites a changed file fails, even when it exits 0
//!
//! ## Module Organization
//!
//! - `executor`: the runner and its builder
//! - `languages`: `fail`, `pygrep` and command line batching
//! - `meta`: hooks provided by `repo: meta`
//! - `result`: per-hook results and the run report

pub mod executor;
mod languages;
mod meta;
pub mod result;

// Re-export main types for convenience
pub use executor::{HookRunner, HookRunnerBuilder, SKIP_ENV, parse_skip_list};
pub use result::{HookStatus, RunReport, RunResult};
