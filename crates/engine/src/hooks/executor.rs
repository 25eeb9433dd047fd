//! Hook execution engine
//!
//! Runs the hooks of a [`Pipeline`] one at a time, in declaration order,
//! against a [`Changeset`], and collects a [`RunResult`] per hook.

use super::languages::{self, Outcome};
use super::meta;
use super::result::{HookStatus, RunReport, RunResult};
use crate::changeset::Changeset;
use crate::filter::{self, FileInfo, HookFilter, PathFilter};
use crate::git::GitRepo;
use crate::repository::{Pipeline, ResolvedRepo};
use hookline_config::{HookDefinition, Language, RepoKind};
use hookline_core::platform::CURRENT_PLATFORM;
use hookline_core::{Error, Result, Stage};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Environment variable holding comma separated hook ids to skip
pub const SKIP_ENV: &str = "SKIP";

/// Content hash per changeset file (`None` when the file does not exist)
type Snapshot = HashMap<PathBuf, Option<[u8; 32]>>;

/// Sequential hook runner
///
/// Hooks never run concurrently: they may rewrite the working tree, and each
/// one must see the result of the previous one.
pub struct HookRunner<'a> {
    pipeline: &'a Pipeline,
    root: &'a Path,
    env_vars: IndexMap<String, String>,
    skip: HashSet<String>,
    only: Option<String>,
    fail_fast: bool,
    max_command_length: usize,
    tracked: OnceCell<Vec<FileInfo>>,
    tracked_paths: Option<Vec<PathBuf>>,
}

impl<'a> HookRunner<'a> {
    /// Create a runner with default settings
    ///
    /// For custom configuration, use [`HookRunner::builder`].
    pub fn new(pipeline: &'a Pipeline, root: &'a Path) -> Self {
        Self::builder(pipeline, root).build()
    }

    /// Create a builder for configuring a `HookRunner`
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let runner = HookRunner::builder(&pipeline, repo.root())
    ///     .skip(["unit-tests"])
    ///     .fail_fast(true)
    ///     .build();
    /// let report = runner.run(&changeset, Stage::PreCommit)?;
    /// ```
    pub fn builder(pipeline: &'a Pipeline, root: &'a Path) -> HookRunnerBuilder<'a> {
        HookRunnerBuilder::new(pipeline, root)
    }

    /// Run every hook eligible at `stage` against `changeset`
    ///
    /// Hooks not registered for `stage` are left out of the report. Hook
    /// failures are recorded in the report; only problems that prevent the
    /// run as a whole (an invalid global pattern, an unknown hook id) are
    /// returned as errors.
    #[tracing::instrument(skip(self, changeset), fields(stage = %stage, files = changeset.len()))]
    pub fn run(&self, changeset: &Changeset, stage: Stage) -> Result<RunReport> {
        if let Some(only) = &self.only
            && !self
                .pipeline
                .hooks()
                .any(|(_, hook)| hook.is_named(only) && hook.runs_at(stage))
        {
            return Err(Error::Message(format!(
                "No hook with id '{only}' in stage '{stage}'"
            )));
        }

        let global = PathFilter::new(&self.pipeline.files, &self.pipeline.exclude)?;
        let classified = filter::classify(self.root, changeset.files());
        let candidates = global.apply(&classified);

        tracing::debug!(
            changed = changeset.len(),
            candidates = candidates.len(),
            "Running hooks"
        );

        let mut results = Vec::new();
        let mut stopped_early = false;
        // Taken lazily before the first hook that runs, then refreshed after each one
        let mut hashes: Option<Snapshot> = None;

        for (repo, hook) in self.pipeline.hooks() {
            if let Some(only) = &self.only
                && !hook.is_named(only)
            {
                continue;
            }

            if !hook.runs_at(stage) {
                tracing::trace!(hook_id = %hook.id, "Not registered for stage");
                continue;
            }

            if self.is_skipped(hook) {
                tracing::debug!(hook_id = %hook.id, "Skipping hook (skip set)");
                results.push(RunResult::not_run(&hook.id, &hook.name, HookStatus::Skipped));
                continue;
            }

            let result = self.run_hook(repo, hook, &candidates, changeset, stage, &mut hashes);
            let failed = result.status.is_failure();
            results.push(result);

            if failed && (self.fail_fast || self.pipeline.fail_fast || hook.fail_fast) {
                tracing::debug!(hook_id = %hook.id, "Stopping after failure (fail_fast)");
                stopped_early = true;
                break;
            }
        }

        Ok(RunReport {
            stage,
            results,
            stopped_early,
        })
    }

    fn is_skipped(&self, hook: &HookDefinition) -> bool {
        self.skip.contains(&hook.id)
            || hook
                .alias
                .as_ref()
                .is_some_and(|alias| self.skip.contains(alias))
    }

    fn run_hook(
        &self,
        repo: &ResolvedRepo,
        hook: &HookDefinition,
        candidates: &[&FileInfo],
        changeset: &Changeset,
        stage: Stage,
        hashes: &mut Option<Snapshot>,
    ) -> RunResult {
        let span = tracing::info_span!(
            "hook_execution",
            hook_id = %hook.id,
            language = %hook.language,
            always_run = hook.always_run,
            pass_filenames = hook.pass_filenames,
        );
        let _guard = span.enter();

        let start = Instant::now();

        let matched = match HookFilter::from_hook(hook) {
            Ok(filter) => filter.apply(candidates),
            Err(e) => return self.errored(hook, &e, start),
        };

        if matched.is_empty() && !hook.always_run {
            tracing::debug!("No files to check");
            return RunResult::not_run(&hook.id, &hook.name, HookStatus::NoFiles);
        }

        tracing::debug!(files = matched.len(), "Starting hook execution");

        let before = hashes
            .take()
            .unwrap_or_else(|| snapshot(self.root, changeset.files()));
        let outcome = self.execute(repo, hook, &matched, stage);
        let after = snapshot(self.root, changeset.files());

        let modified_files = changeset
            .files()
            .iter()
            .filter(|path| !is_git_file(path))
            .filter(|path| before.get(*path) != after.get(*path))
            .cloned()
            .collect::<Vec<_>>();
        *hashes = Some(after);

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => return self.errored(hook, &e, start),
        };

        let status = if outcome.exit_code != 0 || !modified_files.is_empty() {
            HookStatus::Failed
        } else {
            HookStatus::Passed
        };

        let duration = start.elapsed();
        match status {
            HookStatus::Passed => {
                tracing::debug!(elapsed_ms = duration.as_millis(), "Hook passed");
            }
            _ => {
                tracing::debug!(
                    elapsed_ms = duration.as_millis(),
                    exit_code = outcome.exit_code,
                    modified = modified_files.len(),
                    "Hook failed"
                );
            }
        }

        let result = RunResult {
            hook_id: hook.id.clone(),
            name: hook.name.clone(),
            status,
            exit_code: Some(outcome.exit_code),
            modified_files,
            output: outcome.output,
            duration,
            invocations: outcome.invocations,
            verbose: hook.verbose,
        };

        self.write_log_file(hook, &result);
        result
    }

    fn errored(&self, hook: &HookDefinition, error: &Error, start: Instant) -> RunResult {
        tracing::warn!(hook_id = %hook.id, error = %error, "Hook could not be run");

        let result = RunResult {
            output: error.to_string(),
            duration: start.elapsed(),
            verbose: hook.verbose,
            ..RunResult::not_run(&hook.id, &hook.name, HookStatus::Error)
        };
        self.write_log_file(hook, &result);
        result
    }

    fn execute(
        &self,
        repo: &ResolvedRepo,
        hook: &HookDefinition,
        files: &[PathBuf],
        stage: Stage,
    ) -> Result<Outcome> {
        if repo.kind == RepoKind::Meta {
            let tracked = self.tracked_files()?;
            return meta::run(&hook.id, self.pipeline, files, tracked);
        }

        match &hook.language {
            Language::Fail => Ok(languages::fail(hook, files)),
            Language::Pygrep => languages::pygrep(hook, self.root, files),
            Language::Script => {
                let (script, args) = split_entry(hook)?;
                let program = repo.root.join(script);
                if !program.is_file() {
                    return Err(Error::HookExecution(format!(
                        "Script not found: {}",
                        program.display()
                    )));
                }
                self.execute_command(hook, &program, &args, files, stage)
            }
            Language::System | Language::Unmanaged(_) => {
                let (program, args) = split_entry(hook)?;
                let program = self.resolve_program(&program)?;
                self.execute_command(hook, &program, &args, files, stage)
            }
        }
    }

    /// Every tracked file of the repository, classified once per runner
    fn tracked_files(&self) -> Result<&[FileInfo]> {
        if let Some(files) = self.tracked.get() {
            return Ok(files.as_slice());
        }

        let paths = match &self.tracked_paths {
            Some(paths) => paths.clone(),
            None => GitRepo::discover(self.root)?.all_files()?.files().to_vec(),
        };
        Ok(self
            .tracked
            .get_or_init(|| filter::classify(self.root, &paths))
            .as_slice())
    }

    /// Find a program on `PATH`, or relative to the repository root when it
    /// contains a path separator
    fn resolve_program(&self, program: &str) -> Result<PathBuf> {
        let path = Path::new(program);
        if path.components().count() > 1 {
            let candidate = self.root.join(path);
            return if candidate.is_file() {
                Ok(candidate)
            } else {
                Err(Error::HookExecution(format!(
                    "Executable '{program}' not found"
                )))
            };
        }

        which::which(program)
            .map_err(|_| Error::HookExecution(format!("Executable '{program}' not found")))
    }

    /// Run `program args… files…`, batching files to fit the command line
    #[tracing::instrument(skip(self, hook, args, files), fields(program = %program.display()))]
    fn execute_command(
        &self,
        hook: &HookDefinition,
        program: &Path,
        args: &[String],
        files: &[PathBuf],
        stage: Stage,
    ) -> Result<Outcome> {
        let base_len = program.as_os_str().len()
            + args.iter().map(|arg| arg.len() + 1).sum::<usize>();

        let batches = if hook.pass_filenames {
            languages::partition(base_len, files, self.max_command_length)
        } else {
            vec![Vec::new()]
        };

        let mut outcome = Outcome::default();
        for batch in &batches {
            let mut argv = args
                .iter()
                .map(std::ffi::OsString::from)
                .collect::<Vec<_>>();
            argv.extend(batch.iter().map(|file| file.as_os_str().to_os_string()));

            tracing::trace!(args = argv.len(), "Invoking");

            let mut cmd = duct::cmd(program, &argv)
                .dir(self.root)
                .env("HOOKLINE_STAGE", stage.name())
                .stderr_to_stdout()
                .stdout_capture()
                .unchecked();
            for (key, value) in &self.env_vars {
                cmd = cmd.env(key, value);
            }

            let output = cmd.run().map_err(|e| {
                Error::HookExecution(format!(
                    "Failed to run '{}': {e}",
                    program.display()
                ))
            })?;

            outcome.invocations += 1;
            outcome
                .output
                .push_str(&String::from_utf8_lossy(&output.stdout));

            // Killed by a signal: no exit code
            let code = output.status.code().unwrap_or(-1);
            if outcome.exit_code == 0 {
                outcome.exit_code = code;
            }
        }

        Ok(outcome)
    }

    fn write_log_file(&self, hook: &HookDefinition, result: &RunResult) {
        let Some(log_file) = &hook.log_file else {
            return;
        };
        if result.output.is_empty() {
            return;
        }

        let path = self.root.join(log_file);
        let written = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(result.output.as_bytes()));

        if let Err(e) = written {
            tracing::warn!(
                hook_id = %hook.id,
                path = %path.display(),
                error = %e,
                "Failed to write hook log file"
            );
        }
    }
}

/// Split `entry` into program and arguments, then append `args`
fn split_entry(hook: &HookDefinition) -> Result<(String, Vec<String>)> {
    let mut parts = shell_words::split(&hook.entry).map_err(|e| {
        Error::HookExecution(format!("Failed to parse entry '{}': {e}", hook.entry))
    })?;

    if parts.is_empty() {
        return Err(Error::HookExecution(format!(
            "Hook '{}' has an empty entry",
            hook.id
        )));
    }

    let program = parts.remove(0);
    parts.extend(hook.args.iter().cloned());
    Ok((program, parts))
}

/// Message files commit-msg hooks are allowed to rewrite
///
/// They live under `.git`, or outside the working tree for linked worktrees
/// and submodules.
fn is_git_file(path: &Path) -> bool {
    path.is_absolute() || path.starts_with(".git")
}

fn snapshot(root: &Path, files: &[PathBuf]) -> Snapshot {
    files
        .iter()
        .map(|path| {
            let hash = fs::read(root.join(path))
                .ok()
                .map(|content| Sha256::digest(&content).into());
            (path.clone(), hash)
        })
        .collect()
}

/// Builder for [`HookRunner`]
///
/// # Examples
///
/// ```ignore
/// let runner = HookRunner::builder(&pipeline, root)
///     .skip_from_env()
///     .skip(config.ci_skip().iter().cloned())
///     .only("flake8")
///     .build();
/// ```
pub struct HookRunnerBuilder<'a> {
    pipeline: &'a Pipeline,
    root: &'a Path,
    env_vars: IndexMap<String, String>,
    skip: HashSet<String>,
    only: Option<String>,
    fail_fast: bool,
    max_command_length: usize,
    tracked_paths: Option<Vec<PathBuf>>,
}

impl<'a> HookRunnerBuilder<'a> {
    /// Create a new builder with required parameters
    ///
    /// This is typically called via [`HookRunner::builder`].
    pub fn new(pipeline: &'a Pipeline, root: &'a Path) -> Self {
        let mut env_vars = IndexMap::new();

        // Hooks written for pre-commit look for this
        env_vars.insert("PRE_COMMIT".to_string(), "1".to_string());
        env_vars.insert("HOOKLINE".to_string(), "1".to_string());

        Self {
            pipeline,
            root,
            env_vars,
            skip: HashSet::new(),
            only: None,
            fail_fast: false,
            max_command_length: CURRENT_PLATFORM.max_command_length,
            tracked_paths: None,
        }
    }

    /// Add hook ids (or aliases) that must not run
    pub fn skip<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add the hook ids listed in the `SKIP` environment variable
    pub fn skip_from_env(self) -> Self {
        let ids = std::env::var(SKIP_ENV).unwrap_or_default();
        self.skip(parse_skip_list(&ids))
    }

    /// Run only the hook with this id or alias
    pub fn only(mut self, id: impl Into<String>) -> Self {
        self.only = Some(id.into());
        self
    }

    /// Stop after the first failing hook
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Add an environment variable for every hook
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Override the command line length used for batching file arguments
    pub fn max_command_length(mut self, max: usize) -> Self {
        self.max_command_length = max;
        self
    }

    /// Files meta hooks treat as the repository contents
    ///
    /// Defaults to every file in the git index.
    pub fn tracked_files(mut self, files: Vec<PathBuf>) -> Self {
        self.tracked_paths = Some(files);
        self
    }

    /// Build the `HookRunner`
    pub fn build(self) -> HookRunner<'a> {
        HookRunner {
            pipeline: self.pipeline,
            root: self.root,
            env_vars: self.env_vars,
            skip: self.skip,
            only: self.only,
            fail_fast: self.fail_fast,
            max_command_length: self.max_command_length,
            tracked: OnceCell::new(),
            tracked_paths: self.tracked_paths,
        }
    }
}

/// Parse a comma separated skip list, ignoring blanks
#[must_use]
pub fn parse_skip_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(all(test, unix))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hookline_config::HookConfig;
    use tempfile::TempDir;

    fn hook(id: &str, entry: &str) -> HookConfig {
        HookConfig {
            id: id.to_string(),
            name: Some(id.to_uppercase()),
            entry: Some(entry.to_string()),
            language: Some(Language::System),
            ..HookConfig::default()
        }
    }

    fn always(id: &str, entry: &str) -> HookConfig {
        HookConfig {
            always_run: Some(true),
            pass_filenames: Some(false),
            ..hook(id, entry)
        }
    }

    fn pipeline(root: &Path, hooks: Vec<HookConfig>) -> Pipeline {
        Pipeline {
            repos: vec![ResolvedRepo {
                kind: RepoKind::Local,
                source: "local".to_string(),
                rev: None,
                root: root.to_path_buf(),
                hooks: hooks.iter().map(|h| h.resolve(&[]).unwrap()).collect(),
            }],
            files: String::new(),
            exclude: "^$".to_string(),
            fail_fast: false,
        }
    }

    fn files(root: &Path, names: &[&str]) -> Changeset {
        for name in names {
            fs::write(root.join(name), "x = 1\n").unwrap();
        }
        Changeset::from_paths(names.iter().copied())
    }

    fn read(root: &Path, name: &str) -> String {
        fs::read_to_string(root.join(name)).unwrap_or_default()
    }

    fn statuses(report: &RunReport) -> Vec<(&str, HookStatus)> {
        report
            .results
            .iter()
            .map(|r| (r.hook_id.as_str(), r.status))
            .collect()
    }

    #[test]
    fn test_hooks_run_in_declaration_order() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![
                always("c", "sh -c 'echo c >> order.log'"),
                always("a", "sh -c 'echo a >> order.log'"),
                always("b", "sh -c 'echo b >> order.log'"),
            ],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        assert_eq!(read(temp.path(), "order.log"), "c\na\nb\n");
        let ids: Vec<_> = report.results.iter().map(|r| r.hook_id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert!(report.is_success());
    }

    #[test]
    fn test_always_run_executes_on_empty_changeset() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![
                always("unit-tests", "sh -c 'echo ran > ran.log'"),
                hook("flake8", "sh -c 'echo ran > flake8.log'"),
            ],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        assert_eq!(
            statuses(&report),
            [
                ("unit-tests", HookStatus::Passed),
                ("flake8", HookStatus::NoFiles)
            ]
        );
        assert_eq!(read(temp.path(), "ran.log"), "ran\n");
        assert!(!temp.path().join("flake8.log").exists());
        assert_eq!(report.results[1].invocations, 0);
    }

    #[test]
    fn test_skipped_hooks_never_run() {
        let temp = TempDir::new().unwrap();
        let mut aliased = always("nb-output-clear", "sh -c 'echo nb > nb.log'");
        aliased.alias = Some("nbclear".to_string());
        let pipeline = pipeline(
            temp.path(),
            vec![
                always("unit-tests", "sh -c 'echo tests > tests.log'"),
                aliased,
                always("doc8", "sh -c 'echo doc8 > doc8.log'"),
            ],
        );

        let report = HookRunner::builder(&pipeline, temp.path())
            .skip(["unit-tests", "nbclear"])
            .build()
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        assert_eq!(
            statuses(&report),
            [
                ("unit-tests", HookStatus::Skipped),
                ("nb-output-clear", HookStatus::Skipped),
                ("doc8", HookStatus::Passed),
            ]
        );
        assert!(!temp.path().join("tests.log").exists());
        assert!(!temp.path().join("nb.log").exists());
        assert!(report.is_success());
    }

    #[test]
    fn test_failures_do_not_stop_siblings() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![
                always("broken", "sh -c 'echo boom; exit 3'"),
                always("after", "sh -c 'echo after > after.log'"),
            ],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        assert!(!report.is_success());
        assert!(!report.stopped_early);
        let broken = report.get("broken").unwrap();
        assert_eq!(broken.status, HookStatus::Failed);
        assert_eq!(broken.exit_code, Some(3));
        assert_eq!(broken.output, "boom\n");
        assert_eq!(read(temp.path(), "after.log"), "after\n");
    }

    #[test]
    fn test_pass_then_fail_is_a_failed_run() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![always("a", "sh -c 'exit 0'"), always("b", "sh -c 'exit 1'")],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        let codes: Vec<_> = report
            .results
            .iter()
            .map(|r| (r.hook_id.as_str(), r.exit_code))
            .collect();
        assert_eq!(codes, [("a", Some(0)), ("b", Some(1))]);
        assert!(!report.is_success());
    }

    #[test]
    fn test_pass_filenames_false_invokes_once_without_files() {
        let temp = TempDir::new().unwrap();
        let changeset = files(temp.path(), &["a.py", "b.py", "c.py"]);
        let pipeline = pipeline(
            temp.path(),
            vec![HookConfig {
                pass_filenames: Some(false),
                ..hook("unit-tests", "sh -c 'echo $# >> args.log' --")
            }],
        );

        let report = HookRunner::builder(&pipeline, temp.path())
            .max_command_length(8)
            .build()
            .run(&changeset, Stage::PreCommit)
            .unwrap();

        assert_eq!(read(temp.path(), "args.log"), "0\n");
        assert_eq!(report.results[0].invocations, 1);
        assert_eq!(report.results[0].status, HookStatus::Passed);
    }

    #[test]
    fn test_matching_files_are_passed() {
        let temp = TempDir::new().unwrap();
        let changeset = files(temp.path(), &["a.py", "b.rst", "c.py"]);
        let pipeline = pipeline(
            temp.path(),
            vec![HookConfig {
                files: Some(r"\.py$".to_string()),
                ..hook("flake8", "sh -c 'echo \"$@\" >> args.log' --")
            }],
        );

        HookRunner::new(&pipeline, temp.path())
            .run(&changeset, Stage::PreCommit)
            .unwrap();

        assert_eq!(read(temp.path(), "args.log"), "a.py c.py\n");
    }

    #[test]
    fn test_long_file_lists_are_batched() {
        let temp = TempDir::new().unwrap();
        let names = ["a1.py", "a2.py", "a3.py", "a4.py", "a5.py"];
        let changeset = files(temp.path(), &names);
        let entry = "sh -c 'echo $# >> count.log' --";

        let batched = pipeline(temp.path(), vec![hook("count", entry)]);
        let report = HookRunner::builder(&batched, temp.path())
            .max_command_length(60)
            .build()
            .run(&changeset, Stage::PreCommit)
            .unwrap();

        let counts: Vec<usize> = read(temp.path(), "count.log")
            .lines()
            .map(|n| n.parse().unwrap())
            .collect();
        assert!(counts.len() > 1);
        assert_eq!(counts.iter().sum::<usize>(), names.len());
        assert_eq!(report.results[0].invocations, counts.len());

    }

    #[test]
    fn test_require_serial_still_batches() {
        let temp = TempDir::new().unwrap();
        let names = ["a1.py", "a2.py", "a3.py", "a4.py", "a5.py"];
        let changeset = files(temp.path(), &names);
        let serial = pipeline(
            temp.path(),
            vec![HookConfig {
                require_serial: Some(true),
                ..hook("count", "sh -c 'echo $# >> count.log' --")
            }],
        );

        let report = HookRunner::builder(&serial, temp.path())
            .max_command_length(60)
            .build()
            .run(&changeset, Stage::PreCommit)
            .unwrap();

        let counts: Vec<usize> = read(temp.path(), "count.log")
            .lines()
            .map(|n| n.parse().unwrap())
            .collect();
        assert!(counts.len() > 1);
        assert_eq!(counts.iter().sum::<usize>(), names.len());
        assert_eq!(report.results[0].status, HookStatus::Passed);
    }

    #[test]
    fn test_fail_fast_stops_remaining_hooks() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![
                HookConfig {
                    fail_fast: Some(true),
                    ..always("first", "sh -c 'exit 1'")
                },
                always("second", "sh -c 'echo x > second.log'"),
            ],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        assert_eq!(statuses(&report), [("first", HookStatus::Failed)]);
        assert!(report.stopped_early);
        assert!(!temp.path().join("second.log").exists());
    }

    #[test]
    fn test_runner_fail_fast() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![always("first", "sh -c 'exit 1'"), always("second", "true")],
        );

        let report = HookRunner::builder(&pipeline, temp.path())
            .fail_fast(true)
            .build()
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert!(report.stopped_early);
    }

    #[test]
    fn test_formatter_modifications_are_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("etl.py"), "x=1\n").unwrap();
        fs::write(temp.path().join("ok.py"), "y = 2\n").unwrap();
        let changeset = Changeset::from_paths(["etl.py", "ok.py"]);

        let pipeline = pipeline(
            temp.path(),
            vec![hook(
                "black",
                r#"sh -c 'for f in "$@"; do sed "s/x=1/x = 1/" "$f" > "$f.tmp" && mv "$f.tmp" "$f"; done' --"#,
            )],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&changeset, Stage::PreCommit)
            .unwrap();

        let black = report.get("black").unwrap();
        assert_eq!(black.exit_code, Some(0));
        assert_eq!(black.status, HookStatus::Failed);
        assert_eq!(black.modified_files, [PathBuf::from("etl.py")]);
        assert_eq!(report.modified_files(), [PathBuf::from("etl.py")]);
        assert_eq!(read(temp.path(), "etl.py"), "x = 1\n");
    }

    #[test]
    fn test_modifications_belong_to_the_hook_that_made_them() {
        let temp = TempDir::new().unwrap();
        let changeset = files(temp.path(), &["etl.py", "ok.py"]);
        let pipeline = pipeline(
            temp.path(),
            vec![
                always("fix-etl", "sh -c 'echo y = 2 >> etl.py'"),
                always("check", "sh -c 'exit 0'"),
                always("fix-ok", "sh -c 'echo z = 3 >> ok.py'"),
            ],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&changeset, Stage::PreCommit)
            .unwrap();

        let modified: Vec<_> = report
            .results
            .iter()
            .map(|r| (r.hook_id.as_str(), r.modified_files.clone()))
            .collect();
        assert_eq!(
            modified,
            [
                ("fix-etl", vec![PathBuf::from("etl.py")]),
                ("check", vec![]),
                ("fix-ok", vec![PathBuf::from("ok.py")]),
            ]
        );
        assert_eq!(report.get("check").unwrap().status, HookStatus::Passed);
    }

    #[test]
    fn test_message_file_rewrites_are_not_modifications() {
        let temp = TempDir::new().unwrap();
        let git_dir = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(".git/COMMIT_EDITMSG"), "wip\n").unwrap();
        let linked = git_dir.path().join("COMMIT_EDITMSG");
        fs::write(&linked, "wip\n").unwrap();

        let pipeline = pipeline(
            temp.path(),
            vec![hook(
                "add-ticket",
                r#"sh -c 'for f in "$@"; do echo "[ETL-1] wip" > "$f"; done' --"#,
            )],
        );

        for message in [PathBuf::from(".git/COMMIT_EDITMSG"), linked.clone()] {
            let report = HookRunner::new(&pipeline, temp.path())
                .run(&Changeset::from_paths([message.clone()]), Stage::CommitMsg)
                .unwrap();
            let result = report.get("add-ticket").unwrap();
            assert_eq!(result.status, HookStatus::Passed, "{}", message.display());
            assert!(result.modified_files.is_empty());
        }
        assert_eq!(fs::read_to_string(&linked).unwrap(), "[ETL-1] wip\n");
    }

    #[test]
    fn test_missing_program_is_an_error_not_a_crash() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![
                always("ghost", "hookline-test-no-such-program --check"),
                always("after", "sh -c 'echo after > after.log'"),
            ],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        let ghost = report.get("ghost").unwrap();
        assert_eq!(ghost.status, HookStatus::Error);
        assert_eq!(ghost.exit_code, None);
        assert!(ghost.output.contains("hookline-test-no-such-program"));
        assert_eq!(report.get("after").unwrap().status, HookStatus::Passed);
        assert!(!report.is_success());
    }

    #[test]
    fn test_hooks_for_other_stages_are_left_out() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![
                HookConfig {
                    stages: Some(vec![Stage::PrePush]),
                    ..always("push-only", "true")
                },
                always("everywhere", "true"),
            ],
        );
        let runner = HookRunner::new(&pipeline, temp.path());

        let commit = runner.run(&Changeset::empty(), Stage::PreCommit).unwrap();
        assert_eq!(statuses(&commit), [("everywhere", HookStatus::Passed)]);

        let push = runner.run(&Changeset::empty(), Stage::PrePush).unwrap();
        assert_eq!(push.results.len(), 2);
        assert_eq!(push.stage, Stage::PrePush);
    }

    #[test]
    fn test_global_exclude_applies_to_every_hook() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("migrations")).unwrap();
        let changeset = files(temp.path(), &["a.py", "migrations/0001.py"]);
        let mut pipeline = pipeline(
            temp.path(),
            vec![hook("flake8", "sh -c 'echo \"$@\" > args.log' --")],
        );
        pipeline.exclude = "^migrations/".to_string();

        HookRunner::new(&pipeline, temp.path())
            .run(&changeset, Stage::PreCommit)
            .unwrap();

        assert_eq!(read(temp.path(), "args.log"), "a.py\n");
    }

    #[test]
    fn test_only_runs_a_single_hook() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![always("a", "true"), always("b", "true")],
        );

        let report = HookRunner::builder(&pipeline, temp.path())
            .only("b")
            .build()
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();
        assert_eq!(statuses(&report), [("b", HookStatus::Passed)]);

        let err = HookRunner::builder(&pipeline, temp.path())
            .only("nope")
            .build()
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_hook_environment() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![always(
                "env",
                "sh -c 'echo $PRE_COMMIT $HOOKLINE_STAGE $EXTRA > env.log'",
            )],
        );

        HookRunner::builder(&pipeline, temp.path())
            .env("EXTRA", "yes")
            .build()
            .run(&Changeset::empty(), Stage::PrePush)
            .unwrap();

        assert_eq!(read(temp.path(), "env.log"), "1 pre-push yes\n");
    }

    #[test]
    fn test_log_file_receives_output() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(
            temp.path(),
            vec![HookConfig {
                log_file: Some(PathBuf::from("hook.log")),
                ..always("noisy", "sh -c 'echo hello'")
            }],
        );

        HookRunner::new(&pipeline, temp.path())
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        assert_eq!(read(temp.path(), "hook.log"), "hello\n");
    }

    #[test]
    fn test_script_language_resolves_against_repo_root() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("tools")).unwrap();
        let script = temp.path().join("tools/check.sh");
        fs::write(&script, "#!/bin/sh\necho script \"$@\"\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let pipeline = pipeline(
            temp.path(),
            vec![HookConfig {
                language: Some(Language::Script),
                args: Some(vec!["--strict".to_string()]),
                ..always("check", "tools/check.sh")
            }],
        );

        let report = HookRunner::new(&pipeline, temp.path())
            .run(&Changeset::empty(), Stage::PreCommit)
            .unwrap();

        assert_eq!(report.results[0].status, HookStatus::Passed);
        assert_eq!(report.results[0].output, "script --strict\n");
    }

    #[test]
    fn test_meta_identity_uses_tracked_files() {
        let temp = TempDir::new().unwrap();
        let changeset = files(temp.path(), &["a.py", "b.py"]);
        let mut pipeline = pipeline(temp.path(), vec![]);
        pipeline.repos[0].kind = RepoKind::Meta;
        pipeline.repos[0].hooks = vec![
            HookConfig {
                verbose: Some(true),
                ..hook("identity", "identity")
            }
            .resolve(&[])
            .unwrap(),
        ];

        let report = HookRunner::builder(&pipeline, temp.path())
            .tracked_files(vec![PathBuf::from("a.py")])
            .build()
            .run(&changeset, Stage::PreCommit)
            .unwrap();

        assert_eq!(report.results[0].output, "a.py\nb.py\n");
        assert!(report.results[0].shows_output());
    }

    #[test]
    fn test_parse_skip_list() {
        assert_eq!(
            parse_skip_list(" unit-tests, ,nb-output-clear "),
            ["unit-tests", "nb-output-clear"]
        );
        assert!(parse_skip_list("").is_empty());
    }
}
