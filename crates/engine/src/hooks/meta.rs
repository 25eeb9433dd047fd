//! Hooks provided by `repo: meta`
//!
//! They inspect the configuration itself rather than the changed files, so
//! they see every file tracked by the repository.

use super::languages::Outcome;
use crate::filter::{FileInfo, HookFilter, PathFilter};
use crate::repository::Pipeline;
use hookline_config::{HookDefinition, Language, RepoKind};
use hookline_core::{Error, Result};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Exclude pattern that matches nothing
const MATCH_NONE: &str = "^$";

/// Run the meta hook `id`
///
/// `files` are the files passed to the hook; `tracked` is every file in the
/// repository.
pub(crate) fn run(
    id: &str,
    pipeline: &Pipeline,
    files: &[PathBuf],
    tracked: &[FileInfo],
) -> Result<Outcome> {
    match id {
        "identity" => Ok(identity(files)),
        "check-hooks-apply" => check_hooks_apply(pipeline, tracked),
        "check-useless-excludes" => check_useless_excludes(pipeline, tracked),
        other => Err(Error::HookExecution(format!("Unknown meta hook '{other}'"))),
    }
}

fn identity(files: &[PathBuf]) -> Outcome {
    let mut output = String::new();
    for file in files {
        let _ = writeln!(output, "{}", file.display());
    }
    Outcome::new(false, output)
}

/// Hooks from non-meta repositories that are expected to select files
fn checked_hooks(pipeline: &Pipeline) -> impl Iterator<Item = &HookDefinition> {
    pipeline
        .hooks()
        .filter(|(repo, _)| repo.kind != RepoKind::Meta)
        .map(|(_, hook)| hook)
}

fn check_hooks_apply(pipeline: &Pipeline, tracked: &[FileInfo]) -> Result<Outcome> {
    let global = PathFilter::new(&pipeline.files, &pipeline.exclude)?;
    let candidates = global.apply(tracked);

    let mut output = String::new();
    for hook in checked_hooks(pipeline) {
        if hook.always_run || hook.language == Language::Fail {
            continue;
        }
        let filter = HookFilter::from_hook(hook)?;
        if !candidates.iter().any(|file| filter.matches(file)) {
            let _ = writeln!(output, "{} does not apply to this repository", hook.id);
        }
    }

    Ok(Outcome::new(!output.is_empty(), output))
}

fn check_useless_excludes(pipeline: &Pipeline, tracked: &[FileInfo]) -> Result<Outcome> {
    let mut output = String::new();

    if pipeline.exclude != MATCH_NONE {
        let global = PathFilter::new("", &pipeline.exclude)?;
        if !tracked.iter().any(|file| global.excludes(&file.match_path())) {
            let _ = writeln!(
                output,
                "The global exclude pattern '{}' does not match any files",
                pipeline.exclude
            );
        }
    }

    let global = PathFilter::new(&pipeline.files, &pipeline.exclude)?;
    let candidates = global.apply(tracked);

    for hook in checked_hooks(pipeline) {
        if hook.exclude == MATCH_NONE {
            continue;
        }

        // Files the hook would see without its exclude
        let mut probe = hook.clone();
        probe.exclude = MATCH_NONE.to_string();
        let selected = HookFilter::from_hook(&probe)?;
        let own = HookFilter::from_hook(hook)?;

        let excludes_something = candidates
            .iter()
            .filter(|file| selected.matches(file))
            .any(|file| own.paths().excludes(&file.match_path()));

        if !excludes_something {
            let _ = writeln!(
                output,
                "The exclude pattern '{}' for {} does not match any files",
                hook.exclude, hook.id
            );
        }
    }

    Ok(Outcome::new(!output.is_empty(), output))
}
