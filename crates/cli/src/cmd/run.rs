//! Run command implementation
//!
//! Collects the changeset, runs the pipeline for one stage and prints the
//! report. A failing hook is not an error: the report says what failed and
//! the exit code is 1.

use clap::Args;
use hookline_engine::{Changeset, HookRunner, RunReport, Stage};
use owo_colors::OwoColorize;
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui::{OutputFormat, StatusIcon, render_report};

/// All-zero object id git uses for a ref that does not exist
const NULL_SHA: &str = "0000000000000000000000000000000000000000";

/// Run hooks against changed files
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Only run the hook with this id or alias
    #[arg(value_name = "HOOK_ID")]
    pub hook: Option<String>,

    /// Run on every tracked file instead of the staged ones
    #[arg(short, long, conflicts_with_all = ["files", "from_ref"])]
    pub all_files: bool,

    /// Run on these files
    #[arg(long, num_args = 1.., value_name = "FILE", conflicts_with = "from_ref")]
    pub files: Vec<PathBuf>,

    /// Run on files changed since this ref (with --to-ref)
    #[arg(long, alias = "source", requires = "to_ref", value_name = "REF")]
    pub from_ref: Option<String>,

    /// Run on files changed up to this ref (with --from-ref)
    #[arg(long, alias = "origin", requires = "from_ref", value_name = "REF")]
    pub to_ref: Option<String>,

    /// Stage whose hooks run
    #[arg(long, default_value = "pre-commit", value_name = "STAGE")]
    pub hook_stage: Stage,

    /// Skip hooks by id or alias (repeatable, comma separated)
    #[arg(long, value_name = "HOOK_ID", value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Also skip the hooks listed under `ci.skip`
    #[arg(long)]
    pub ci: bool,

    /// Stop after the first failing hook
    #[arg(long)]
    pub fail_fast: bool,

    /// Add files rewritten by hooks back to the index
    #[arg(long)]
    pub restage: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Arguments git passes to the hook script
    #[arg(last = true, hide = true)]
    pub hook_args: Vec<String>,
}

/// Refs being pushed, as git writes them to a pre-push hook's stdin
///
/// Returns `(from, to)` for the first update that sends commits. A new
/// remote branch has no `from`; a deletion sends nothing and is passed over.
pub fn parse_push_updates(input: impl BufRead) -> Result<Option<(Option<String>, String)>> {
    for line in input.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [_, local_sha, _, remote_sha] = fields.as_slice() else {
            continue;
        };
        if *local_sha == NULL_SHA {
            continue;
        }
        let from = (*remote_sha != NULL_SHA).then(|| (*remote_sha).to_string());
        return Ok(Some((from, (*local_sha).to_string())));
    }
    Ok(None)
}

impl RunCommand {
    /// Files this run looks at, plus the ref range they came from
    fn changeset(&self, context: &RuntimeContext) -> Result<(Changeset, Option<(String, String)>)> {
        let git = &context.repo;

        if !self.files.is_empty() {
            let files = self
                .files
                .iter()
                .map(|f| context.repo_relative(f))
                .collect::<Result<Vec<_>>>()?;
            return Ok((Changeset::from_paths(files), None));
        }
        if self.all_files {
            return Ok((git.all_files()?, None));
        }
        if let (Some(from), Some(to)) = (&self.from_ref, &self.to_ref) {
            let changes = git.changed_between(from, to)?;
            return Ok((changes, Some((from.clone(), to.clone()))));
        }

        match self.hook_stage {
            // git passes the message file as the first argument
            Stage::CommitMsg | Stage::PrepareCommitMsg => {
                let files = self
                    .hook_args
                    .first()
                    .map(|msg| context.hook_file(Path::new(msg)));
                Ok((Changeset::from_paths(files), None))
            }
            Stage::PrePush if !self.hook_args.is_empty() => {
                match parse_push_updates(io::stdin().lock())? {
                    Some((Some(from), to)) => {
                        let changes = git.changed_between(&from, &to)?;
                        Ok((changes, Some((from, to))))
                    }
                    // A branch new to the remote: check everything it carries
                    Some((None, _)) => Ok((git.all_files()?, None)),
                    None => Ok((Changeset::empty(), None)),
                }
            }
            Stage::PreCommit | Stage::PreMergeCommit | Stage::PrePush | Stage::Manual => {
                Ok((git.staged_files()?, None))
            }
            _ => Ok((Changeset::empty(), None)),
        }
    }
}

impl Command for RunCommand {
    type Output = RunReport;

    fn execute(&self, context: &RuntimeContext) -> Result<RunReport> {
        let config = context.load_config()?;
        let pipeline = context.resolve_pipeline(&config)?;
        let (changeset, range) = self.changeset(context)?;
        debug!(
            files = changeset.len(),
            stage = %self.hook_stage,
            source = ?changeset.source(),
            "Collected changeset"
        );

        let mut builder = HookRunner::builder(&pipeline, context.root())
            .skip_from_env()
            .skip(self.skip.iter().cloned())
            .fail_fast(self.fail_fast);
        if self.ci {
            builder = builder.skip(config.ci_skip().iter().cloned());
        }
        if let Some(hook) = &self.hook {
            builder = builder.only(hook.clone());
        }
        if let Some((from, to)) = range {
            builder = builder
                .env("PRE_COMMIT_FROM_REF", from)
                .env("PRE_COMMIT_TO_REF", to);
        }

        let report = builder.build().run(&changeset, self.hook_stage)?;

        let modified = report.modified_files();
        if self.restage && !modified.is_empty() {
            context.repo.stage(&modified)?;
            debug!(files = modified.len(), "Re-staged modified files");
        }

        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
                println!("{json}");
            }
            OutputFormat::Simple => {
                let color = io::stdout().is_terminal();
                print!("{}", render_report(&report, color));
                if self.restage && !modified.is_empty() {
                    let note = format!("Re-staged {} modified file(s)", modified.len());
                    if color {
                        println!("{} {}", StatusIcon::Info, note.cyan());
                    } else {
                        println!("{} {note}", StatusIcon::Info);
                    }
                }
            }
        }

        Ok(report)
    }
}
