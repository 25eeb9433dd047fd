//! List command implementation
//!
//! Shows every configured hook with the repository it resolves from.

use clap::Args;
use hookline_engine::{Pipeline, Stage};
use owo_colors::OwoColorize;
use std::fmt::Write as _;
use std::io::IsTerminal;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui::OutputFormat;

/// List configured hooks
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only list hooks that run at this stage
    #[arg(long, value_name = "STAGE")]
    pub hook_stage: Option<Stage>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl ListCommand {
    fn json(&self, pipeline: &Pipeline) -> Result<String> {
        let hooks: Vec<_> = pipeline
            .hooks()
            .filter(|(_, hook)| self.hook_stage.is_none_or(|stage| hook.runs_at(stage)))
            .map(|(repo, hook)| {
                serde_json::json!({
                    "repo": repo.source,
                    "rev": repo.rev,
                    "hook": hook,
                })
            })
            .collect();
        Ok(serde_json::to_string_pretty(&hooks).map_err(anyhow::Error::from)?)
    }

    fn simple(&self, pipeline: &Pipeline, color: bool) -> String {
        let mut out = String::new();
        for repo in &pipeline.repos {
            let hooks: Vec<_> = repo
                .hooks
                .iter()
                .filter(|hook| self.hook_stage.is_none_or(|stage| hook.runs_at(stage)))
                .collect();
            if hooks.is_empty() {
                continue;
            }

            let header = match &repo.rev {
                Some(rev) => format!("{} @ {rev}", repo.source),
                None => repo.source.clone(),
            };
            if color {
                let _ = writeln!(out, "{}", header.bold());
            } else {
                let _ = writeln!(out, "{header}");
            }

            for hook in hooks {
                let stages: Vec<_> = hook.stages.iter().map(Stage::name).collect();
                let detail = format!("({}, {})", hook.language, stages.join(", "));
                if color {
                    let _ = writeln!(
                        out,
                        "  • {} {} {}",
                        hook.id.green(),
                        hook.name,
                        detail.dimmed()
                    );
                } else {
                    let _ = writeln!(out, "  • {} {} {detail}", hook.id, hook.name);
                }
            }
        }
        out
    }
}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let config = context.load_config()?;
        let pipeline = context.resolve_pipeline(&config)?;

        match self.format {
            OutputFormat::Json => println!("{}", self.json(&pipeline)?),
            OutputFormat::Simple => {
                print!("{}", self.simple(&pipeline, std::io::stdout().is_terminal()));
            }
        }
        Ok(())
    }
}
