//! hookline CLI library
//!
//! This library contains all the CLI logic for hookline, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hookline_engine::RepoStore;
use std::path::PathBuf;
use std::sync::LazyLock;

use command::Command;
use common::RuntimeContext;

/// `--version` output with the build metadata vergen embeds
static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    let mut version = env!("CARGO_PKG_VERSION").to_string();
    if let Some(sha) = option_env!("VERGEN_GIT_SHA") {
        version.push_str(&format!(" ({sha})"));
    }
    if let Some(rustc) = option_env!("VERGEN_RUSTC_SEMVER") {
        version.push_str(&format!("\nrustc {rustc}"));
    }
    if let Some(built) = option_env!("VERGEN_BUILD_TIMESTAMP") {
        version.push_str(&format!("\nbuilt {built}"));
    }
    version
});

/// hookline - run git hook pipelines
#[derive(Parser)]
#[command(name = "hookline")]
#[command(about = "Run git hook pipelines from .pre-commit-config.yaml")]
#[command(version, long_version = LONG_VERSION.as_str())]
#[command(long_about = "Run git hook pipelines from .pre-commit-config.yaml

hookline reads an ordered list of hook repositories, selects the hooks
registered for a git stage and runs them one at a time against the
changed files, reporting each hook as passed, failed or skipped.

Hooks that rewrite files fail the run so the changes can be reviewed.
Set SKIP=id1,id2 to skip hooks for one invocation.")]
pub struct Cli {
    /// Path to the config file (default: .pre-commit-config.yaml at the repository root)
    #[arg(short, long, global = true, env = "HOOKLINE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, global = true, env = "HOOKLINE_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for hookline CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Run hooks for a stage
    #[command(long_about = "Run hooks for a stage

By default the staged files are checked. Use --all-files, --files or
--from-ref/--to-ref to choose a different changeset.

Exits with status 1 when any hook failed or errored.")]
    Run(cmd::run::RunCommand),

    /// List configured hooks
    List(cmd::list::ListCommand),

    /// Check config files for errors
    ValidateConfig {
        /// Files to check (default: the active config file)
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Print a starter .pre-commit-config.yaml
    SampleConfig,

    /// Install hookline into the repository's git hooks
    Install(cmd::install::InstallCommand),

    /// Remove hookline from the repository's git hooks
    Uninstall(cmd::install::UninstallCommand),

    /// Remove cloned hook repositories from the cache
    Clean,
}

/// Exit code for a run where a hook failed
const EXIT_HOOKS_FAILED: i32 = 1;

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine the current directory")
}

fn discover(cli: &Cli) -> Result<RuntimeContext> {
    let cwd = current_dir()?;
    Ok(RuntimeContext::discover(&cwd, cli.config.as_deref())?)
}

/// Run the CLI, returning the process exit code
///
/// # Errors
///
/// Returns an error if:
/// - Logging initialization fails
/// - The working directory is not in a git repository
/// - Configuration loading fails
/// - Command execution fails
///
/// Failing hooks are not errors; they produce exit code 1.
pub fn run(cli: Cli) -> Result<i32> {
    hookline_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    match &cli.command {
        Commands::Run(run_cmd) => {
            let report = run_cmd.execute(&discover(&cli)?)?;
            if !report.is_success() {
                return Ok(EXIT_HOOKS_FAILED);
            }
        }
        Commands::List(list_cmd) => list_cmd.execute(&discover(&cli)?)?,
        Commands::Install(install_cmd) => {
            install_cmd.execute(&discover(&cli)?)?;
        }
        Commands::Uninstall(uninstall_cmd) => {
            uninstall_cmd.execute(&discover(&cli)?)?;
        }
        // No repository needed below
        Commands::SampleConfig => cmd::sample::run_sample(),
        Commands::Clean => {
            let store = RepoStore::from_env()?;
            cmd::clean::run_clean(&store)?;
        }
        Commands::ValidateConfig { files } => {
            let files = if files.is_empty() {
                vec![
                    cli.config
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(hookline_config::DEFAULT_CONFIG_FILE)),
                ]
            } else {
                files.clone()
            };
            cmd::validate::run_validate(&files)?;
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::CommandFactory;
    use hookline_engine::Stage;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_long_version_starts_with_package_version() {
        assert!(LONG_VERSION.starts_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hookline",
            "run",
            "--all-files",
            "-v",
            "--config",
            "ci.yaml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ci.yaml")));
    }

    #[test]
    fn test_install_hook_types() {
        let cli = Cli::try_parse_from([
            "hookline",
            "install",
            "--hook-type",
            "pre-commit",
            "-t",
            "commit-msg",
            "--overwrite",
        ])
        .unwrap();
        let Commands::Install(install) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(install.hook_types, [Stage::PreCommit, Stage::CommitMsg]);
        assert!(install.overwrite);
    }

    #[test]
    fn test_validate_config_files() {
        let cli = Cli::try_parse_from(["hookline", "validate-config", "a.yaml", "b.yaml"]).unwrap();
        let Commands::ValidateConfig { files } = cli.command else {
            panic!("expected validate-config");
        };
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_list_stage_filter() {
        let cli =
            Cli::try_parse_from(["hookline", "list", "--hook-stage", "manual", "--format", "json"])
                .unwrap();
        let Commands::List(list) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(list.hook_stage, Some(Stage::Manual));
        assert_eq!(list.format, ui::OutputFormat::Json);
    }
}
