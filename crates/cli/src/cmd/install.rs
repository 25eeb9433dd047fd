//! Install and uninstall git hook scripts
//!
//! Each script hands control to `hookline run --hook-stage <stage>`. A hook
//! already present that hookline did not write is kept as `<name>.legacy`,
//! run before hookline, and put back on uninstall.

use clap::Args;
use hookline_engine::Stage;
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::ui::StatusIcon;

/// Line identifying scripts written by hookline
pub const MARKER: &str = "# hookline-managed-hook";

/// What installing one hook did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installed {
    /// Wrote a fresh script
    New(PathBuf),
    /// Moved an existing foreign hook aside first
    Migrated {
        /// The installed script
        path: PathBuf,
        /// Where the previous hook now lives
        legacy: PathBuf,
    },
}

/// What uninstalling one hook did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uninstalled {
    /// No hookline script there
    NotInstalled,
    /// Removed the script
    Removed(PathBuf),
    /// Removed the script and put the previous hook back
    Restored(PathBuf),
}

/// Install hookline as git hook scripts
#[derive(Debug, Args)]
pub struct InstallCommand {
    /// Hook types to install (default: `default_install_hook_types` or pre-commit)
    #[arg(short = 't', long = "hook-type", value_name = "STAGE")]
    pub hook_types: Vec<Stage>,

    /// Replace existing hooks instead of keeping them as `.legacy`
    #[arg(short = 'f', long)]
    pub overwrite: bool,
}

/// Remove hookline's git hook scripts
#[derive(Debug, Args)]
pub struct UninstallCommand {
    /// Hook types to uninstall (default: `default_install_hook_types` or pre-commit)
    #[arg(short = 't', long = "hook-type", value_name = "STAGE")]
    pub hook_types: Vec<Stage>,
}

/// Hook types to act on when none were given
fn hook_types(requested: &[Stage], context: &RuntimeContext) -> Result<Vec<Stage>> {
    if !requested.is_empty() {
        return Ok(requested.to_vec());
    }
    if context.config_path.is_file() {
        let configured = context.load_config()?.default_install_hook_types;
        if !configured.is_empty() {
            return Ok(configured);
        }
    }
    Ok(vec![Stage::PreCommit])
}

/// Check if the file at `path` was written by hookline
pub fn is_managed(path: &Path) -> bool {
    fs::read_to_string(path).is_ok_and(|content| content.contains(MARKER))
}

fn legacy_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".legacy");
    path.with_file_name(name)
}

/// Shell script installed for `stage`
///
/// `program` is the hookline binary to prefer; the script falls back to
/// `hookline` on `PATH` when it has moved.
pub fn hook_script(stage: Stage, program: &Path, config: Option<&Path>) -> String {
    let name = stage.name();
    let program = shell_words::quote(&program.to_string_lossy()).into_owned();
    let mut args = format!("run --hook-stage {name}");
    if let Some(config) = config {
        args.push_str(" --config ");
        args.push_str(&shell_words::quote(&config.to_string_lossy()));
    }

    // git feeds pre-push the refs on stdin; both hooks need to see them
    let body = if stage == Stage::PrePush {
        format!(
            r#"input="$(cat)"
if [ -x "$HERE/{name}.legacy" ]; then
    printf '%s\n' "$input" | "$HERE/{name}.legacy" "$@" || exit $?
fi
printf '%s\n' "$input" | "$HOOKLINE" {args} -- "$@""#
        )
    } else {
        format!(
            r#"if [ -x "$HERE/{name}.legacy" ]; then
    "$HERE/{name}.legacy" "$@" || exit $?
fi
exec "$HOOKLINE" {args} -- "$@""#
        )
    };

    format!(
        r#"#!/bin/sh
{MARKER}
# Regenerate with `hookline install --hook-type {name}`
HERE="$(cd "$(dirname "$0")" && pwd)"
HOOKLINE={program}
if [ ! -x "$HOOKLINE" ]; then
    HOOKLINE=hookline
fi
{body}
"#
    )
}

/// Write `script` as the `stage` hook in `hooks_dir`
pub fn install_hook(
    hooks_dir: &Path,
    stage: Stage,
    script: &str,
    overwrite: bool,
) -> Result<Installed> {
    if !stage.is_installable() {
        return Err(CommandError::NotInstallable(stage.name().to_string()));
    }
    fs::create_dir_all(hooks_dir)?;

    let path = hooks_dir.join(stage.name());
    let legacy = legacy_path(&path);

    let mut migrated = false;
    if path.symlink_metadata().is_ok() && !is_managed(&path) {
        fs::rename(&path, &legacy)?;
        migrated = true;
    }
    if overwrite && legacy.exists() {
        fs::remove_file(&legacy)?;
        migrated = false;
    }

    fs::write(&path, script)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
    debug!(path = %path.display(), migrated, "Installed hook script");

    Ok(if migrated {
        Installed::Migrated { path, legacy }
    } else {
        Installed::New(path)
    })
}

/// Remove the `stage` hook from `hooks_dir` if hookline wrote it
pub fn uninstall_hook(hooks_dir: &Path, stage: Stage) -> Result<Uninstalled> {
    let path = hooks_dir.join(stage.name());
    if !path.exists() || !is_managed(&path) {
        return Ok(Uninstalled::NotInstalled);
    }

    fs::remove_file(&path)?;
    let legacy = legacy_path(&path);
    if legacy.exists() {
        fs::rename(&legacy, &path)?;
        return Ok(Uninstalled::Restored(path));
    }
    Ok(Uninstalled::Removed(path))
}

impl Command for InstallCommand {
    type Output = Vec<Installed>;

    fn execute(&self, context: &RuntimeContext) -> Result<Vec<Installed>> {
        let hooks_dir = context.repo.hooks_dir()?;
        let program = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("hookline"));
        let default_config = context.root().join(hookline_config::DEFAULT_CONFIG_FILE);
        let config = (context.config_path != default_config).then_some(context.config_path.as_path());

        let mut results = Vec::new();
        for stage in hook_types(&self.hook_types, context)? {
            let script = hook_script(stage, &program, config);
            let installed = install_hook(&hooks_dir, stage, &script, self.overwrite)?;
            match &installed {
                Installed::New(path) => {
                    println!(
                        "{} hookline installed at {}",
                        StatusIcon::Success.green(),
                        path.display().cyan()
                    );
                }
                Installed::Migrated { path, legacy } => {
                    println!(
                        "{} Existing hook moved to {}; it still runs first",
                        StatusIcon::Warning.yellow(),
                        legacy.display().cyan()
                    );
                    println!(
                        "{} hookline installed at {}",
                        StatusIcon::Success.green(),
                        path.display().cyan()
                    );
                }
            }
            results.push(installed);
        }
        Ok(results)
    }
}

impl Command for UninstallCommand {
    type Output = Vec<Uninstalled>;

    fn execute(&self, context: &RuntimeContext) -> Result<Vec<Uninstalled>> {
        let hooks_dir = context.repo.hooks_dir()?;

        let mut results = Vec::new();
        for stage in hook_types(&self.hook_types, context)? {
            let removed = uninstall_hook(&hooks_dir, stage)?;
            match &removed {
                Uninstalled::NotInstalled => {
                    println!(
                        "{} No hookline {} hook to remove",
                        StatusIcon::Info,
                        stage.name()
                    );
                }
                Uninstalled::Removed(path) => {
                    println!("{} {} uninstalled", StatusIcon::Success.green(), path.display());
                }
                Uninstalled::Restored(path) => {
                    println!(
                        "{} {} uninstalled, previous hook restored",
                        StatusIcon::Success.green(),
                        path.display()
                    );
                }
            }
            results.push(removed);
        }
        Ok(results)
    }
}
