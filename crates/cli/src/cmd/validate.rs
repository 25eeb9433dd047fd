//! Validate configuration files without running anything

use hookline_config::PipelineConfig;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

use crate::error::{CommandError, Result};
use crate::ui::StatusIcon;

/// Check each config file, reporting every problem before failing
pub fn run_validate(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for file in files {
        match validate_file(file) {
            Ok(hooks) => println!(
                "{} {} ({hooks} hooks)",
                StatusIcon::Success.green(),
                file.display()
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}", StatusIcon::Error.red(), e);
            }
        }
    }

    if failed > 0 {
        return Err(CommandError::InvalidConfigs {
            failed,
            total: files.len(),
        });
    }
    Ok(())
}

/// Load one file, returning its hook count
fn validate_file(path: &Path) -> Result<usize> {
    if !path.is_file() {
        return Err(CommandError::ConfigNotFound(path.to_path_buf()));
    }
    Ok(PipelineConfig::load(path)?.hook_count())
}
