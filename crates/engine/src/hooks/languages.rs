//! Built-in execution strategies
//!
//! `fail` and `pygrep` hooks never start a process; they are evaluated here.
//! Command hooks use [`partition`] to keep each command line under the
//! platform limit.

use hookline_config::HookDefinition;
use hookline_core::{Error, Result};
use regex::bytes::{Regex, RegexBuilder};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Exit status and output of an evaluated hook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub exit_code: i32,
    pub output: String,
    pub invocations: usize,
}

impl Outcome {
    pub(crate) fn new(failed: bool, output: String) -> Self {
        Self {
            exit_code: i32::from(failed),
            output,
            invocations: 1,
        }
    }
}

/// Split `files` into batches whose command line fits in `max_len` bytes
///
/// `base_len` is the length of the program and its fixed arguments. A file
/// too long to share a batch gets one of its own. Always returns at least one
/// (possibly empty) batch.
pub(crate) fn partition(base_len: usize, files: &[PathBuf], max_len: usize) -> Vec<Vec<PathBuf>> {
    if files.is_empty() {
        return vec![files.to_vec()];
    }

    let mut batches = Vec::new();
    let mut current = Vec::new();
    let mut current_len = base_len;

    for file in files {
        // One separator plus the argument itself
        let arg_len = file.as_os_str().len() + 1;
        if !current.is_empty() && current_len + arg_len > max_len {
            batches.push(std::mem::take(&mut current));
            current_len = base_len;
        }
        current_len += arg_len;
        current.push(file.clone());
    }
    batches.push(current);

    batches
}

/// `language: fail`
///
/// Prints `entry` followed by the offending files.
pub(crate) fn fail(hook: &HookDefinition, files: &[PathBuf]) -> Outcome {
    let mut output = hook.entry.trim_end().to_string();
    output.push_str("\n\n");
    for file in files {
        let _ = writeln!(output, "{}", file.display());
    }
    Outcome::new(true, output)
}

#[derive(Debug, Default)]
struct PygrepOptions {
    ignore_case: bool,
    multiline: bool,
    negate: bool,
}

impl PygrepOptions {
    fn parse(hook: &HookDefinition) -> Result<Self> {
        let mut options = Self::default();
        for arg in &hook.args {
            match arg.as_str() {
                "-i" | "--ignore-case" => options.ignore_case = true,
                "--multiline" => options.multiline = true,
                "--negate" => options.negate = true,
                other => {
                    return Err(Error::HookExecution(format!(
                        "Hook '{}': unsupported pygrep argument '{other}'",
                        hook.id
                    )));
                }
            }
        }
        Ok(options)
    }

    fn build(&self, pattern: &str) -> Result<Regex> {
        RegexBuilder::new(pattern)
            .case_insensitive(self.ignore_case)
            .multi_line(self.multiline)
            .dot_matches_new_line(self.multiline)
            .build()
            .map_err(|e| Error::invalid_pattern(pattern, e))
    }
}

/// `language: pygrep`
///
/// `entry` is searched in each file. Matches are reported as
/// `path:line:content` and fail the hook; with `--negate` the hook instead
/// fails for every file that does *not* match.
pub(crate) fn pygrep(hook: &HookDefinition, root: &Path, files: &[PathBuf]) -> Result<Outcome> {
    let options = PygrepOptions::parse(hook)?;
    let regex = options.build(&hook.entry)?;

    let mut output = String::new();
    let mut failed = false;

    for file in files {
        let content = fs::read(root.join(file))?;
        let hits = if options.multiline {
            search_whole(&regex, &content)
        } else {
            search_lines(&regex, &content)
        };

        if options.negate {
            if hits.is_empty() {
                failed = true;
                let _ = writeln!(output, "{}", file.display());
            }
        } else {
            for (line, text) in &hits {
                failed = true;
                let _ = writeln!(output, "{}:{line}:{text}", file.display());
            }
        }
    }

    Ok(Outcome::new(failed, output))
}

/// Matching lines as (1-based line number, text)
fn search_lines(regex: &Regex, content: &[u8]) -> Vec<(usize, String)> {
    content
        .split(|b| *b == b'\n')
        .enumerate()
        .filter(|(_, line)| regex.is_match(line))
        .map(|(index, line)| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            (index + 1, String::from_utf8_lossy(line).into_owned())
        })
        .collect()
}

/// Matches anywhere in the file, reported at the line they start on
fn search_whole(regex: &Regex, content: &[u8]) -> Vec<(usize, String)> {
    regex
        .find_iter(content)
        .map(|m| {
            let line = content[..m.start()].iter().filter(|b| **b == b'\n').count() + 1;
            (line, String::from_utf8_lossy(m.as_bytes()).into_owned())
        })
        .collect()
}
