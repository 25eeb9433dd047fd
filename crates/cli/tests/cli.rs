//! End-to-end tests of the `hookline` binary

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::panic)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const CONFIG: &str = r#"
repos:
  - repo: local
    hooks:
      - id: no-todo
        name: no TODO markers
        entry: 'TODO'
        language: pygrep
        types: [python]
      - id: unit-tests
        name: Unit tests
        entry: sh -c 'echo ran'
        language: system
        always_run: true
        pass_filenames: false
"#;

struct Repo {
    temp: TempDir,
    home: TempDir,
    repo: git2::Repository,
}

impl Repo {
    fn new(config: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let repo = git2::Repository::init(temp.path()).unwrap();
        let home = TempDir::new().unwrap();
        fs::write(temp.path().join(".pre-commit-config.yaml"), config).unwrap();
        Self { temp, home, repo }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn stage(&self, rel: &str, content: &str) {
        fs::write(self.root().join(rel), content).unwrap();
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(rel)).unwrap();
        index.write().unwrap();
    }

    fn commit(&self, message: &str) -> git2::Oid {
        let tree_id = self.repo.index().unwrap().write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_hookline"));
        cmd.args(args)
            .current_dir(self.root())
            .env("HOOKLINE_HOME", self.home.path())
            .env_remove("HOOKLINE_CONFIG")
            .env_remove("SKIP");
        cmd
    }

    fn hookline(&self, args: &[&str]) -> Output {
        self.command(args).output().unwrap()
    }

    fn hookline_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_failing_hook_exits_one() {
    let repo = Repo::new(CONFIG);
    repo.stage("etl.py", "x = 1  # TODO remove\n");

    let output = repo.hookline(&["run"]);
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("no TODO markers..."));
    assert!(lines[0].ends_with("Failed"));
    assert!(out.contains("- hook id: no-todo"));
    assert!(out.contains("etl.py:1:x = 1  # TODO remove"));
    assert!(out.contains("Unit tests..."));
}

#[test]
fn test_passing_run_exits_zero() {
    let repo = Repo::new(CONFIG);
    repo.stage("etl.py", "x = 1\n");

    let output = repo.hookline(&["run"]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
}

#[test]
fn test_skip_flag() {
    let repo = Repo::new(CONFIG);
    repo.stage("etl.py", "x = 1  # TODO\n");

    let output = repo.hookline(&["run", "--skip", "no-todo"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).lines().next().unwrap().ends_with("Skipped"));
}

#[test]
fn test_json_report() {
    let repo = Repo::new(CONFIG);
    repo.stage("etl.py", "x = 1\n");

    let output = repo.hookline(&["run", "--format", "json"]);
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stage"], "pre-commit");
    assert_eq!(report["results"][0]["hook_id"], "no-todo");
    assert_eq!(report["results"][0]["status"], "passed");
    assert_eq!(report["results"][1]["output"], "ran\n");
}

#[test]
fn test_malformed_config_runs_nothing() {
    let repo = Repo::new(
        "repos:\n  - repo: local\n    hooks:\n      - id: x\n        name: X\n        entry: touch ran\n        language: system\n        files: '(['\n",
    );
    repo.stage("a.py", "a\n");

    let output = repo.hookline(&["run", "--all-files"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid pattern"));
    assert!(!repo.root().join("ran").exists());
}

#[test]
fn test_validate_and_sample_config() {
    let repo = Repo::new(CONFIG);
    assert!(repo.hookline(&["validate-config"]).status.success());

    let sample = repo.hookline(&["sample-config"]);
    assert!(sample.status.success());
    let path = repo.root().join("sample.yaml");
    fs::write(&path, &sample.stdout).unwrap();
    assert!(
        repo.hookline(&["validate-config", path.to_str().unwrap()])
            .status
            .success()
    );
}

#[test]
fn test_install_and_uninstall() {
    let repo = Repo::new(CONFIG);
    let hook = repo.root().join(".git/hooks/pre-commit");

    assert!(repo.hookline(&["install"]).status.success());
    let script = fs::read_to_string(&hook).unwrap();
    assert!(script.contains("run --hook-stage pre-commit"));

    assert!(repo.hookline(&["uninstall"]).status.success());
    assert!(!hook.exists());
}

#[test]
fn test_outside_a_repository() {
    let temp = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_hookline"))
        .arg("run")
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not inside a git repository"));
}

#[test]
fn test_commit_msg_hook_gets_only_the_message_file() {
    let repo = Repo::new(
        r#"
repos:
  - repo: local
    hooks:
      - id: add-ticket
        name: Add ticket prefix
        entry: sh -c 'echo "$@"; msg=$(cat "$1"); printf "[ETL-1] %s\n" "$msg" > "$1"' --
        language: system
        stages: [commit-msg]
"#,
    );
    repo.stage("etl.py", "x = 1\n");
    fs::write(repo.root().join(".git/COMMIT_EDITMSG"), "Load plants\n").unwrap();

    let output = repo.hookline(&[
        "run",
        "--hook-stage",
        "commit-msg",
        "--format",
        "json",
        "--",
        ".git/COMMIT_EDITMSG",
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["results"][0]["status"], "passed");
    assert_eq!(report["results"][0]["output"], ".git/COMMIT_EDITMSG\n");
    assert_eq!(
        fs::read_to_string(repo.root().join(".git/COMMIT_EDITMSG")).unwrap(),
        "[ETL-1] Load plants\n"
    );
}

#[test]
fn test_pre_push_checks_the_pushed_range() {
    let repo = Repo::new(
        r#"
repos:
  - repo: local
    hooks:
      - id: show-range
        name: Show pushed range
        entry: sh -c 'echo "$PRE_COMMIT_FROM_REF..$PRE_COMMIT_TO_REF $*"' --
        language: system
        stages: [pre-push]
"#,
    );
    repo.stage("old.py", "a = 1\n");
    let base = repo.commit("base");
    repo.stage("new.py", "b = 2\n");
    let head = repo.commit("feature");

    let input = format!("refs/heads/main {head} refs/heads/main {base}\n");
    let output = repo.hookline_with_stdin(
        &[
            "run",
            "--hook-stage",
            "pre-push",
            "--format",
            "json",
            "--",
            "origin",
            "https://example.com/pudl.git",
        ],
        &input,
    );
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        report["results"][0]["output"],
        format!("{base}..{head} new.py\n")
    );
}
