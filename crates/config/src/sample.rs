//! Sample configuration printed by `hookline sample-config`

/// A starter `.pre-commit-config.yaml`
pub const SAMPLE_CONFIG: &str = r#"# Hooks run in the order they are listed, one at a time.
# See `hookline run --help` for how the changeset is chosen.
repos:
  - repo: https://github.com/pre-commit/pre-commit-hooks
    rev: v4.6.0
    hooks:
      - id: trailing-whitespace
      - id: end-of-file-fixer
      - id: check-yaml
      - id: check-added-large-files

  - repo: local
    hooks:
      - id: no-debug-prints
        name: Forbid leftover debug prints
        language: pygrep
        entry: '\bdbg!\('
        types: [rust]

      - id: unit-tests
        name: Unit tests
        language: system
        entry: cargo test --quiet
        always_run: true
        pass_filenames: false
        stages: [pre-push]

ci:
  autoupdate_schedule: monthly
  skip: [unit-tests]
"#;
