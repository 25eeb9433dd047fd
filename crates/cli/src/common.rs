//! Shared state for commands that operate on a repository

use crate::error::{CommandError, Result};
use hookline_config::{DEFAULT_CONFIG_FILE, PipelineConfig};
use hookline_engine::{GitRepo, Pipeline, RepoStore};
use std::path::{Component, Path, PathBuf};

/// Repository and configuration a command runs against
pub struct RuntimeContext {
    /// The repository containing the working directory
    pub repo: GitRepo,
    /// Config file location (`--config` or the default at the repository root)
    pub config_path: PathBuf,
    /// Directory the command was started from
    pub cwd: PathBuf,
}

impl RuntimeContext {
    /// Discover the repository containing `cwd`
    ///
    /// A relative `config` is taken relative to `cwd`, the way a user typed it.
    pub fn discover(cwd: &Path, config: Option<&Path>) -> Result<Self> {
        let repo = GitRepo::discover(cwd).map_err(|e| CommandError::NotARepository(e.to_string()))?;
        let config_path = match config {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => cwd.join(path),
            None => repo.root().join(DEFAULT_CONFIG_FILE),
        };

        Ok(Self {
            repo,
            config_path,
            cwd: cwd.to_path_buf(),
        })
    }

    /// Working tree root
    #[inline]
    pub fn root(&self) -> &Path {
        self.repo.root()
    }

    /// Load and validate the config file
    pub fn load_config(&self) -> Result<PipelineConfig> {
        if !self.config_path.is_file() {
            return Err(CommandError::ConfigNotFound(self.config_path.clone()));
        }
        Ok(PipelineConfig::load(&self.config_path)?)
    }

    /// Resolve every repository in `config`, cloning remote ones into the cache
    pub fn resolve_pipeline(&self, config: &PipelineConfig) -> Result<Pipeline> {
        let store = RepoStore::from_env()?;
        Ok(Pipeline::resolve(config, self.root(), &store)?)
    }

    /// Turn a path given on the command line into one relative to the root
    pub fn repo_relative(&self, path: &Path) -> Result<PathBuf> {
        let absolute = normalize(&self.cwd.join(path));
        let root = normalize(self.root());

        absolute
            .strip_prefix(&root)
            .map(Path::to_path_buf)
            .map_err(|_| CommandError::OutsideRepository {
                path: path.to_path_buf(),
                root,
            })
    }

    /// Path of a file git hands to a hook, such as the commit message file
    ///
    /// Linked worktrees and submodules keep their git dir outside the
    /// working tree; such paths stay absolute.
    pub fn hook_file(&self, path: &Path) -> PathBuf {
        self.repo_relative(path)
            .unwrap_or_else(|_| normalize(&self.cwd.join(path)))
    }
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
