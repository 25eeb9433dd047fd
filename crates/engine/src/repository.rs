//! Hook repository resolution
//!
//! Turns the `repos:` list of a [`PipelineConfig`] into a [`Pipeline`] of
//! executable [`HookDefinition`]s:
//!
//! - `local` hooks are used as written
//! - `meta` hooks are overlaid on the built-in meta manifest
//! - remote hooks are overlaid on the repository's `.pre-commit-hooks.yaml`,
//!   after the repository has been checked out at `rev` by a [`RepoSource`]

use crate::git::git_err;
use hookline_config::{
    DEFAULT_CONFIG_FILE, HookConfig, HookDefinition, Language, MANIFEST_FILE, PipelineConfig,
    RepoConfig, RepoKind, cache_dir,
};
use hookline_core::{Error, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Somewhere remote hook repositories can be checked out from
pub trait RepoSource {
    /// Return a working tree of `url` at `rev`
    fn checkout(&self, url: &str, rev: &str) -> Result<PathBuf>;
}

/// Git clones cached under `<cache>/repos/<url>/<rev>`
#[derive(Debug, Clone)]
pub struct RepoStore {
    cache: PathBuf,
}

impl RepoStore {
    /// Store rooted at a cache directory
    pub fn new(cache: impl Into<PathBuf>) -> Self {
        Self {
            cache: cache.into(),
        }
    }

    /// Store rooted at `$HOOKLINE_HOME` or the XDG cache directory
    pub fn from_env() -> Result<Self> {
        cache_dir().map(Self::new).ok_or_else(|| {
            Error::Message(
                "Cannot determine a cache directory; set HOOKLINE_HOME".to_string(),
            )
        })
    }

    /// Cache directory
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache
    }

    /// Where `url` at `rev` is (or would be) checked out
    #[must_use]
    pub fn path_for(&self, url: &str, rev: &str) -> PathBuf {
        self.cache.join("repos").join(slug(url)).join(slug(rev))
    }

    /// Remove every cached checkout
    ///
    /// Returns `false` when there was nothing to remove.
    pub fn clean(&self) -> Result<bool> {
        if !self.cache.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.cache)?;
        tracing::debug!(path = %self.cache.display(), "Removed repository cache");
        Ok(true)
    }

    #[tracing::instrument(skip(self, dest), fields(dest = %dest.display()))]
    fn clone_into(&self, url: &str, rev: &str, dest: &Path) -> Result<()> {
        use git2::build::CheckoutBuilder;

        let parent = dest
            .parent()
            .ok_or_else(|| Error::repository(url, "invalid cache path"))?;
        fs::create_dir_all(parent)?;

        // Clone next to the destination so an interrupted clone never looks complete
        let staging = tempfile::Builder::new()
            .prefix(".clone-")
            .tempdir_in(parent)?;

        tracing::debug!("Cloning hook repository");
        let repo = git2::Repository::clone(url, staging.path())
            .map_err(|e| Error::repository(url, git_err(e)))?;

        let object = repo
            .revparse_single(rev)
            .or_else(|_| repo.revparse_single(&format!("origin/{rev}")))
            .map_err(|_| Error::repository(url, format!("revision '{rev}' not found")))?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| Error::repository(url, git_err(e)))?;

        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))
            .map_err(|e| Error::repository(url, git_err(e)))?;
        repo.set_head_detached(commit.id())
            .map_err(|e| Error::repository(url, git_err(e)))?;

        fs::rename(staging.path(), dest)?;
        tracing::debug!(commit = %commit.id(), "Checked out hook repository");
        Ok(())
    }
}

impl RepoSource for RepoStore {
    fn checkout(&self, url: &str, rev: &str) -> Result<PathBuf> {
        let dest = self.path_for(url, rev);
        if dest.join(".git").exists() {
            tracing::trace!(url, rev, "Reusing cached checkout");
            return Ok(dest);
        }

        self.clone_into(url, rev, &dest)?;
        Ok(dest)
    }
}

/// Make a string safe to use as a single path component
fn slug(value: &str) -> String {
    let slug: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // `.` and `..` must not survive as path components
    if slug.starts_with('.') {
        format!("_{slug}")
    } else {
        slug
    }
}

/// Read a repository's hook manifest, keyed by hook id
pub fn load_manifest(repo_root: &Path) -> Result<IndexMap<String, HookConfig>> {
    let path = repo_root.join(MANIFEST_FILE);
    let content = fs::read_to_string(&path).map_err(|e| Error::ConfigParse {
        path: path.clone(),
        message: format!("cannot read manifest: {e}"),
    })?;

    let hooks: Vec<HookConfig> =
        serde_yaml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

    let mut manifest = IndexMap::with_capacity(hooks.len());
    for hook in hooks {
        hook.validate()?;
        manifest.insert(hook.id.clone(), hook);
    }
    Ok(manifest)
}

/// Built-in hooks offered by `repo: meta`
fn meta_manifest() -> IndexMap<String, HookConfig> {
    let config_file = format!("^{}$", regex::escape(DEFAULT_CONFIG_FILE));

    let meta = |id: &str, name: &str| HookConfig {
        id: id.to_string(),
        name: Some(name.to_string()),
        entry: Some(id.to_string()),
        language: Some(Language::Unmanaged("meta".to_string())),
        ..HookConfig::default()
    };

    let hooks = [
        HookConfig {
            files: Some(config_file.clone()),
            ..meta("check-hooks-apply", "Check hooks apply to the repository")
        },
        HookConfig {
            files: Some(config_file),
            ..meta("check-useless-excludes", "Check for useless excludes")
        },
        HookConfig {
            verbose: Some(true),
            ..meta("identity", "identity")
        },
    ];

    hooks.into_iter().map(|h| (h.id.clone(), h)).collect()
}

/// A repository with its hooks resolved
#[derive(Debug, Clone)]
pub struct ResolvedRepo {
    /// Local, meta or remote
    pub kind: RepoKind,
    /// The `repo:` value as written
    pub source: String,
    /// Pinned revision (remote only)
    pub rev: Option<String>,
    /// Directory `script` entries are relative to
    pub root: PathBuf,
    /// Hooks in declaration order
    pub hooks: Vec<HookDefinition>,
}

/// Everything the runner needs, in execution order
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Repositories in declaration order
    pub repos: Vec<ResolvedRepo>,
    /// Global include regex
    pub files: String,
    /// Global exclude regex
    pub exclude: String,
    /// Top-level `fail_fast`
    pub fail_fast: bool,
}

impl Pipeline {
    /// Resolve every repository of a configuration
    ///
    /// Remote repositories are fetched through `source`; `project_root` is
    /// the root of the repository being checked.
    #[tracing::instrument(skip_all, fields(repos = config.repos.len()))]
    pub fn resolve(
        config: &PipelineConfig,
        project_root: &Path,
        source: &dyn RepoSource,
    ) -> Result<Self> {
        let repos = config
            .repos
            .iter()
            .map(|repo| resolve_repo(repo, config, project_root, source))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            repos,
            files: config.files.clone(),
            exclude: config.exclude.clone(),
            fail_fast: config.fail_fast,
        })
    }

    /// Every hook with the repository it came from, in execution order
    pub fn hooks(&self) -> impl Iterator<Item = (&ResolvedRepo, &HookDefinition)> {
        self.repos
            .iter()
            .flat_map(|repo| repo.hooks.iter().map(move |hook| (repo, hook)))
    }

    /// Find a hook by id or alias
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&HookDefinition> {
        self.hooks()
            .map(|(_, hook)| hook)
            .find(|hook| hook.is_named(id))
    }
}

fn resolve_repo(
    repo: &RepoConfig,
    config: &PipelineConfig,
    project_root: &Path,
    source: &dyn RepoSource,
) -> Result<ResolvedRepo> {
    let kind = repo.kind();

    let (root, manifest) = match kind {
        RepoKind::Local => (project_root.to_path_buf(), None),
        RepoKind::Meta => (project_root.to_path_buf(), Some(meta_manifest())),
        RepoKind::Remote => {
            let rev = repo
                .rev
                .as_deref()
                .ok_or_else(|| Error::repository(&repo.repo, "missing 'rev'"))?;
            let root = source.checkout(&repo.repo, rev)?;
            let manifest = load_manifest(&root)?;
            (root, Some(manifest))
        }
    };

    let hooks = repo
        .hooks
        .iter()
        .map(|hook| {
            let merged = match &manifest {
                None => hook.clone(),
                Some(manifest) => {
                    let base = manifest.get(&hook.id).ok_or_else(|| {
                        Error::repository(
                            &repo.repo,
                            format!("hook '{}' is not provided by this repository", hook.id),
                        )
                    })?;
                    let merged = hook.overlay(base);
                    merged.validate()?;
                    merged
                }
            };
            merged.resolve(&config.default_stages)
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(repo = %repo.repo, hooks = hooks.len(), "Resolved repository");

    Ok(ResolvedRepo {
        kind,
        source: repo.repo.clone(),
        rev: repo.rev.clone(),
        root,
        hooks,
    })
}
