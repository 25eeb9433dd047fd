//! XDG directory utilities
//!
//! Hook repositories are cloned into a cache directory:
//! - `$HOOKLINE_HOME` when set
//! - otherwise `$XDG_CACHE_HOME/hookline` (defaults to `~/.cache/hookline`)

use std::path::PathBuf;
use xdg::BaseDirectories;

/// Environment variable overriding the cache directory
pub const HOME_ENV: &str = "HOOKLINE_HOME";

/// Get the hookline cache directory
#[must_use]
pub fn cache_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home));
    }

    // xdg 3.0: with_prefix returns BaseDirectories, get_*_home returns Option<PathBuf>
    BaseDirectories::with_prefix("hookline").get_cache_home()
}

/// Get the directory holding cloned hook repositories
#[must_use]
pub fn repos_dir() -> Option<PathBuf> {
    cache_dir().map(|d| d.join("repos"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_repos_dir_is_under_cache_dir() {
        if let (Some(cache), Some(repos)) = (cache_dir(), repos_dir()) {
            assert!(repos.starts_with(&cache));
            assert!(repos.ends_with("repos"));
        }
    }

    #[test]
    fn test_cache_dir_mentions_hookline_without_override() {
        if std::env::var_os(HOME_ENV).is_some() {
            return;
        }
        if let Some(dir) = cache_dir() {
            assert!(
                dir.to_string_lossy().contains("hookline"),
                "cache_dir path should contain 'hookline': {dir:?}"
            );
        }
    }
}
