//! Remove cloned hook repositories

use hookline_engine::RepoStore;
use owo_colors::OwoColorize;

use crate::error::Result;
use crate::ui::StatusIcon;

/// Delete the repository cache
///
/// The next run clones every remote repository again.
pub fn run_clean(store: &RepoStore) -> Result<()> {
    let dir = store.cache_dir().display();
    if store.clean()? {
        println!("{} Cleaned {}", StatusIcon::Success.green(), dir.cyan());
    } else {
        println!("{} Nothing to clean at {}", StatusIcon::Info, dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_cache() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        std::fs::create_dir_all(cache.join("repos/github.com_x/v1")).unwrap();

        let store = RepoStore::new(&cache);
        run_clean(&store).unwrap();
        assert!(!cache.exists());

        // A second clean is a no-op
        run_clean(&store).unwrap();
    }
}
