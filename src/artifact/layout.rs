//! Deterministic on-disk layout of the artifact cache
//!
//! ```text
//! <root>/tars/<version>.tar.gz                  downloaded archive
//! <root>/extracted/<version>/                   finalized environment
//! <root>/extracted/<version>/hacking/env-setup  bootstrap script
//! <root>/checkouts/<trunk>/                     trunk working copy
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::artifact::error::CacheError;

const TARS_DIR: &str = "tars";
const EXTRACTED_DIR: &str = "extracted";
const CHECKOUTS_DIR: &str = "checkouts";
const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Relative location of the bootstrap script inside an environment
pub const BOOTSTRAP_SCRIPT: &str = "hacking/env-setup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tars_dir(&self) -> PathBuf {
        self.root.join(TARS_DIR)
    }

    pub fn extracted_dir(&self) -> PathBuf {
        self.root.join(EXTRACTED_DIR)
    }

    pub fn checkouts_dir(&self) -> PathBuf {
        self.root.join(CHECKOUTS_DIR)
    }

    pub fn archive_path(&self, version: &str) -> PathBuf {
        self.tars_dir().join(Self::archive_name(version))
    }

    pub fn extracted_path(&self, version: &str) -> PathBuf {
        self.extracted_dir().join(version)
    }

    pub fn checkout_path(&self, trunk: &str) -> PathBuf {
        self.checkouts_dir().join(trunk)
    }

    /// Archive name under the upstream release index
    pub fn archive_name(version: &str) -> String {
        format!("{}.{}", version, ARCHIVE_EXTENSION)
    }

    /// Create the cache directory tree.
    ///
    /// The root itself may need to be created by an administrator (e.g. under
    /// /var/cache); failure here is reported with the offending path.
    pub fn create_dirs(&self) -> Result<(), CacheError> {
        for dir in [
            self.root.clone(),
            self.tars_dir(),
            self.extracted_dir(),
            self.checkouts_dir(),
        ] {
            if dir.is_dir() {
                continue;
            }
            debug!("Creating cache directory {:?}", dir);
            std::fs::create_dir_all(&dir).map_err(|source| {
                error!("You must manually create the path {:?}", dir);
                CacheError::CacheRoot {
                    path: dir.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

/// Path of the bootstrap script inside an environment directory
pub fn bootstrap_script(env_dir: &Path) -> PathBuf {
    env_dir.join(BOOTSTRAP_SCRIPT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_are_derived_from_version() {
        let layout = CacheLayout::new("/cache");

        assert_eq!(
            layout.archive_path("ansible-2.4.0.0"),
            PathBuf::from("/cache/tars/ansible-2.4.0.0.tar.gz")
        );
        assert_eq!(
            layout.extracted_path("ansible-2.4.0.0"),
            PathBuf::from("/cache/extracted/ansible-2.4.0.0")
        );
        assert_eq!(
            layout.checkout_path("ansible-devel"),
            PathBuf::from("/cache/checkouts/ansible-devel")
        );
        assert_eq!(
            bootstrap_script(&layout.extracted_path("ansible-2.4.0.0")),
            PathBuf::from("/cache/extracted/ansible-2.4.0.0/hacking/env-setup")
        );
        assert_eq!(
            CacheLayout::archive_name("ansible-2.4.0.0"),
            "ansible-2.4.0.0.tar.gz"
        );
    }

    #[test]
    fn create_dirs_builds_the_tree() {
        let temp_dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(temp_dir.path().join("cache"));

        layout.create_dirs().unwrap();

        assert!(layout.tars_dir().is_dir());
        assert!(layout.extracted_dir().is_dir());
        assert!(layout.checkouts_dir().is_dir());
    }

    #[test]
    fn create_dirs_reports_uncreatable_root() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let layout = CacheLayout::new(blocker.join("cache"));

        let result = layout.create_dirs();

        assert!(matches!(
            result,
            Err(CacheError::CacheRoot { ref path, .. }) if *path == blocker.join("cache")
        ));
    }
}
