//! Filesystem-backed artifact store.

use std::path::{Path, PathBuf};

use tracing::debug;

use convbench_core::{ArtifactStore, StoreError};

/// Stores artifacts as files under a root directory; the locator is the
/// artifact's absolute path.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactStore for FsStore {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let path = self.root.join(file_name);
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), size = bytes.len(), "stored artifact");
        Ok(path.to_string_lossy().into_owned())
    }

    fn load(&self, locator: &str) -> Result<Vec<u8>, StoreError> {
        match std::fs::read(locator) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(locator.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("artifacts")).unwrap();

        let locator = store.store("doc_copy_00000001.pdf", b"artifact").unwrap();
        assert!(locator.ends_with("doc_copy_00000001.pdf"));
        assert_eq!(store.load(&locator).unwrap(), b"artifact");
    }

    #[test]
    fn missing_locator_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        let err = store
            .load(&dir.path().join("absent.pdf").to_string_lossy())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn creates_missing_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FsStore::new(&nested).unwrap();
        assert!(store.root().exists());
    }
}
