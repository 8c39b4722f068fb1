//! Local filesystem artifact store.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{validate_key, ArtifactStore, ArtifactStoreError, Visibility};

/// Stores artifacts as files in a single directory.
///
/// Every write goes to its own dot-prefixed staging file in the same
/// directory and is renamed into place, so a key never names a partially
/// written document and concurrent writers of one key do not collide.
/// Public objects are made world-readable; private ones owner-only (unix).
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root_dir: PathBuf,
}

impl LocalArtifactStore {
    /// Opens the store at `root_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(root_dir: P) -> io::Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
        visibility: Visibility,
    ) -> Result<(), ArtifactStoreError> {
        validate_key(key)?;

        let root_dir = self.root_dir.clone();
        let path = self.path_for(key);
        let bytes = bytes.to_vec();

        tokio::task::spawn_blocking(move || write_atomically(&root_dir, &path, &bytes, visibility))
            .await
            .map_err(io::Error::other)??;

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ArtifactStoreError> {
        validate_key(key)?;
        Ok(fs::try_exists(self.path_for(key)).await?)
    }
}

fn write_atomically(
    dir: &Path,
    path: &Path,
    bytes: &[u8],
    visibility: Visibility,
) -> io::Result<()> {
    let mut staging = tempfile::Builder::new()
        .prefix(".")
        .suffix(".partial")
        .tempfile_in(dir)?;
    staging.write_all(bytes)?;
    staging.as_file().sync_all()?;

    set_visibility(staging.path(), visibility)?;
    staging.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(unix)]
fn set_visibility(path: &Path, visibility: Visibility) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = match visibility {
        Visibility::PublicRead => 0o644,
        Visibility::Private => 0o600,
    };
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_visibility(_path: &Path, _visibility: Visibility) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_put_then_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalArtifactStore::new(temp_dir.path()).unwrap();

        assert!(!store.exists("abc.pdf").await.unwrap());

        store
            .put("abc.pdf", b"%PDF-1.4", "application/pdf", Visibility::PublicRead)
            .await
            .unwrap();

        assert!(store.exists("abc.pdf").await.unwrap());
        let written = std::fs::read(temp_dir.path().join("abc.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.4");
        assert_eq!(entries(temp_dir.path()), vec!["abc.pdf"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_of_one_key_all_succeed() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(LocalArtifactStore::new(temp_dir.path()).unwrap());

        for round in 0..25 {
            let mut handles = Vec::new();
            for writer in 0..4 {
                let store = store.clone();
                let body = format!("%PDF round {} writer {}", round, writer);
                handles.push(tokio::spawn(async move {
                    store
                        .put("orphan.pdf", body.as_bytes(), "application/pdf", Visibility::PublicRead)
                        .await
                }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }
        }

        let written = std::fs::read_to_string(temp_dir.path().join("orphan.pdf")).unwrap();
        assert!(written.starts_with("%PDF round 24 writer "));
        assert_eq!(entries(temp_dir.path()), vec!["orphan.pdf"]);
    }

    #[tokio::test]
    async fn test_opaque_identity_keys_are_stored() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalArtifactStore::new(temp_dir.path()).unwrap();

        for key in ["ana@example.com.pdf", "joão.pdf", "A B.pdf"] {
            store
                .put(key, b"%PDF", "application/pdf", Visibility::PublicRead)
                .await
                .unwrap();
            assert!(store.exists(key).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_put_replaces_existing_object() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalArtifactStore::new(temp_dir.path()).unwrap();

        store
            .put("abc.pdf", b"first", "application/pdf", Visibility::PublicRead)
            .await
            .unwrap();
        store
            .put("abc.pdf", b"second", "application/pdf", Visibility::PublicRead)
            .await
            .unwrap();

        let written = std::fs::read(temp_dir.path().join("abc.pdf")).unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn test_new_creates_nested_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("data").join("certificates");
        let store = LocalArtifactStore::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root_dir(), root.as_path());
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalArtifactStore::new(temp_dir.path()).unwrap();

        let result = store
            .put("../escape.pdf", b"x", "application/pdf", Visibility::PublicRead)
            .await;
        assert!(matches!(result, Err(ArtifactStoreError::InvalidKey(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_visibility_sets_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = LocalArtifactStore::new(temp_dir.path()).unwrap();

        store
            .put("public.pdf", b"x", "application/pdf", Visibility::PublicRead)
            .await
            .unwrap();
        store
            .put("private.pdf", b"x", "application/pdf", Visibility::Private)
            .await
            .unwrap();

        let public = std::fs::metadata(temp_dir.path().join("public.pdf")).unwrap();
        let private = std::fs::metadata(temp_dir.path().join("private.pdf")).unwrap();
        assert_eq!(public.permissions().mode() & 0o777, 0o644);
        assert_eq!(private.permissions().mode() & 0o777, 0o600);
    }
}
