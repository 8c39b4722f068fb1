//! In-process artifact store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{validate_key, ArtifactStore, ArtifactStoreError, Visibility};

/// An object held by [`MemoryArtifactStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub visibility: Visibility,
}

/// Artifact store held in memory, with write accounting for tests.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    objects: RwLock<HashMap<String, StoredArtifact>>,
    puts: RwLock<usize>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the object stored under `key`.
    pub async fn get(&self, key: &str) -> Option<StoredArtifact> {
        self.objects.read().await.get(key).cloned()
    }

    /// Number of distinct keys stored.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Total number of successful `put` calls.
    pub async fn put_count(&self) -> usize {
        *self.puts.read().await
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), ArtifactStoreError> {
        validate_key(key)?;

        self.objects.write().await.insert(
            key.to_string(),
            StoredArtifact {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
                visibility,
            },
        );
        *self.puts.write().await += 1;

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ArtifactStoreError> {
        Ok(self.objects.read().await.contains_key(key))
    }
}
