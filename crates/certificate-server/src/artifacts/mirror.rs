//! Artifact store that keeps a local copy of every upload.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ArtifactStore, ArtifactStoreError, LocalArtifactStore, Visibility};

/// Writes to a primary store and mirrors each object into a local directory.
///
/// The primary store is authoritative. Mirror failures are logged and do not
/// fail the write.
pub struct MirroredArtifactStore {
    primary: Arc<dyn ArtifactStore>,
    mirror: LocalArtifactStore,
}

impl MirroredArtifactStore {
    pub fn new(primary: Arc<dyn ArtifactStore>, mirror: LocalArtifactStore) -> Self {
        Self { primary, mirror }
    }
}

#[async_trait]
impl ArtifactStore for MirroredArtifactStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), ArtifactStoreError> {
        self.primary.put(key, bytes, content_type, visibility).await?;

        if let Err(e) = self.mirror.put(key, bytes, content_type, visibility).await {
            tracing::warn!(
                key = %key,
                mirror_dir = %self.mirror.root_dir().display(),
                error = %e,
                "Failed to mirror certificate artifact"
            );
        }

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ArtifactStoreError> {
        self.primary.exists(key).await
    }
}
