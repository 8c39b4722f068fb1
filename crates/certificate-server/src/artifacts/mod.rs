//! Artifact store: rendered certificate documents addressed by key.

use std::io;

use async_trait::async_trait;

pub mod local;
pub mod memory;
pub mod mirror;

pub use local::LocalArtifactStore;
pub use memory::{MemoryArtifactStore, StoredArtifact};
pub use mirror::MirroredArtifactStore;

/// Who may read a stored object.
///
/// Issuance always publishes with `PublicRead`. `Private` is honoured by
/// every backend (owner-only files locally) for stores that hold documents
/// not meant for the public URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    PublicRead,
}

/// Errors raised by artifact store backends.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactStoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid artifact key: '{0}'")]
    InvalidKey(String),

    #[error("Artifact store unavailable: {0}")]
    Unavailable(String),
}

/// Durable blob storage for certificate documents.
///
/// No read path is needed: clients fetch documents through their public URL.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes `bytes` under `key`, replacing any previous object.
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), ArtifactStoreError>;

    /// Reports whether an object exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool, ArtifactStoreError>;
}

/// Rejects keys that could escape a flat namespace.
pub(crate) fn validate_key(key: &str) -> Result<(), ArtifactStoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && !key.contains(['/', '\\'])
        && !key.chars().any(char::is_control);

    if valid {
        Ok(())
    } else {
        Err(ArtifactStoreError::InvalidKey(key.to_string()))
    }
}
