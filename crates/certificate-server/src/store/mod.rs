//! Record store: identity -> certificate record.

use async_trait::async_trait;
use certificate_core::{CertificateId, CertificateRecord, NewCertificate};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Errors raised by record store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored record '{id}' is invalid: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Record '{0}' conflicted on insert but could not be read back")]
    Vanished(String),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Result of a create-if-absent write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The record did not exist and was written.
    Created(CertificateRecord),
    /// A record already existed under the identity; it was left untouched.
    Existing(CertificateRecord),
}

/// Durable lookup of certificate records by identity.
///
/// `create_if_absent` must be atomic with respect to other writers: when two
/// callers race on one identity, exactly one observes `Created`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the record stored under `id`, if any.
    async fn find(&self, id: &CertificateId) -> Result<Option<CertificateRecord>, StoreError>;

    /// Writes `record` unless its identity is already taken.
    async fn create_if_absent(&self, record: NewCertificate) -> Result<CreateOutcome, StoreError>;
}
