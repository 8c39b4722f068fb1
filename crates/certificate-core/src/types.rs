//! Certificate record types and artifact addressing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use percent_encoding::utf8_percent_encode;

use crate::identity::{CertificateId, PATH_SEGMENT};

/// Content type declared for uploaded certificate documents.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// The durable record of a certificate issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Identity the certificate is filed under.
    pub id: CertificateId,
    /// Display name of the certificate holder.
    pub name: String,
    /// Achievement grade, free-form.
    pub grade: String,
    /// When this record was created. Never changes afterwards.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new certificate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCertificate {
    pub id: CertificateId,
    pub name: String,
    pub grade: String,
    pub created_at: DateTime<Utc>,
}

impl NewCertificate {
    /// Converts into the record that a store persists for this request.
    pub fn into_record(self) -> CertificateRecord {
        CertificateRecord {
            id: self.id,
            name: self.name,
            grade: self.grade,
            created_at: self.created_at,
        }
    }
}

impl CertificateRecord {
    /// Object key of this record's rendered document.
    pub fn artifact_key(&self) -> String {
        artifact_key(&self.id)
    }
}

/// Object key of the rendered document for `id`.
pub fn artifact_key(id: &CertificateId) -> String {
    format!("{}.pdf", id)
}

/// Public URL of the rendered document for `id` under `base`.
///
/// The key is percent-encoded as a single path segment.
pub fn artifact_url(base: &str, id: &CertificateId) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        utf8_percent_encode(&artifact_key(id), PATH_SEGMENT)
    )
}
