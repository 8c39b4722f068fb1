//! The projection of a certificate record that drives rendering.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::identity::CertificateId;
use crate::types::CertificateRecord;

/// Medal artwork stamped on every certificate.
const MEDAL_SVG: &[u8] = include_bytes!("../assets/medal.svg");

/// Values substituted into the certificate template. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateView {
    pub id: CertificateId,
    pub name: String,
    pub grade: String,
    /// Issue date as `DD/MM/YYYY`.
    #[serde(rename = "date")]
    pub issue_date: String,
    /// Medal image as a `data:` URI.
    #[serde(rename = "medal")]
    pub medal_image: String,
}

impl CertificateView {
    /// Builds the view for a stored record. The issue date is the record's
    /// creation date, so a re-rendered document matches the original.
    pub fn from_record(record: &CertificateRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            grade: record.grade.clone(),
            issue_date: format_issue_date(record.created_at),
            medal_image: medal_data_uri(),
        }
    }
}

/// Formats a timestamp as the `DD/MM/YYYY` date printed on certificates.
pub fn format_issue_date(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

/// Returns the embedded medal image encoded as a `data:` URI.
pub fn medal_data_uri() -> String {
    format!("data:image/svg+xml;base64,{}", BASE64_STANDARD.encode(MEDAL_SVG))
}
