//! Certificate issuance and verification.
//!
//! Issuance is idempotent per identity. The record is claimed first through
//! the store's create-if-absent, then the document is rendered and uploaded.
//! A failure after the claim leaves a record without a document; the next
//! issuance for that identity notices the missing object and renders it again.

use std::str::FromStr;
use std::sync::Arc;

use certificate_core::{
    artifact_url, resolve_identity, CertificateId, CertificateRecord, CertificateTemplate,
    CertificateView, NewCertificate, PageOptions, RenderError, PDF_CONTENT_TYPE,
};
use chrono::{DateTime, Utc};

use crate::artifacts::{ArtifactStore, Visibility};
use crate::convert::DocumentConverter;
use crate::error::AppError;
use crate::store::{CreateOutcome, RecordStore};

/// Maximum length of the name and grade fields.
pub const MAX_FIELD_LEN: usize = 256;

/// Which name and grade an issuance for an existing identity reports.
///
/// The stored record is never modified by a repeated issuance; this only
/// controls what the response carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExistingFieldsPolicy {
    /// Report the stored name and grade.
    #[default]
    Stored,
    /// Echo the name and grade from the current request.
    Echo,
}

impl FromStr for ExistingFieldsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stored" => Ok(Self::Stored),
            "echo" => Ok(Self::Echo),
            other => Err(format!("unknown policy '{}' (expected 'stored' or 'echo')", other)),
        }
    }
}

/// A request to issue a certificate.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub id: Option<String>,
    pub name: String,
    pub grade: String,
}

/// How an issuance was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatus {
    /// A new record and document were created.
    Issued,
    /// A record already existed. `repaired` is set when its missing document
    /// was rendered again.
    AlreadyIssued { repaired: bool },
}

/// Outcome of a successful issuance.
#[derive(Debug, Clone)]
pub struct Issuance {
    pub status: IssueStatus,
    pub id: CertificateId,
    pub name: String,
    pub grade: String,
    pub url: String,
    pub issued_at: DateTime<Utc>,
}

/// Outcome of a verification lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid { name: String, url: String },
    Invalid,
}

/// Issues and verifies certificates over injected stores.
#[derive(Clone)]
pub struct CertificateService {
    records: Arc<dyn RecordStore>,
    artifacts: Arc<dyn ArtifactStore>,
    converter: Arc<dyn DocumentConverter>,
    template: Arc<CertificateTemplate>,
    page_options: PageOptions,
    base_url: String,
    existing_fields: ExistingFieldsPolicy,
}

impl CertificateService {
    /// Creates a service using the built-in certificate template.
    pub fn new(
        records: Arc<dyn RecordStore>,
        artifacts: Arc<dyn ArtifactStore>,
        converter: Arc<dyn DocumentConverter>,
        base_url: impl Into<String>,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            records,
            artifacts,
            converter,
            template: Arc::new(CertificateTemplate::new()?),
            page_options: PageOptions::default(),
            base_url: base_url.into(),
            existing_fields: ExistingFieldsPolicy::default(),
        })
    }

    pub fn with_existing_fields_policy(mut self, policy: ExistingFieldsPolicy) -> Self {
        self.existing_fields = policy;
        self
    }

    pub fn with_template(mut self, template: CertificateTemplate) -> Self {
        self.template = Arc::new(template);
        self
    }

    pub fn with_page_options(mut self, options: PageOptions) -> Self {
        self.page_options = options;
        self
    }

    /// Public URL of the document for `id`.
    pub fn url_for(&self, id: &CertificateId) -> String {
        artifact_url(&self.base_url, id)
    }

    /// Issues a certificate, or confirms the one already filed under the
    /// requested identity.
    pub async fn issue(&self, request: IssueRequest) -> Result<Issuance, AppError> {
        validate_field("name", &request.name)?;
        validate_field("grade", &request.grade)?;

        let id = resolve_identity(request.id.as_deref())
            .map_err(|e| AppError::BadRequest(format!("Invalid certificate id: {}", e)))?;

        if let Some(existing) = self.records.find(&id).await? {
            return self.confirm_existing(existing, &request, true).await;
        }

        let new_certificate = NewCertificate {
            id,
            name: request.name.clone(),
            grade: request.grade.clone(),
            created_at: Utc::now(),
        };

        let record = match self.records.create_if_absent(new_certificate).await? {
            CreateOutcome::Created(record) => record,
            CreateOutcome::Existing(record) => {
                // Another request claimed the id between lookup and create and
                // is rendering the document itself.
                tracing::warn!(
                    certificate_id = %record.id,
                    "Certificate created concurrently, returning existing record"
                );
                return self.confirm_existing(record, &request, false).await;
            }
        };

        if let Err(e) = self.publish_artifact(&record).await {
            tracing::error!(
                certificate_id = %record.id,
                error = %e,
                "Certificate record created without artifact"
            );
            return Err(e);
        }

        tracing::info!(certificate_id = %record.id, "Certificate issued");

        Ok(Issuance {
            status: IssueStatus::Issued,
            url: self.url_for(&record.id),
            issued_at: record.created_at,
            id: record.id,
            name: record.name,
            grade: record.grade,
        })
    }

    /// Looks up the certificate filed under `id`.
    ///
    /// Identities that could never have been issued are reported invalid
    /// without a store lookup. The artifact store is not consulted.
    pub async fn verify(&self, id: &str) -> Result<Verification, AppError> {
        let Ok(id) = CertificateId::parse(id) else {
            return Ok(Verification::Invalid);
        };

        Ok(match self.records.find(&id).await? {
            Some(record) => Verification::Valid {
                url: self.url_for(&record.id),
                name: record.name,
            },
            None => Verification::Invalid,
        })
    }

    async fn confirm_existing(
        &self,
        record: CertificateRecord,
        request: &IssueRequest,
        reconcile: bool,
    ) -> Result<Issuance, AppError> {
        let mut repaired = false;

        if reconcile && !self.artifacts.exists(&record.artifact_key()).await? {
            self.publish_artifact(&record).await?;
            repaired = true;
            tracing::info!(certificate_id = %record.id, "Re-rendered missing certificate artifact");
        }

        let (name, grade) = match self.existing_fields {
            ExistingFieldsPolicy::Stored => (record.name.clone(), record.grade.clone()),
            ExistingFieldsPolicy::Echo => (request.name.clone(), request.grade.clone()),
        };

        Ok(Issuance {
            status: IssueStatus::AlreadyIssued { repaired },
            url: self.url_for(&record.id),
            id: record.id,
            name,
            grade,
            issued_at: Utc::now(),
        })
    }

    /// Renders the document for `record` and uploads it, publicly readable.
    async fn publish_artifact(&self, record: &CertificateRecord) -> Result<(), AppError> {
        let view = CertificateView::from_record(record);
        let markup = self.template.render(&view)?;
        let pdf = self.converter.convert(&markup, &self.page_options).await?;

        self.artifacts
            .put(
                &record.artifact_key(),
                &pdf,
                PDF_CONTENT_TYPE,
                Visibility::PublicRead,
            )
            .await?;

        Ok(())
    }
}

fn validate_field(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(AppError::BadRequest(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_FIELD_LEN
        )));
    }
    Ok(())
}
