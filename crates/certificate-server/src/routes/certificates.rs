//! Certificate issuance and verification endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::issuance::{CertificateService, IssueRequest, IssueStatus, Verification};

/// Message returned when a new certificate was generated.
pub const ISSUED_MESSAGE: &str = "Certificate generated with success";

/// Message returned when the identity already had a certificate.
pub const ALREADY_ISSUED_MESSAGE: &str = "Certificate Válido";

/// Message returned by a successful verification.
pub const VALID_MESSAGE: &str = "Certificado válido";

/// Message returned by a failed verification.
pub const INVALID_MESSAGE: &str = "Certificate Inválido";

/// Request body for issuing a certificate.
#[derive(Debug, Deserialize)]
pub struct IssueCertificateRequest {
    /// Identity to file the certificate under. Generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub grade: String,
}

/// Response for an issuance, new or repeated.
#[derive(Debug, Serialize)]
pub struct IssueCertificateResponse {
    pub message: String,
    pub url: String,
    pub id: String,
    pub grade: String,
    pub name: String,
    pub date: DateTime<Utc>,
}

/// Response for a successful verification.
#[derive(Debug, Serialize)]
pub struct ValidCertificateResponse {
    pub message: String,
    pub name: String,
    pub url: String,
}

/// Response for a failed verification.
#[derive(Debug, Serialize)]
pub struct InvalidCertificateResponse {
    pub message: String,
}

/// Creates the certificates router.
pub fn router(service: CertificateService) -> Router {
    Router::new()
        .route("/", post(issue_certificate))
        .route("/{id}", get(verify_certificate))
        .with_state(service)
}

/// POST /api/v1/certificates
///
/// Issues a certificate, or returns the one already filed under `id`.
/// Responds 201 in both cases.
async fn issue_certificate(
    State(service): State<CertificateService>,
    Json(request): Json<IssueCertificateRequest>,
) -> Result<(StatusCode, Json<IssueCertificateResponse>), AppError> {
    let issuance = service
        .issue(IssueRequest {
            id: request.id,
            name: request.name,
            grade: request.grade,
        })
        .await?;

    let message = match issuance.status {
        IssueStatus::Issued => ISSUED_MESSAGE,
        IssueStatus::AlreadyIssued { .. } => ALREADY_ISSUED_MESSAGE,
    };

    Ok((
        StatusCode::CREATED,
        Json(IssueCertificateResponse {
            message: message.to_string(),
            url: issuance.url,
            id: issuance.id.into(),
            grade: issuance.grade,
            name: issuance.name,
            date: issuance.issued_at,
        }),
    ))
}

/// GET /api/v1/certificates/{id}
///
/// Reports whether a certificate exists under `id`.
/// 201 with the holder's name and document URL, or 400 when unknown.
async fn verify_certificate(
    State(service): State<CertificateService>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let response = match service.verify(&id).await? {
        Verification::Valid { name, url } => (
            StatusCode::CREATED,
            Json(ValidCertificateResponse {
                message: VALID_MESSAGE.to_string(),
                name,
                url,
            }),
        )
            .into_response(),
        Verification::Invalid => (
            StatusCode::BAD_REQUEST,
            Json(InvalidCertificateResponse {
                message: INVALID_MESSAGE.to_string(),
            }),
        )
            .into_response(),
    };

    Ok(response)
}
