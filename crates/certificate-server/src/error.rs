//! Error types for the certificate server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use certificate_core::RenderError;

use crate::artifacts::ArtifactStoreError;
use crate::convert::ConvertError;
use crate::store::StoreError;

/// Message returned for every dependency failure.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Artifact store error: {0}")]
    Artifact(#[from] ArtifactStoreError),

    #[error("Template error: {0}")]
    Render(#[from] RenderError),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// JSON body carried by error responses.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg) => msg,
            other => {
                tracing::error!(error = %other, "Request failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
