//! API routes for the certificate server.

pub mod certificates;
pub mod health;

use std::path::Path;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::services::ServeDir;

use crate::issuance::CertificateService;

/// Path under which locally stored documents are served.
pub const ARTIFACT_FILES_PATH: &str = "/certificates";

/// Creates the main API router with all routes mounted.
pub fn create_router(service: CertificateService) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1", api_v1_routes(service))
}

/// Serves the documents in `artifact_dir` read-only under [`ARTIFACT_FILES_PATH`].
///
/// Dot-prefixed entries, such as in-flight staging files, are never served.
pub fn with_artifact_files(router: Router, artifact_dir: &Path) -> Router {
    let files = Router::new()
        .fallback_service(ServeDir::new(artifact_dir))
        .layer(middleware::from_fn(hide_dot_files));
    router.nest_service(ARTIFACT_FILES_PATH, files)
}

async fn hide_dot_files(request: Request, next: Next) -> Response {
    let hidden = request.uri().path().split('/').any(|segment| {
        segment.starts_with('.') || segment.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("%2e"))
    });
    if hidden {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

/// Creates the v1 API routes.
fn api_v1_routes(service: CertificateService) -> Router {
    Router::new().nest("/certificates", certificates::router(service))
}
