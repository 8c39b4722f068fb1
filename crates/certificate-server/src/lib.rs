//! Certificate Server - issuance and verification API
//!
//! This crate provides the REST API that issues course certificates,
//! renders them to PDF documents and verifies them by identity.

pub mod artifacts;
pub mod config;
pub mod convert;
pub mod db;
pub mod error;
pub mod issuance;
pub mod routes;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use issuance::CertificateService;
pub use routes::create_router;
