//! Certificate identities.
//!
//! An identity is the primary key of a certificate record and the stem of
//! its artifact key. Caller-supplied values are opaque and kept verbatim;
//! only what would break a flat object namespace is rejected.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a caller-supplied identity.
pub const MAX_IDENTITY_LEN: usize = 128;

/// Characters left unescaped inside a URL path segment.
pub(crate) const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Reasons a caller-supplied identity is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity exceeds {} characters", MAX_IDENTITY_LEN)]
    TooLong,

    #[error("identity must not start with '.'")]
    LeadingDot,

    #[error("identity contains invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("identity is empty")]
    Empty,
}

/// Opaque identity under which a certificate is filed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateId(String);

impl CertificateId {
    /// Validates a caller-supplied identity. The value is kept verbatim.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentityError> {
        let value = value.into();

        if value.is_empty() {
            return Err(IdentityError::Empty);
        }
        if value.chars().count() > MAX_IDENTITY_LEN {
            return Err(IdentityError::TooLong);
        }
        if value.starts_with('.') {
            return Err(IdentityError::LeadingDot);
        }
        if let Some(c) = value
            .chars()
            .find(|&c| matches!(c, '/' | '\\') || c.is_control())
        {
            return Err(IdentityError::InvalidCharacter(c));
        }

        Ok(Self(value))
    }

    /// Generates a fresh random identity (UUID v4, 122 random bits).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity percent-encoded for use as one URL path segment.
    pub fn path_segment(&self) -> String {
        utf8_percent_encode(&self.0, PATH_SEGMENT).to_string()
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CertificateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CertificateId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CertificateId> for String {
    fn from(id: CertificateId) -> Self {
        id.0
    }
}

/// Resolves the identity a certificate is filed under.
///
/// A non-empty supplied identity is validated and used as-is; an absent or
/// empty one is replaced by a newly generated identity.
pub fn resolve_identity(supplied: Option<&str>) -> Result<CertificateId, IdentityError> {
    match supplied {
        Some(value) if !value.is_empty() => CertificateId::parse(value),
        _ => Ok(CertificateId::generate()),
    }
}
