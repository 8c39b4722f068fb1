// HTTP client for the certificate server API

use anyhow::{anyhow, Context, Result};
use certificate_core::CertificateId;
use serde::{Deserialize, Serialize};

/// Body of an issuance request.
#[derive(Debug, Serialize)]
pub struct IssuePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    pub name: &'a str,
    pub grade: &'a str,
}

/// Certificate returned by the issuance endpoint.
#[derive(Debug, Deserialize)]
pub struct IssuedCertificate {
    pub message: String,
    pub url: String,
    pub id: String,
    pub name: String,
    pub grade: String,
    pub date: String,
}

/// Certificate returned by a successful verification.
#[derive(Debug, Deserialize)]
pub struct ValidCertificate {
    pub message: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// Result of a verification request.
#[derive(Debug)]
pub enum VerifyOutcome {
    Valid(ValidCertificate),
    Invalid(String),
}

/// Blocking client for `/api/v1/certificates`.
pub struct CertificateClient {
    base_url: String,
    agent: ureq::Agent,
}

impl CertificateClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// URL of an API path relative to the server base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/certificates{}", self.base_url, path)
    }

    /// Verification URL of `id`, percent-encoded as one path segment.
    pub fn certificate_url(&self, id: &CertificateId) -> String {
        self.endpoint(&format!("/{}", id.path_segment()))
    }

    pub fn issue(&self, payload: &IssuePayload<'_>) -> Result<IssuedCertificate> {
        let url = self.endpoint("");
        match self.agent.post(&url).send_json(payload) {
            Ok(response) => response
                .into_json()
                .context("Failed to parse issuance response"),
            Err(ureq::Error::Status(code, response)) => {
                Err(anyhow!("Server rejected issuance ({}): {}", code, error_message(response)))
            }
            Err(e) => Err(anyhow!("Failed to reach {}: {}", url, e)),
        }
    }

    pub fn verify(&self, id: &str) -> Result<VerifyOutcome> {
        let id = CertificateId::parse(id).map_err(|e| anyhow!("Invalid certificate id: {}", e))?;
        let url = self.certificate_url(&id);

        match self.agent.get(&url).call() {
            Ok(response) => Ok(VerifyOutcome::Valid(
                response
                    .into_json()
                    .context("Failed to parse verification response")?,
            )),
            Err(ureq::Error::Status(400, response)) => {
                Ok(VerifyOutcome::Invalid(error_message(response)))
            }
            Err(ureq::Error::Status(code, response)) => {
                Err(anyhow!("Server error ({}): {}", code, error_message(response)))
            }
            Err(e) => Err(anyhow!("Failed to reach {}: {}", url, e)),
        }
    }
}

/// Extracts the `message` field of an error body, falling back to the raw text.
fn error_message(response: ureq::Response) -> String {
    let text = response.into_string().unwrap_or_default();
    serde_json::from_str::<MessageBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text)
}
