// Certificate Core - identities, records and rendering inputs for certificate issuance

pub mod identity;
pub mod page;
pub mod template;
pub mod types;
pub mod view;

pub use identity::{resolve_identity, CertificateId, IdentityError, MAX_IDENTITY_LEN};
pub use page::{PageFormat, PageOptions};
pub use template::{CertificateTemplate, RenderError};
pub use types::{artifact_key, artifact_url, CertificateRecord, NewCertificate, PDF_CONTENT_TYPE};
pub use view::{format_issue_date, medal_data_uri, CertificateView};
