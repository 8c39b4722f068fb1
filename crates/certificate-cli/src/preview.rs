// Offline rendering of certificate markup

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use certificate_core::{
    resolve_identity, CertificateRecord, CertificateTemplate, CertificateView, PageOptions,
};
use chrono::Utc;

/// Renders the printable certificate markup for the given fields.
///
/// The output is exactly what the server hands to its PDF converter.
pub fn render_preview(id: Option<&str>, name: &str, grade: &str) -> Result<String> {
    let id = resolve_identity(id).map_err(|e| anyhow!("Invalid certificate id: {}", e))?;
    let record = CertificateRecord {
        id,
        name: name.to_string(),
        grade: grade.to_string(),
        created_at: Utc::now(),
    };

    let template = CertificateTemplate::new()?;
    let markup = template.render(&CertificateView::from_record(&record))?;
    Ok(PageOptions::default().apply(&markup))
}

/// Renders a preview and writes it to `output`.
pub fn write_preview(output: &Path, id: Option<&str>, name: &str, grade: &str) -> Result<()> {
    let html = render_preview(id, name, grade)?;
    std::fs::write(output, html)
        .with_context(|| format!("Failed to write '{}'", output.display()))
}
