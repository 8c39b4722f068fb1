//! HTML rendering of certificate views.

use handlebars::Handlebars;

use crate::view::CertificateView;

/// Template shipped with the crate.
const DEFAULT_TEMPLATE: &str = include_str!("../assets/certificate.hbs");

const TEMPLATE_NAME: &str = "certificate";

/// Errors from compiling or rendering the certificate template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid certificate template: {0}")]
    Template(String),

    #[error("Failed to render certificate: {0}")]
    Render(String),
}

/// Compiled certificate template.
///
/// Fields are HTML-escaped on substitution; strict mode turns a field missing
/// from the view into an error rather than an empty string.
#[derive(Debug, Clone)]
pub struct CertificateTemplate {
    registry: Handlebars<'static>,
}

impl CertificateTemplate {
    /// Compiles the built-in template.
    pub fn new() -> Result<Self, RenderError> {
        Self::from_source(DEFAULT_TEMPLATE)
    }

    /// Compiles a template from handlebars source.
    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| RenderError::Template(e.to_string()))?;

        Ok(Self { registry })
    }

    /// Renders a view into HTML markup.
    pub fn render(&self, view: &CertificateView) -> Result<String, RenderError> {
        self.registry
            .render(TEMPLATE_NAME, view)
            .map_err(|e| RenderError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::CertificateId;

    fn view(name: &str) -> CertificateView {
        CertificateView {
            id: CertificateId::parse("abc-123").unwrap(),
            name: name.to_string(),
            grade: "9.5".to_string(),
            issue_date: "18/10/2026".to_string(),
            medal_image: "data:image/svg+xml;base64,PHN2Zz4=".to_string(),
        }
    }

    #[test]
    fn test_from_source_substitutes_fields() {
        let template = CertificateTemplate::from_source("{{name}}|{{grade}}|{{date}}|{{id}}").unwrap();
        let html = template.render(&view("Ana")).unwrap();
        assert_eq!(html, "Ana|9.5|18/10/2026|abc-123");
    }

    #[test]
    fn test_fields_are_html_escaped() {
        let template = CertificateTemplate::from_source("<p>{{name}}</p>").unwrap();
        let html = template.render(&view("<script>alert(1)</script>")).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unknown_field_fails_in_strict_mode() {
        let template = CertificateTemplate::from_source("{{signature}}").unwrap();
        let result = template.render(&view("Ana"));
        assert!(matches!(result, Err(RenderError::Render(_))));
    }

    #[test]
    fn test_malformed_template_is_rejected() {
        let result = CertificateTemplate::from_source("{{#if name}}unterminated");
        assert!(matches!(result, Err(RenderError::Template(_))));
    }
}
