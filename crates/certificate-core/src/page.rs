//! Page layout options for fixed-layout document conversion.
//!
//! Converters driven by a headless browser take their page geometry from
//! CSS, so the options are expressed as a print stylesheet that is injected
//! into the markup before conversion.

use serde::{Deserialize, Serialize};

/// Paper sizes supported for certificate documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    /// CSS `@page size` keyword for this format.
    pub fn css_keyword(self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::Letter => "letter",
        }
    }
}

/// Layout of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    pub format: PageFormat,
    pub landscape: bool,
    /// Keep background colours and images when printing.
    pub print_background: bool,
    /// Let `@page` rules declared by the markup take precedence.
    pub prefer_css_page_size: bool,
}

impl Default for PageOptions {
    /// Certificate layout: A4 landscape with backgrounds, template `@page` rules win.
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            landscape: true,
            print_background: true,
            prefer_css_page_size: true,
        }
    }
}

impl PageOptions {
    /// Print stylesheet expressing these options.
    pub fn print_css(&self) -> String {
        let orientation = if self.landscape { "landscape" } else { "portrait" };
        let mut css = format!(
            "@page {{ size: {} {}; margin: 0; }}",
            self.format.css_keyword(),
            orientation
        );
        if self.print_background {
            css.push_str(
                " html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }",
            );
        }
        css
    }

    /// Injects the print stylesheet into `markup`.
    ///
    /// With `prefer_css_page_size` the rule goes first in `<head>` so rules
    /// declared later by the markup override it; otherwise it goes last.
    pub fn apply(&self, markup: &str) -> String {
        let style = format!("<style>{}</style>", self.print_css());

        if self.prefer_css_page_size {
            if let Some(pos) = find_head_open_end(markup) {
                let mut out = String::with_capacity(markup.len() + style.len());
                out.push_str(&markup[..pos]);
                out.push_str(&style);
                out.push_str(&markup[pos..]);
                return out;
            }
        } else if let Some(pos) = markup.find("</head>") {
            let mut out = String::with_capacity(markup.len() + style.len());
            out.push_str(&markup[..pos]);
            out.push_str(&style);
            out.push_str(&markup[pos..]);
            return out;
        }

        format!("{}{}", style, markup)
    }
}

/// Byte offset just past the opening `<head ...>` tag, if present.
fn find_head_open_end(markup: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = markup[offset..].find("<head") {
        let start = offset + found;
        let rest = &markup[start + "<head".len()..];
        // Skip <header> and other tags sharing the prefix.
        if rest.starts_with('>') || rest.starts_with(char::is_whitespace) {
            let close = markup[start..].find('>')?;
            return Some(start + close + 1);
        }
        offset = start + "<head".len();
    }
    None
}
