use crate::error::Result;
use crate::parser::HtmlParser;
use crate::render::{MarkdownConfig, render_markdown, render_plain_text};
use crate::types::{Document, Element};
use std::fmt;

/// Converts the editor's HTML into the note storage format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteFormatConverter {
    document: Document,
    config: MarkdownConfig,
}

impl NoteFormatConverter {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_config(html, MarkdownConfig::default())
    }

    pub fn from_html_with_config(html: &str, config: MarkdownConfig) -> Result<Self> {
        let document = HtmlParser::new(html).parse_document()?;
        Ok(Self { document, config })
    }

    pub fn title(&self) -> &str {
        &self.document.title
    }

    pub fn root(&self) -> &Element {
        &self.document.root
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn to_markdown(&self) -> String {
        render_markdown(self.root(), &self.config)
    }

    pub fn to_plain_text(&self) -> String {
        render_plain_text(self.root())
    }
}

impl fmt::Display for NoteFormatConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markdown())
    }
}

/// Prefix of the line `md_from_html` returns in place of unparseable input.
pub const CONVERSION_ERROR_PREFIX: &str = "ERROR converting from HTML: ";

/// Markdown for `html`, or an error line in its place when the input does not parse.
pub fn md_from_html(html: &str) -> String {
    match NoteFormatConverter::from_html(html) {
        Ok(converter) => converter.to_markdown(),
        Err(err) => {
            log::warn!(target: "converter.parser", "conversion failed: {err}");
            format!("{CONVERSION_ERROR_PREFIX}{err}")
        }
    }
}
