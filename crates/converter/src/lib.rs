//! Conversion core for notes: the editor's HTML dialect to an element tree, and the tree to
//! plain text or Markdown.
//!
//! Pipeline: `Scanner` (characters to tokens) -> `HtmlParser` (tokens to `Element` tree) ->
//! `traverse::run` (tree to visit stream) -> renderers (visit stream to text).
pub mod debug;
pub mod perf_fixtures;
pub mod render;
pub mod traverse;

mod convert;
mod entities;
mod error;
mod parser;
mod scanner;
mod types;

pub use crate::convert::{CONVERSION_ERROR_PREFIX, NoteFormatConverter, md_from_html};
pub use crate::entities::{char_from_entity_name, named_entity};
pub use crate::error::{ParseError, ParseErrorKind, Result};
pub use crate::parser::{HtmlParser, parse_attributes};
pub use crate::render::{MarkdownConfig, render_markdown, render_plain_text};
pub use crate::scanner::{Scanner, TokenCategory};
pub use crate::traverse::ElementVisitor;
pub use crate::types::{Document, Element, ElementKind, Id, NodeId};

pub fn parse_document(html: &str) -> Result<Document> {
    HtmlParser::new(html).parse_document()
}
