//! Traversal consumers that project an element tree into text.
mod markdown;
mod plain_text;

pub use markdown::{MarkdownConfig, MarkdownRenderer, render_markdown};
pub use plain_text::{PlainTextRenderer, render_plain_text};

use crate::traverse::{self, ElementVisitor};
use crate::types::Element;

/// A visitor that accumulates an output string.
pub trait Renderer: ElementVisitor {
    fn finish(self) -> String;
}

/// Walk `root` with `renderer` and return what it produced.
pub fn render<R: Renderer>(root: &Element, mut renderer: R) -> String {
    traverse::run(root, &mut renderer);
    renderer.finish()
}
