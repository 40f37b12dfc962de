//! Markdown projection of an element tree.
//!
//! Paired markers are driven from both halves of the visit stream: an element's opening visit
//! writes the opening marker and its closing pseudo-node writes the matching close. Leaves have
//! no closing visit, so leaf elements are rendered complete in one step.
use super::Renderer;
use crate::traverse::ElementVisitor;
use crate::types::{Element, ElementKind};

const INDENT_STEP: &str = "  ";
const CLOSING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}'];
const OPENING_BRACKETS: &[char] = &['(', '[', '{'];
const IMAGE_MARKER: &str = "![";
const ESCAPED_INLINE: &[char] = &['\\', '*', '_', '[', ']', '`'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownConfig {
    /// Marker for unordered list entries.
    pub bullet: char,
    /// Whether adjacent inline pieces of a block are separated by a space.
    ///
    /// Text payloads are trimmed by the scanner, so this restores word boundaries around inline
    /// markup. No space is added before closing punctuation or after an opening bracket.
    pub join_inline: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            bullet: '-',
            join_inline: true,
        }
    }
}

/// What a composite element left open, undone by its closing visit.
#[derive(Debug)]
enum Frame {
    Block,
    /// Block element nested inside another block; contributes no markup.
    Transparent,
    List,
    Entry,
    Marker(String),
}

#[derive(Debug)]
struct ListState {
    ordered: bool,
    next: usize,
}

#[derive(Debug)]
pub struct MarkdownRenderer {
    config: MarkdownConfig,
    out: String,
    frames: Vec<Frame>,
    lists: Vec<ListState>,
    // A block boundary was crossed and nothing has been written since.
    block_pending: bool,
    // The last write ended an inline piece that a following piece may be joined to.
    join_pending: bool,
    // Nothing but a line prefix (list marker, heading hashes) has been written on this line.
    line_start: bool,
}

impl MarkdownRenderer {
    pub fn new(config: MarkdownConfig) -> Self {
        Self {
            config,
            out: String::new(),
            frames: Vec::new(),
            lists: Vec::new(),
            block_pending: false,
            join_pending: false,
            line_start: true,
        }
    }

    fn at_top_level(&self) -> bool {
        self.frames.is_empty()
    }

    fn start_block(&mut self) {
        self.block_pending = true;
        self.join_pending = false;
    }

    fn flush_block_break(&mut self) {
        if !self.block_pending {
            return;
        }
        self.block_pending = false;
        self.line_start = true;
        if !self.out.is_empty() {
            let kept = self.out.trim_end().len();
            self.out.truncate(kept);
            self.out.push_str("\n\n");
        }
    }

    fn write_line_start(&mut self, prefix: &str) {
        self.flush_block_break();
        self.out.push_str(prefix);
        self.join_pending = false;
        self.line_start = true;
    }

    fn separator_needed(&self, next: &str) -> bool {
        let closes = next.starts_with(CLOSING_PUNCTUATION) && !next.starts_with(IMAGE_MARKER);
        self.config.join_inline
            && self.join_pending
            && !closes
            && !self.out.ends_with(OPENING_BRACKETS)
    }

    /// Start an inline piece with an opening marker.
    fn begin_piece(&mut self, marker: &str) {
        self.flush_block_break();
        if self.separator_needed(marker) {
            self.out.push(' ');
        }
        self.out.push_str(marker);
        self.join_pending = false;
        self.line_start = false;
    }

    /// Write a whole inline piece (a text payload, or a leaf rendered in one go).
    fn write_piece(&mut self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        self.flush_block_break();
        if self.separator_needed(piece) {
            self.out.push(' ');
        }
        self.out.push_str(piece);
        self.join_pending = true;
        self.line_start = false;
    }

    /// Write a text payload, escaped so it cannot be read back as Markdown syntax.
    fn write_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush_block_break();
        let escaped = escape_text(text, self.line_start);
        self.write_piece(&escaped);
    }

    /// Close an inline piece; the closing marker sticks to the preceding content.
    fn end_piece(&mut self, marker: &str) {
        self.out.push_str(marker);
        self.join_pending = true;
        self.line_start = false;
    }

    fn start_entry(&mut self) {
        self.flush_block_break();
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            let kept = self.out.trim_end().len();
            self.out.truncate(kept);
            self.out.push('\n');
        }

        let depth = self.lists.len().saturating_sub(1);
        for _ in 0..depth {
            self.out.push_str(INDENT_STEP);
        }

        match self.lists.last_mut() {
            Some(list) if list.ordered => {
                let n = list.next;
                list.next += 1;
                self.out.push_str(&format!("{n}. "));
            }
            _ => {
                self.out.push(self.config.bullet);
                self.out.push(' ');
            }
        }
        self.join_pending = false;
        self.line_start = true;
    }

    fn heading_prefix(level: u8) -> String {
        let mut prefix = "#".repeat(usize::from(level));
        prefix.push(' ');
        prefix
    }

    fn open(&mut self, element: &Element) -> Frame {
        let top_level = self.at_top_level();
        match element.kind() {
            ElementKind::Par if top_level => Frame::Block,
            ElementKind::Head { level } if top_level => {
                self.write_line_start(&Self::heading_prefix(level));
                Frame::Block
            }
            ElementKind::Par | ElementKind::Head { .. } => Frame::Transparent,
            ElementKind::OrdList | ElementKind::UnordList => {
                self.lists.push(ListState {
                    ordered: element.kind() == ElementKind::OrdList,
                    next: 1,
                });
                Frame::List
            }
            ElementKind::Entry => {
                self.start_entry();
                Frame::Entry
            }
            ElementKind::Bold => {
                self.begin_piece("**");
                Frame::Marker("**".to_string())
            }
            ElementKind::Italic => {
                self.begin_piece("*");
                Frame::Marker("*".to_string())
            }
            ElementKind::HtmlRef => match element.attr("href").filter(|h| !h.is_empty()) {
                Some(href) => {
                    let close = format!("]({href})");
                    self.begin_piece("[");
                    Frame::Marker(close)
                }
                None => Frame::Transparent,
            },
            ElementKind::Img => {
                let close = format!("]({})", element.attr("src").unwrap_or(""));
                self.begin_piece("![");
                Frame::Marker(close)
            }
            ElementKind::Ref => {
                match ref_target(element) {
                    Some(target) => self.begin_piece(&format!("[[{target}|")),
                    None => self.begin_piece("[["),
                }
                Frame::Marker("]]".to_string())
            }
            ElementKind::Text | ElementKind::Root => Frame::Transparent,
        }
    }

    fn close(&mut self, frame: Frame) {
        match frame {
            Frame::List => {
                self.lists.pop();
            }
            Frame::Marker(marker) => self.end_piece(&marker),
            Frame::Block | Frame::Transparent | Frame::Entry => {}
        }
    }

    fn visit_leaf(&mut self, element: &Element) {
        let text = element.text();
        match element.kind() {
            ElementKind::Text => self.write_text(text),
            ElementKind::Bold | ElementKind::Italic if text.is_empty() => {}
            ElementKind::HtmlRef => {
                let href = element.attr("href").unwrap_or("");
                let label = if text.is_empty() { href } else { text };
                if href.is_empty() {
                    self.write_piece(label);
                } else {
                    self.write_piece(&format!("[{label}]({href})"));
                }
            }
            ElementKind::Img => {
                let alt = element.attr("alt").filter(|a| !a.is_empty()).unwrap_or(text);
                let src = element.attr("src").unwrap_or("");
                if !alt.is_empty() || !src.is_empty() {
                    self.write_piece(&format!("![{alt}]({src})"));
                }
            }
            ElementKind::Ref => match (ref_target(element), text.is_empty()) {
                (Some(target), false) if target != text => {
                    self.write_piece(&format!("[[{target}|{text}]]"))
                }
                (Some(target), true) => self.write_piece(&format!("[[{target}]]")),
                (_, false) => self.write_piece(&format!("[[{text}]]")),
                (None, true) => {}
            },
            ElementKind::Head { .. } if text.is_empty() => {}
            _ => {
                let frame = self.open(element);
                self.write_text(text);
                self.close(frame);
            }
        }
    }
}

/// Byte offset of a leading block marker (`#`, `>`, `-`, `+`, `1.`, `1)`) that would turn a line
/// starting with `text` into a heading, quote or list entry.
fn block_marker_at(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let ends_marker = |i: usize| bytes.get(i).is_none_or(|b| b.is_ascii_whitespace());
    match bytes.first()? {
        b'#' | b'>' => Some(0),
        b'-' | b'+' if ends_marker(1) => Some(0),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            let delimited = matches!(bytes.get(digits), Some(b'.' | b')'));
            (delimited && ends_marker(digits + 1)).then_some(digits)
        }
        _ => None,
    }
}

fn escape_text(text: &str, line_start: bool) -> String {
    let marker = if line_start { block_marker_at(text) } else { None };
    let mut out = String::with_capacity(text.len() + 4);
    for (i, ch) in text.char_indices() {
        if marker == Some(i) || ESCAPED_INLINE.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn ref_target(element: &Element) -> Option<&str> {
    element
        .attr("href")
        .or_else(|| element.attr("target"))
        .filter(|t| !t.is_empty())
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(MarkdownConfig::default())
    }
}

impl ElementVisitor for MarkdownRenderer {
    fn visit(&mut self, element: &Element) {
        if element.is_root() {
            return;
        }
        if element.is_closing() {
            if let Some(frame) = self.frames.pop() {
                self.close(frame);
            }
            return;
        }

        if self.at_top_level() {
            self.start_block();
        }

        if element.is_leaf() {
            self.visit_leaf(element);
        } else {
            let frame = self.open(element);
            self.frames.push(frame);
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn finish(mut self) -> String {
        let kept = self.out.trim_end().len();
        self.out.truncate(kept);
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out
    }
}

pub fn render_markdown(root: &Element, config: &MarkdownConfig) -> String {
    super::render(root, MarkdownRenderer::new(config.clone()))
}
