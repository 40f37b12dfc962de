//! Recursive-descent parser building an element tree from the note HTML dialect.
//!
//! Parsing is two-phase. A tag's contents are first captured raw, up to the first tag that
//! closes it (see `Scanner::read_raw_until_tag`), and the captured text is then re-lexed with a
//! fresh scanner to discover inline markup. Same-named nested tags are not depth-tracked.
//!
//! Any failure aborts the whole parse: callers get a complete tree or a `ParseError`.
//! Re-lexing recurses once per nesting level, so inline markup deeper than
//! `MAX_NESTING_DEPTH` fails with `NestingTooDeep`.
use crate::entities::decode_entities;
use crate::error::{ParseError, ParseErrorKind, Result};
use crate::scanner::{Scanner, TokenCategory};
use crate::types::{Document, Element, ElementKind, Id, NodeId, TEXT_TAG};

/// Deepest inline nesting re-lexed below a block element.
pub const MAX_NESTING_DEPTH: usize = 256;

/// A tag read by `read_whole_element`, before it is turned into an element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct RawElement {
    tag: String,
    attributes: String,
    contents: String,
}

#[derive(Debug)]
pub struct HtmlParser {
    scanner: Scanner,
    title: String,
    next_id: NodeId,
    depth: usize,
}

impl HtmlParser {
    pub fn new(text: &str) -> Self {
        Self::with_scanner(Scanner::new(text))
    }

    pub fn with_scanner(scanner: Scanner) -> Self {
        Self {
            scanner,
            title: String::new(),
            next_id: 1,
            depth: 0,
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut Scanner {
        &mut self.scanner
    }

    /// Title captured by the last `read_head`; empty when absent.
    pub fn title(&self) -> &str {
        &self.title
    }

    fn fresh_id(&mut self) -> Id {
        let id = Id(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Consume the next tag only when its name is `name`.
    pub fn match_tag(&mut self, name: &str) -> bool {
        if self.scanner.is_next_tag(name) {
            self.scanner.read_tag();
            true
        } else {
            false
        }
    }

    /// Read a whole `<tag>...</tag>` construct and return its raw, unparsed contents.
    pub fn read_whole_tag(&mut self) -> Result<String> {
        Ok(self.read_whole_element()?.contents)
    }

    fn read_whole_element(&mut self) -> Result<RawElement> {
        self.scanner.skip_whitespace();
        if self.scanner.token_category() != TokenCategory::Tag {
            return Err(ParseError::new(
                ParseErrorKind::MissingElement,
                format!("expecting tag, found: '{}'", self.scanner.current_char()),
            ));
        }

        let (tag, attributes) = self.scanner.read_tag_with_attributes();

        // `<img .../>` has no contents to capture.
        if let Some(attributes) = attributes.strip_suffix('/') {
            return Ok(RawElement {
                tag,
                attributes: attributes.trim_end().to_string(),
                contents: String::new(),
            });
        }
        if let Some(tag) = tag.strip_suffix('/') {
            return Ok(RawElement {
                tag: tag.to_string(),
                attributes,
                contents: String::new(),
            });
        }

        let closing = format!("/{tag}");
        let contents = self.scanner.read_raw_until_tag(&closing);
        if !self.match_tag(&closing) {
            log::trace!(target: "converter.parser", "<{tag}> runs to end of input");
        }

        Ok(RawElement {
            tag,
            attributes,
            contents,
        })
    }

    /// Read the optional `<html>` and `<head>` prologue and return the document title.
    ///
    /// Tags other than `<title>` inside the head are skipped whole.
    pub fn read_head(&mut self) -> Result<String> {
        self.title.clear();
        self.match_tag("html");

        if self.match_tag("head") {
            while !self.scanner.is_eod()
                && !self.scanner.is_next_tag("title")
                && !self.scanner.is_next_tag("/head")
            {
                self.read_whole_tag()?;
            }

            if self.scanner.is_next_tag("title") {
                let raw = self.read_whole_tag()?;
                self.title = Scanner::new(&raw).read_text()?;
            }

            while !self.scanner.is_eod() && !self.scanner.is_next_tag("/head") {
                self.read_whole_tag()?;
            }

            if !self.match_tag("/head") {
                return Err(ParseError::missing_close_tag("/head"));
            }
        }

        Ok(self.title.clone())
    }

    /// Parse the whole document and return the root of its body.
    ///
    /// The body is a flat sequence of block elements; free text at this level is wrapped into a
    /// paragraph.
    pub fn read_body(&mut self) -> Result<Element> {
        if self.scanner.is_next_tag("html") || self.scanner.is_next_tag("head") {
            self.read_head()?;
        }

        if !self.match_tag("body") {
            return Err(ParseError::missing_element("body"));
        }

        let mut root = Element::root();
        root.set_id(self.fresh_id());

        while !self.scanner.is_eod() && !self.scanner.is_next_tag("/body") {
            match self.scanner.peek_token_category() {
                TokenCategory::Tag => {
                    let element = self.read_element()?;
                    root.add(element);
                }
                TokenCategory::Text | TokenCategory::Entity => {
                    let text = self.scanner.read_text()?;
                    if text.is_empty() {
                        continue;
                    }
                    let mut par = Element::new(ElementKind::Par, "");
                    par.set_id(self.fresh_id());
                    par.add(self.text_element(text));
                    root.add(par);
                }
                TokenCategory::Blank | TokenCategory::End => break,
            }
        }

        if !self.match_tag("/body") {
            return Err(ParseError::missing_close_tag("/body"));
        }
        if !self.match_tag("/html") {
            return Err(ParseError::missing_close_tag("/html"));
        }

        log::debug!(
            target: "converter.parser",
            "parsed body: {} blocks, title {:?}",
            root.count(),
            self.title
        );
        Ok(root)
    }

    /// `read_body`, bundled with the title into a `Document`.
    pub fn parse_document(&mut self) -> Result<Document> {
        let root = self.read_body()?;
        Ok(Document {
            title: self.title.clone(),
            root,
        })
    }

    fn read_element(&mut self) -> Result<Element> {
        let raw = self.read_whole_element()?;

        let name = raw.tag.trim().trim_start_matches('/');
        if name.eq_ignore_ascii_case(TEXT_TAG) {
            return Err(ParseError::unrecognized_tag(name));
        }

        let mut element = Element::create_for(&raw.tag, raw.contents)?;
        element.set_id(self.fresh_id());
        element.set_attributes(parse_attributes(&raw.attributes));
        log::trace!(target: "converter.parser", "<{}> {:?}", raw.tag, element.id());

        self.parse_inline_into(&mut element)?;
        Ok(element)
    }

    fn text_element(&mut self, text: String) -> Element {
        let mut element = Element::new(ElementKind::Text, text);
        element.set_id(self.fresh_id());
        element
    }

    /// Re-lex the raw text captured in `element`, attaching its inline structure as children.
    fn parse_inline_into(&mut self, element: &mut Element) -> Result<()> {
        if element.text().is_empty() {
            return Ok(());
        }
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::nesting_too_deep(element.tag(), MAX_NESTING_DEPTH));
        }

        let inner = Scanner::new(element.text());
        let outer = std::mem::replace(&mut self.scanner, inner);
        self.depth += 1;
        let result = self.parse_inline_children(element);
        self.depth -= 1;
        self.scanner = outer;
        result
    }

    fn parse_inline_children(&mut self, element: &mut Element) -> Result<()> {
        loop {
            match self.scanner.peek_token_category() {
                TokenCategory::End => return Ok(()),
                TokenCategory::Blank => self.scanner.skip_whitespace(),
                TokenCategory::Text | TokenCategory::Entity => {
                    let text = self.scanner.read_text()?;
                    if !text.is_empty() {
                        let child = self.text_element(text);
                        element.add(child);
                    }
                }
                TokenCategory::Tag => {
                    let child = self.read_element()?;
                    element.add(child);
                }
            }
        }
    }
}

/// Split raw attribute text into `(name, value)` pairs.
///
/// Names are lower-cased. Quoted values have their character references decoded; bare names
/// carry no value.
pub fn parse_attributes(raw: &str) -> Vec<(String, Option<String>)> {
    let bytes = raw.as_bytes();
    let len = bytes.len();
    let mut k = 0;
    let mut attributes = Vec::new();

    let skip_whitespace = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };
    let is_name_char = |c: u8| c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':';

    loop {
        skip_whitespace(&mut k);
        if k >= len {
            break;
        }
        let name_start = k;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            // Skip one whole char; `k` must stay on a char boundary.
            k += raw[k..].chars().next().map_or(1, char::len_utf8);
            continue;
        }
        let name = raw[name_start..k].to_ascii_lowercase();

        skip_whitespace(&mut k);
        let value = if k < len && bytes[k] == b'=' {
            k += 1;
            skip_whitespace(&mut k);
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let vstart = k;
                while k < len && bytes[k] != quote {
                    k += 1;
                }
                let value = decode_entities(&raw[vstart..k]);
                if k < len {
                    k += 1;
                }
                Some(value)
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() {
                    k += 1;
                }
                Some(raw[vstart..k].to_string())
            }
        } else {
            None
        };
        attributes.push((name, value));
    }

    attributes
}
