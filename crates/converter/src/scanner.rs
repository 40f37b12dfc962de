//! Character-level scanner over the editor's HTML dialect.
//!
//! The scanner owns an immutable, whitespace-trimmed copy of the input and a forward-moving
//! cursor. Lookahead (`peek_token_category`, `peek_next_tag`) saves and restores the cursor, so a
//! single logical lookahead never leaves the scanner in a different state.
//!
//! Known limitations (intentional):
//! - Tag attributes are not tokenized here; `read_tag` drops them and
//!   `read_tag_with_attributes` hands them back as raw text.
//! - A `>` inside a quoted attribute value terminates the tag.
//! - No comments, DOCTYPE, CDATA or rawtext handling.
use crate::entities::char_from_entity_name;
use crate::error::{ParseError, Result};
use memchr::memchr;

const CH_OPEN_TAG: char = '<';
const CH_CLOSE_TAG: char = '>';
const CH_ENTITY: char = '&';
const CH_ENTITY_END: char = ';';

/// Classification of the character under the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenCategory {
    /// Ordinary character.
    Text,
    /// Whitespace, including newlines.
    Blank,
    /// An opening angle bracket.
    Tag,
    /// An ampersand introducing a character reference.
    Entity,
    /// Cursor at or past end-of-data.
    End,
}

#[derive(Clone, Debug)]
pub struct Scanner {
    text: String,
    // Byte offset into `text`, always on a char boundary.
    pos: usize,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            pos: 0,
        }
    }

    /// Size of the (trimmed) input, in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn whole_text(&self) -> &str {
        &self.text
    }

    /// Input not yet consumed.
    pub fn remaining(&self) -> &str {
        &self.text[self.pos..]
    }

    pub fn pending_chars(&self) -> usize {
        self.remaining().chars().count()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Restore a cursor obtained from `pos()`. Positions past the end clamp to end-of-data;
    /// positions inside a multi-byte char snap back to its start.
    pub fn move_to(&mut self, pos: usize) {
        let mut pos = pos.min(self.text.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        self.pos = pos;
    }

    pub fn is_eod(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn current(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Char under the cursor, or `'\0'` at end-of-data.
    pub fn current_char(&self) -> char {
        self.current().unwrap_or('\0')
    }

    pub fn token_category(&self) -> TokenCategory {
        match self.current() {
            None => TokenCategory::End,
            Some(ch) if ch.is_whitespace() => TokenCategory::Blank,
            Some(CH_OPEN_TAG) => TokenCategory::Tag,
            Some(CH_ENTITY) => TokenCategory::Entity,
            Some(_) => TokenCategory::Text,
        }
    }

    /// Category of the next significant (non-blank) token, without moving the cursor.
    pub fn peek_token_category(&mut self) -> TokenCategory {
        let saved = self.pos;
        self.skip_whitespace();
        let category = self.token_category();
        self.pos = saved;
        category
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    /// Advance exactly one char. No-op at end-of-data.
    pub fn skip(&mut self) {
        self.skip_by(1);
    }

    /// Advance `n` chars, stopping at end-of-data.
    pub fn skip_by(&mut self, n: usize) {
        for _ in 0..n {
            match self.current() {
                Some(ch) => self.pos += ch.len_utf8(),
                None => break,
            }
        }
    }

    /// Consume `ch` if it is next; otherwise leave the cursor alone.
    pub fn match_char(&mut self, ch: char) -> bool {
        if self.current() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume `text` if the input continues with it exactly; otherwise leave the cursor alone.
    pub fn match_text(&mut self, text: &str) -> bool {
        if !text.is_empty() && self.remaining().starts_with(text) {
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    /// Read a `<name ...>` or `</name>` construct.
    ///
    /// Returns the lower-cased, trimmed name (a leading `/` is kept), or an empty string when
    /// there is no tag at the cursor or the input ends before `>`. A malformed prefix is still
    /// consumed.
    pub fn read_tag(&mut self) -> String {
        self.read_tag_with_attributes().0
    }

    /// Same as `read_tag`, also returning the raw text that follows the name up to `>`.
    pub fn read_tag_with_attributes(&mut self) -> (String, String) {
        let mut name = String::new();
        let mut attributes = String::new();

        self.skip_whitespace();
        if !self.match_char(CH_OPEN_TAG) {
            return (name, attributes);
        }

        let mut in_attributes = false;
        while let Some(ch) = self.current() {
            if ch == CH_CLOSE_TAG {
                break;
            }
            self.pos += ch.len_utf8();

            if in_attributes {
                attributes.push(ch);
            } else if ch.is_whitespace() {
                in_attributes = true;
            } else {
                name.push(ch);
            }
        }

        if !self.match_char(CH_CLOSE_TAG) {
            log::trace!(target: "converter.scanner", "unterminated tag '<{name}'");
            return (String::new(), String::new());
        }

        (
            name.trim().to_lowercase(),
            attributes.trim().to_string(),
        )
    }

    /// Name of the upcoming tag, without consuming it; `None` when the next significant token
    /// is not a tag.
    pub fn peek_next_tag(&mut self) -> Option<String> {
        if self.peek_token_category() != TokenCategory::Tag {
            return None;
        }
        let saved = self.pos;
        let tag = self.read_tag();
        self.pos = saved;
        Some(tag)
    }

    /// Whether the upcoming tag is `name` (compared case-insensitively).
    pub fn is_next_tag(&mut self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.peek_next_tag().is_some_and(|tag| tag == wanted)
    }

    /// Read free text up to the next tag or end-of-data.
    ///
    /// Ordinary chars are copied verbatim, runs of whitespace collapse into one space and
    /// character references are decoded. The result is trimmed.
    pub fn read_text(&mut self) -> Result<String> {
        let mut out = String::new();

        self.skip_whitespace();
        loop {
            match self.token_category() {
                TokenCategory::Text => {
                    out.push(self.current_char());
                    self.skip();
                }
                TokenCategory::Blank => {
                    out.push(' ');
                    self.skip_whitespace();
                }
                TokenCategory::Entity => {
                    if let Some(ch) = self.read_entity()? {
                        out.push(ch);
                    }
                }
                TokenCategory::Tag | TokenCategory::End => break,
            }
        }

        Ok(out.trim_matches(|ch: char| ch.is_ascii_whitespace()).to_string())
    }

    /// Read a `&name;` / `&#code;` reference at the cursor.
    ///
    /// Returns `Ok(None)` when there is no reference at the cursor, or when a numeric reference
    /// does not contain a number. The body stops at `;`, whitespace, `<` or another `&`; anything
    /// but `;` there is an unterminated reference and fails with `UnknownEntity`.
    pub fn read_entity(&mut self) -> Result<Option<char>> {
        self.skip_whitespace();
        if !self.match_char(CH_ENTITY) {
            return Ok(None);
        }

        let mut token = String::with_capacity(10);
        while let Some(ch) = self.current() {
            if ch == CH_ENTITY_END || ch == CH_OPEN_TAG || ch == CH_ENTITY || ch.is_whitespace() {
                break;
            }
            token.push(ch);
            self.pos += ch.len_utf8();
        }

        if !self.match_char(CH_ENTITY_END) {
            return Err(ParseError::unknown_entity(&format!("&{token}")));
        }

        char_from_entity_name(&token)
    }

    /// Copy raw input up to (not including) the next `closing` tag, or to end-of-data.
    ///
    /// Nested tags, including tags with the same name, are copied verbatim; depth is not tracked.
    /// Whitespace immediately before the closing tag is not part of the result.
    pub(crate) fn read_raw_until_tag(&mut self, closing: &str) -> String {
        let mut raw = String::new();

        while !self.is_eod() {
            let Some(offset) = memchr(b'<', &self.text.as_bytes()[self.pos..]) else {
                raw.push_str(&self.text[self.pos..]);
                self.pos = self.text.len();
                break;
            };

            // `<` is ASCII, so the offset is a char boundary.
            let lt = self.pos + offset;
            raw.push_str(&self.text[self.pos..lt]);
            self.pos = lt;

            if self.peek_next_tag().as_deref() == Some(closing) {
                let kept = raw.trim_end_matches(char::is_whitespace).len();
                raw.truncate(kept);
                break;
            }

            raw.push(CH_OPEN_TAG);
            self.pos += 1;
        }

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    const COMPACT_DOC: &str = "<html><head><title>Hola, mundo!</title></head>\n<body>Hola!</body></html>\n";

    const INDENTED_DOC: &str = "<html>
    <head>
        <title>Hola, mundo!</title>
    </head>
<body>
    Hola!
</body>
</html>
";

    #[test]
    fn cursor_walks_every_char() {
        let mut scanner = Scanner::new(COMPACT_DOC);
        let text = scanner.whole_text().to_string();
        for ch in text.chars() {
            assert_eq!(ch, scanner.current_char());
            scanner.skip();
        }
        assert!(scanner.is_eod());
        assert_eq!(scanner.pending_chars(), 0);
        assert_eq!(scanner.current_char(), '\0');
        assert_eq!(scanner.token_category(), TokenCategory::End);
    }

    #[test]
    fn input_is_trimmed() {
        let scanner = Scanner::new("  \n <p>x</p> \n");
        assert_eq!(scanner.whole_text(), "<p>x</p>");
    }

    #[test]
    fn blanks_collapse_in_text() {
        let mut scanner = Scanner::new("text  \t\n  text");
        assert_eq!(scanner.token_category(), TokenCategory::Text);
        assert_eq!(scanner.peek_token_category(), TokenCategory::Text);
        assert_eq!(scanner.read_text().unwrap(), "text text");
    }

    #[test]
    fn match_char_and_text() {
        let mut scanner = Scanner::new("text  \t\n  text");
        while !scanner.is_eod() {
            assert!(scanner.match_char('t'));
            assert!(scanner.match_char('e'));
            assert!(!scanner.match_char('e'));
            assert!(scanner.match_char('x'));
            assert!(scanner.match_char('t'));
            scanner.skip_whitespace();
        }

        let mut scanner = Scanner::new("text  \t\n  text");
        assert!(scanner.match_text("text"));
        scanner.skip_whitespace();
        assert!(!scanner.match_text("texts"));
        assert_eq!(scanner.remaining(), "text");
        assert!(scanner.match_text("text"));
        assert!(scanner.is_eod());
    }

    fn assert_read_tag_sequence(input: &str) {
        let mut scanner = Scanner::new(input);
        assert_eq!(scanner.token_category(), TokenCategory::Tag);
        assert_eq!(scanner.read_tag(), "html");
        assert_eq!(scanner.read_tag(), "head");
        assert_eq!(scanner.read_tag(), "title");
        assert_eq!(scanner.read_text().unwrap(), "Hola, mundo!");
        assert_eq!(scanner.read_tag(), "/title");
        assert_eq!(scanner.read_tag(), "/head");
        assert_eq!(scanner.read_tag(), "body");
        assert_eq!(scanner.read_text().unwrap(), "Hola!");
        assert_eq!(scanner.read_tag(), "/body");
        assert_eq!(scanner.read_tag(), "/html");
        assert!(scanner.is_eod());
    }

    #[test]
    fn read_tag_compact_and_indented() {
        assert_read_tag_sequence(COMPACT_DOC);
        assert_read_tag_sequence(INDENTED_DOC);
    }

    #[test]
    fn read_tag_drops_attributes_and_lowercases() {
        let mut scanner = Scanner::new("<Body><P style=\"margin-top: 0\">test</p></BODY>");
        assert_eq!(scanner.read_tag(), "body");
        assert_eq!(scanner.read_tag(), "p");
        assert_eq!(scanner.read_text().unwrap(), "test");
        assert_eq!(scanner.read_tag(), "/p");
        assert_eq!(scanner.read_tag(), "/body");
    }

    #[test]
    fn read_tag_with_attributes_keeps_raw_attributes() {
        let mut scanner = Scanner::new("<a href=\"notes/2.md\"  title='x'>go</a>");
        let (name, attributes) = scanner.read_tag_with_attributes();
        assert_eq!(name, "a");
        assert_eq!(attributes, "href=\"notes/2.md\"  title='x'");
        assert_eq!(scanner.read_text().unwrap(), "go");
    }

    #[test]
    fn unterminated_tag_is_empty_but_consumed() {
        let mut scanner = Scanner::new("<p class=x");
        assert_eq!(scanner.read_tag(), "");
        assert!(scanner.is_eod());
    }

    #[test]
    fn read_tag_without_tag_is_empty() {
        let mut scanner = Scanner::new("plain");
        assert_eq!(scanner.read_tag(), "");
        assert_eq!(scanner.pos(), 0);
    }

    #[test]
    fn peek_next_tag_restores_cursor() {
        let mut scanner = Scanner::new("<p>Hola</p>");
        assert_eq!(scanner.peek_next_tag().as_deref(), Some("p"));
        assert_eq!(scanner.pos(), 0);
        assert!(scanner.is_next_tag("P"));
        assert_eq!(scanner.read_tag(), "p");
        assert_eq!(scanner.peek_next_tag(), None);
    }

    #[test]
    fn entities_decode_inside_text() {
        let mut scanner = Scanner::new("&lt;mensaje&gt;");
        assert_eq!(scanner.token_category(), TokenCategory::Entity);
        assert_eq!(scanner.read_text().unwrap(), "<mensaje>");

        let mut scanner = Scanner::new("Espa&ntilde;a &amp; caf&eacute; &#65;&#x42;");
        assert_eq!(scanner.read_text().unwrap(), "España & café AB");
    }

    #[test]
    fn malformed_numeric_entity_is_dropped() {
        let mut scanner = Scanner::new("a&#zz;b");
        assert_eq!(scanner.read_text().unwrap(), "ab");
    }

    #[test]
    fn unknown_entity_fails() {
        let mut scanner = Scanner::new("&bogus; text");
        let err = scanner.read_text().unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnknownEntity);
    }

    #[test]
    fn unterminated_entity_fails() {
        let mut scanner = Scanner::new("Tom & Jerry");
        let err = scanner.read_text().unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnknownEntity);
    }

    #[test]
    fn read_entity_without_ampersand_is_none() {
        let mut scanner = Scanner::new("x");
        assert_eq!(scanner.read_entity(), Ok(None));
        assert_eq!(scanner.pos(), 0);
    }

    #[test]
    fn raw_capture_stops_at_matching_close_tag() {
        let mut scanner = Scanner::new("First <i>paragraph</i>.  </p><p>next</p>");
        let raw = scanner.read_raw_until_tag("/p");
        assert_eq!(raw, "First <i>paragraph</i>.");
        assert_eq!(scanner.read_tag(), "/p");
        assert_eq!(scanner.read_tag(), "p");
    }

    #[test]
    fn raw_capture_does_not_track_depth() {
        let mut scanner = Scanner::new("a <b>b <b>c</b> d</b>");
        let raw = scanner.read_raw_until_tag("/b");
        assert_eq!(raw, "a <b>b <b>c");
    }

    #[test]
    fn raw_capture_runs_to_end_without_close_tag() {
        let mut scanner = Scanner::new("añ <i>x</i> ü");
        let raw = scanner.read_raw_until_tag("/p");
        assert_eq!(raw, "añ <i>x</i> ü");
        assert!(scanner.is_eod());
    }

    #[test]
    fn skip_by_stops_at_end() {
        let mut scanner = Scanner::new("ñu");
        scanner.skip_by(5);
        assert!(scanner.is_eod());
        scanner.skip();
        assert!(scanner.is_eod());
        scanner.move_to(100);
        assert!(scanner.is_eod());
        scanner.move_to(0);
        assert_eq!(scanner.current_char(), 'ñ');
    }

    #[test]
    fn move_to_snaps_to_char_start() {
        let mut scanner = Scanner::new("añu");
        scanner.move_to(2);
        assert_eq!(scanner.pos(), 1);
        assert_eq!(scanner.current_char(), 'ñ');
        assert_eq!(scanner.remaining(), "ñu");
    }
}
