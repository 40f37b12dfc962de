//! Parse errors for scanning/tree-building.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A required tag (`body`, an opening tag) is absent.
    MissingElement,
    /// A section was opened but never closed (`/head`, `/body`, `/html`).
    MissingCloseTag,
    /// Tag name outside the fixed vocabulary.
    UnrecognizedTag,
    /// Entity name or code that cannot be decoded.
    UnknownEntity,
    /// Inline markup nested deeper than the parser accepts.
    NestingTooDeep,
}

/// The single failure type of the conversion core.
///
/// Any failure aborts the whole conversion; callers get either a complete tree
/// or one of these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_element(what: &str) -> Self {
        Self::new(ParseErrorKind::MissingElement, format!("missing: {what}"))
    }

    pub fn missing_close_tag(what: &str) -> Self {
        Self::new(ParseErrorKind::MissingCloseTag, format!("missing: {what}"))
    }

    pub fn unrecognized_tag(tag: &str) -> Self {
        Self::new(
            ParseErrorKind::UnrecognizedTag,
            format!("tag not manageable: '{tag}'"),
        )
    }

    pub fn unknown_entity(token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnknownEntity,
            format!("no special symbol: {token}"),
        )
    }

    pub fn nesting_too_deep(tag: &str, limit: usize) -> Self {
        Self::new(
            ParseErrorKind::NestingTooDeep,
            format!("too deeply nested: '{tag}' (limit {limit})"),
        )
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_message() {
        let err = ParseError::missing_close_tag("/body");
        assert_eq!(err.to_string(), "missing: /body");
        assert_eq!(err.kind(), ParseErrorKind::MissingCloseTag);
    }

    #[test]
    fn unrecognized_tag_names_the_tag() {
        let err = ParseError::unrecognized_tag("span");
        assert_eq!(err.kind(), ParseErrorKind::UnrecognizedTag);
        assert!(err.message().contains("'span'"));
    }
}
