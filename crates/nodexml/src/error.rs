//! Error types for nodexml

use std::fmt;
use thiserror::Error;

/// Position in markup source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in markup source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.line == 0 && self.end.line == 0
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Element or attribute name outside the XML name grammar.
    /// `parent` is `None` when the offending name is the root element's.
    InvalidName {
        name: String,
        parent: Option<String>,
    },
    /// Raw markup under `@xml` could not be parsed
    MalformedFragment { message: String },
    /// A reserved key holds a node of the wrong shape
    InvalidContent {
        key: String,
        parent: String,
        expected: &'static str,
    },
    InvalidToken,
    Expected { expected: String, found: String },
    UnexpectedEof,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { name, parent } => match parent {
                Some(parent) => write!(f, "invalid name '{name}' in element '{parent}'"),
                None => write!(f, "invalid root element name '{name}'"),
            },
            Self::MalformedFragment { message } => write!(f, "malformed xml fragment: {message}"),
            Self::InvalidContent {
                key,
                parent,
                expected,
            } => write!(f, "'{key}' in element '{parent}' must be {expected}"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::MaxDepthExceeded { max } => {
                write!(f, "max depth exceeded: {max}")
            }
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
        }
    }
}

/// Main error type for nodexml
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    /// Error with no source position, as raised while building a tree
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn invalid_name(name: &str, parent: Option<&str>) -> Self {
        Self::from_kind(ErrorKind::InvalidName {
            name: name.to_string(),
            parent: parent.map(str::to_string),
        })
    }

    pub fn invalid_content(key: &str, parent: &str, expected: &'static str) -> Self {
        Self::from_kind(ErrorKind::InvalidContent {
            key: key.to_string(),
            parent: parent.to_string(),
            expected,
        })
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, offset: usize, line: u32, col: u32) -> Self {
        let pos = Pos::new(offset, line, col);
        Self::new(kind, Span::new(pos, pos))
    }

    /// Rewrap a markup parser error raised inside an `@xml` value
    pub(crate) fn into_fragment_error(self) -> Self {
        if matches!(
            self.kind,
            ErrorKind::MaxDepthExceeded { .. } | ErrorKind::MaxSizeExceeded { .. }
        ) {
            return self;
        }
        let message = if self.span.is_empty() {
            self.message
        } else {
            format!("{} at {}", self.message, self.span.start)
        };
        Self::from_kind(ErrorKind::MalformedFragment { message })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for nodexml
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        let pos = Pos::new(42, 10, 5);
        assert_eq!(pos.to_string(), "42:10:5");
    }

    #[test]
    fn test_invalid_name_display() {
        let err = Error::invalid_name("1bad", Some("root"));
        assert_eq!(err.to_string(), "invalid name '1bad' in element 'root'");

        let err = Error::invalid_name("", None);
        assert_eq!(err.to_string(), "invalid root element name ''");
    }

    #[test]
    fn test_positioned_error_display() {
        let err = Error::at(ErrorKind::InvalidToken, 10, 2, 5);
        let display = err.to_string();
        assert!(display.contains("error at 10:2:5"));
        assert!(display.contains("invalid token"));
    }

    #[test]
    fn test_fragment_error_keeps_position() {
        let err = Error::with_message(
            ErrorKind::InvalidToken,
            Span::new(Pos::new(3, 1, 4), Pos::new(3, 1, 4)),
            "mismatched closing tag",
        )
        .into_fragment_error();

        match err.kind() {
            ErrorKind::MalformedFragment { message } => {
                assert_eq!(message, "mismatched closing tag at 3:1:4");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
