//! Error types for cldrparse

use std::fmt;
use thiserror::Error;

/// Position in source input
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

/// Span representing a range in source input
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
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUtf8,
    InvalidEntity { entity: String },
    InvalidName,
    UnexpectedByte,
    UnexpectedEof,
    UnexpectedClosingTag,
    MismatchedClosingTag { expected: String, found: String },
    UnterminatedElement { name: String },
    UnterminatedAttributeValue,
    UnterminatedMarkup,
    DuplicateAttribute { name: String },
    TrailingContent,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::InvalidEntity { entity } => write!(f, "invalid entity: &{entity};"),
            Self::InvalidName => write!(f, "invalid name"),
            Self::UnexpectedByte => write!(f, "unexpected byte"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnexpectedClosingTag => write!(f, "unexpected closing tag"),
            Self::MismatchedClosingTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::UnterminatedElement { name } => {
                write!(f, "unterminated element <{name}>")
            }
            Self::UnterminatedAttributeValue => write!(f, "unterminated attribute value"),
            Self::UnterminatedMarkup => write!(f, "unterminated markup"),
            Self::DuplicateAttribute { name } => {
                write!(f, "duplicate attribute: {name}")
            }
            Self::TrailingContent => write!(f, "content after document root"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
        }
    }
}

/// Main error type for cldrparse
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Create error at a specific position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::new(pos, pos))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error at {}: {}", self.span.start, self.kind)
    }
}

/// Result type alias for cldrparse
pub type Result<T> = std::result::Result<T, Error>;
