//! Lex and parse error types

use crate::span::Span;
use thiserror::Error;

/// Errors raised while scanning characters into tokens
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unrecognized character '{character}' at {span}")]
    UnrecognizedCharacter { character: String, span: Span },

    #[error("unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },

    #[error("invalid escape sequence '{sequence}' at {span}")]
    InvalidEscape { sequence: String, span: Span },

    #[error("invalid numeric separator in '{literal}' at {span}")]
    InvalidSeparator { literal: String, span: Span },

    #[error("malformed exponent in '{literal}' at {span}")]
    MalformedExponent { literal: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnrecognizedCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::InvalidEscape { span, .. }
            | LexError::InvalidSeparator { span, .. }
            | LexError::MalformedExponent { span, .. } => span,
        }
    }

    /// Numeric diagnostic code (1100s)
    pub fn code(&self) -> u32 {
        match self {
            LexError::UnrecognizedCharacter { .. } => 1101,
            LexError::UnterminatedString { .. } => 1102,
            LexError::InvalidEscape { .. } => 1103,
            LexError::InvalidSeparator { .. } => 1104,
            LexError::MalformedExponent { .. } => 1105,
        }
    }
}

/// Parse error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected token '{found}' at {span}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    #[error("unexpected end of input at {span}, expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("{message} at {span}")]
    InvalidSyntax { message: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Lex(e) => e.span(),
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::InvalidSyntax { span, .. } => span,
        }
    }

    /// Numeric diagnostic code (1100s for lexing, 1200s for parsing)
    pub fn code(&self) -> u32 {
        match self {
            ParseError::Lex(e) => e.code(),
            ParseError::UnexpectedToken { .. } => 1201,
            ParseError::UnexpectedEof { .. } => 1202,
            ParseError::InvalidSyntax { .. } => 1203,
        }
    }

    pub fn unexpected_token(
        found: impl Into<String>,
        expected: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            span,
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            span,
        }
    }

    /// Format error with source context
    pub fn format_with_context(&self, source: &str) -> String {
        format_span_context(source, self.span())
    }
}

/// Render the source line of `span` with a caret marker under it
///
/// Returns an empty string when the span lies outside `source`.
pub fn format_span_context(source: &str, span: &Span) -> String {
    let line_idx = span.start_line.saturating_sub(1);
    let Some(line) = source.lines().nth(line_idx) else {
        return String::new();
    };

    let col = span.start_column.saturating_sub(1);
    let len = if span.start_line == span.end_line {
        span.end_column.saturating_sub(span.start_column).max(1)
    } else {
        1
    };
    let marker = "^".repeat(len.min(line.len().saturating_sub(col)).max(1));
    let gutter = " ".repeat(span.start_line.to_string().len());

    format!(
        "  {} | {}\n  {} | {}{}",
        span.start_line,
        line,
        gutter,
        " ".repeat(col),
        marker
    )
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Collection of parse errors for error recovery
#[derive(Debug, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    /// The first error in source order of detection
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Format all errors as a single message
    pub fn format_all(&self, source: &str) -> String {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, e)| {
                format!(
                    "Error {} [{}]: {}\n{}",
                    i + 1,
                    e.code(),
                    e,
                    e.format_with_context(source)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
