pub mod semantic;
pub mod unsupported;

pub use semantic::{
    AssignmentError, AssignmentErrorKind, MutabilityError, NanError, NanErrorKind,
    ReferenceError, ReferenceErrorKind, TypeError, TypeErrorKind, VoidError,
};
pub use unsupported::{UnsupportedFeature, UnsupportedFeatureKind};

use solid_parser::{format_span_context, LexError, ParseError, Span};
use thiserror::Error;

/// Any failure that aborts a compilation. The first one detected wins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolidError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Mutability(#[from] MutabilityError),

    #[error(transparent)]
    Nan(#[from] NanError),

    #[error(transparent)]
    Void(#[from] VoidError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedFeature),

    /// The assembled module failed backend validation
    #[error("ValidationError: {message}")]
    Validation { message: String },

    /// A broken compiler invariant, never a user mistake
    #[error("internal compiler error: {message} at {span}")]
    Internal { message: String, span: Span },
}

impl From<LexError> for SolidError {
    fn from(e: LexError) -> Self {
        SolidError::Parse(ParseError::Lex(e))
    }
}

impl SolidError {
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        SolidError::Internal {
            message: message.into(),
            span,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        SolidError::Validation {
            message: message.into(),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            SolidError::Parse(e) => e.code(),
            SolidError::Reference(e) => e.code(),
            SolidError::Assignment(e) => e.code(),
            SolidError::Type(e) => e.code(),
            SolidError::Mutability(e) => e.code(),
            SolidError::Nan(e) => e.code(),
            SolidError::Void(e) => e.code(),
            SolidError::Unsupported(e) => e.code(),
            SolidError::Validation { .. } => 9100,
            SolidError::Internal { .. } => 9900,
        }
    }

    /// Location of the offending node; validation failures have none
    pub fn span(&self) -> Option<Span> {
        Some(match self {
            SolidError::Parse(e) => *e.span(),
            SolidError::Reference(e) => e.span,
            SolidError::Assignment(e) => e.span,
            SolidError::Type(e) => e.span,
            SolidError::Mutability(e) => e.span,
            SolidError::Nan(e) => e.span,
            SolidError::Void(e) => e.span,
            SolidError::Unsupported(e) => e.span,
            SolidError::Internal { span, .. } => *span,
            SolidError::Validation { .. } => return None,
        })
    }

    pub fn line(&self) -> Option<usize> {
        self.span().map(|s| s.line())
    }

    pub fn column(&self) -> Option<usize> {
        self.span().map(|s| s.column())
    }

    /// Render the message followed by the offending source line and a caret
    pub fn format_with_context(&self, source: &str) -> String {
        match self.span() {
            Some(span) => format!("[{}] {}\n{}", self.code(), self, format_span_context(source, &span)),
            None => format!("[{}] {}", self.code(), self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_errors_keep_their_code() {
        let span = Span::new(4, 5, 1, 1, 5, 6);
        let err: SolidError = LexError::UnterminatedString { span }.into();
        assert_eq!(err.code(), 1102);
        assert_eq!(err.column(), Some(5));
    }

    #[test]
    fn test_validation_has_no_location() {
        let err = SolidError::validation("undeclared local $var3");
        assert_eq!(err.code(), 9100);
        assert!(err.span().is_none());
        assert_eq!(
            err.format_with_context("1;"),
            "[9100] ValidationError: undeclared local $var3"
        );
    }

    #[test]
    fn test_format_with_context() {
        let source = "let x: int = y;";
        let err: SolidError = ReferenceError::undeclared("y", Span::new(13, 14, 1, 1, 14, 15)).into();
        let rendered = err.format_with_context(source);
        assert!(rendered.starts_with("[2101] ReferenceError"));
        assert!(rendered.contains(source));
        assert!(rendered.contains('^'));
    }
}
