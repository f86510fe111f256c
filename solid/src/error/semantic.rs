//! Diagnostics raised by the semantic passes
//!
//! One error type per family. Every error carries a message, the span of
//! the offending node and a numeric code namespaced by family.

use solid_parser::Span;
use thiserror::Error;

// ==================== Reference (2100s) ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceErrorKind {
    /// No declaration with this name exists
    Undeclared,
    /// Declared, but read before its declaration completed
    DeadZone,
    /// A type used as a value or a value used as a type
    Kind,
}

impl ReferenceErrorKind {
    pub fn code(self) -> u32 {
        match self {
            Self::Undeclared => 2101,
            Self::DeadZone => 2102,
            Self::Kind => 2103,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ReferenceError: {message} at {span}")]
pub struct ReferenceError {
    pub kind: ReferenceErrorKind,
    pub message: String,
    pub span: Span,
}

impl ReferenceError {
    pub fn undeclared(name: &str, span: Span) -> Self {
        Self {
            kind: ReferenceErrorKind::Undeclared,
            message: format!("`{name}` is never declared"),
            span,
        }
    }

    pub fn dead_zone(name: &str, span: Span) -> Self {
        Self {
            kind: ReferenceErrorKind::DeadZone,
            message: format!("`{name}` is used before its declaration"),
            span,
        }
    }

    pub fn kind_mismatch(name: &str, expected: &str, span: Span) -> Self {
        Self {
            kind: ReferenceErrorKind::Kind,
            message: format!("`{name}` is not a {expected}"),
            span,
        }
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

// ==================== Assignment (2200s) ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentErrorKind {
    DuplicateDeclaration,
    DuplicateKey,
    /// Assignment to a variable declared without `unfixed`
    Reassignment,
}

impl AssignmentErrorKind {
    pub fn code(self) -> u32 {
        match self {
            Self::DuplicateDeclaration => 2201,
            Self::DuplicateKey => 2202,
            Self::Reassignment => 2210,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("AssignmentError: {message} at {span}")]
pub struct AssignmentError {
    pub kind: AssignmentErrorKind,
    pub message: String,
    pub span: Span,
}

impl AssignmentError {
    pub fn duplicate_declaration(name: &str, span: Span) -> Self {
        Self {
            kind: AssignmentErrorKind::DuplicateDeclaration,
            message: format!("duplicate declaration of `{name}`"),
            span,
        }
    }

    pub fn duplicate_key(key: &str, span: Span) -> Self {
        Self {
            kind: AssignmentErrorKind::DuplicateKey,
            message: format!("duplicate record key `{key}`"),
            span,
        }
    }

    pub fn reassignment(name: &str, span: Span) -> Self {
        Self {
            kind: AssignmentErrorKind::Reassignment,
            message: format!("cannot reassign fixed variable `{name}`"),
            span,
        }
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

// ==================== Type (2300s) ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeErrorKind {
    /// Operator applied to operands it does not accept
    InvalidOperation,
    /// A type is not a subtype of the one required
    NotNarrow,
    IndexOutOfBounds,
    PropertyDoesNotExist,
    NotCallable,
    /// Wrong number of generic or value arguments
    WrongArity,
    /// A reference type where a value type is required
    UnexpectedReference,
}

impl TypeErrorKind {
    pub fn code(self) -> u32 {
        match self {
            Self::InvalidOperation => 2301,
            Self::NotNarrow => 2302,
            Self::IndexOutOfBounds => 2303,
            Self::PropertyDoesNotExist => 2304,
            Self::NotCallable => 2305,
            Self::WrongArity => 2306,
            Self::UnexpectedReference => 2307,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("TypeError: {message} at {span}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub message: String,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn invalid_operation(message: impl Into<String>, span: Span) -> Self {
        Self::new(TypeErrorKind::InvalidOperation, message, span)
    }

    pub fn not_narrow(actual: impl std::fmt::Display, expected: impl std::fmt::Display, span: Span) -> Self {
        Self::new(
            TypeErrorKind::NotNarrow,
            format!("expression of type `{actual}` is not narrower than `{expected}`"),
            span,
        )
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

// ==================== Nan (2400s) ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NanErrorKind {
    NotANumber,
    DivideByZero,
}

impl NanErrorKind {
    pub fn code(self) -> u32 {
        match self {
            Self::NotANumber => 2401,
            Self::DivideByZero => 2402,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("NanError: {message} at {span}")]
pub struct NanError {
    pub kind: NanErrorKind,
    pub message: String,
    pub span: Span,
}

impl NanError {
    pub fn new(kind: NanErrorKind, span: Span) -> Self {
        let message = match kind {
            NanErrorKind::NotANumber => "not a valid number",
            NanErrorKind::DivideByZero => "division by zero",
        };
        Self {
            kind,
            message: message.to_string(),
            span,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

// ==================== Mutability (2500s) / Void (2600s) ====================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("MutabilityError: {message} at {span}")]
pub struct MutabilityError {
    pub message: String,
    pub span: Span,
}

impl MutabilityError {
    pub fn new(ty: impl std::fmt::Display, span: Span) -> Self {
        Self {
            message: format!("cannot mutate a value of immutable type `{ty}`"),
            span,
        }
    }

    pub fn code(&self) -> u32 {
        2501
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("VoidError: {message} at {span}")]
pub struct VoidError {
    pub message: String,
    pub span: Span,
}

impl VoidError {
    pub fn new(span: Span) -> Self {
        Self {
            message: "a value-less type cannot hold a value".to_string(),
            span,
        }
    }

    pub fn code(&self) -> u32 {
        2601
    }
}
