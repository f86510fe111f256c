//! Decoration: CST → semantic tree.
//!
//! The decorator reads the parser's [`CstNode`] tree and builds
//! [`crate::ast`] nodes. Literal text is converted to values here, and the
//! language feature gates of [`SolidConfig`] are enforced.
//!
//! - `statements.rs`: goal and statement forms
//! - `expressions.rs`: literals, operators, access and calls
//! - `types.rs`: type annotations

mod expressions;
mod statements;
mod types;

use solid_parser::{CstNode, NodeKind, Span};

use crate::ast::Goal;
use crate::config::SolidConfig;
use crate::error::{NanError, NanErrorKind, SolidError, UnsupportedFeature, UnsupportedFeatureKind};
use crate::value::Value;

pub type DecorateResult<T> = Result<T, SolidError>;

#[derive(Debug)]
pub struct Decorator<'c> {
    config: &'c SolidConfig,
}

impl<'c> Decorator<'c> {
    pub fn new(config: &'c SolidConfig) -> Self {
        Self { config }
    }

    pub fn decorate(&self, goal: &CstNode) -> DecorateResult<Goal> {
        self.goal(goal)
    }

    fn require_collections(&self, span: Span) -> DecorateResult<()> {
        if self.config.language_features.literal_collections {
            Ok(())
        } else {
            Err(UnsupportedFeature::new(UnsupportedFeatureKind::LiteralCollections, span)
                .with_hint("enable `language_features.literal_collections`")
                .into())
        }
    }

    fn require_optional_access(&self, span: Span) -> DecorateResult<()> {
        if self.config.language_features.optional_access {
            Ok(())
        } else {
            Err(UnsupportedFeature::new(UnsupportedFeatureKind::OptionalAccess, span)
                .with_hint("enable `language_features.optional_access`")
                .into())
        }
    }
}

/// Convenience wrapper around [`Decorator`]
pub fn decorate(goal: &CstNode, config: &SolidConfig) -> DecorateResult<Goal> {
    Decorator::new(config).decorate(goal)
}

// ==================== CST access ====================

fn field<'n>(node: &'n CstNode, name: &str) -> DecorateResult<&'n CstNode> {
    node.child_by_field(name).ok_or_else(|| {
        SolidError::internal(format!("{:?} has no `{name}` child", node.kind), node.span)
    })
}

fn text(node: &CstNode) -> DecorateResult<&str> {
    node.text_str()
        .ok_or_else(|| SolidError::internal(format!("{:?} has no text", node.kind), node.span))
}

fn operator(node: &CstNode) -> DecorateResult<&str> {
    node.operator()
        .ok_or_else(|| SolidError::internal(format!("{:?} has no operator", node.kind), node.span))
}

fn unexpected(node: &CstNode, context: &str) -> SolidError {
    SolidError::internal(format!("unexpected {:?} in {context}", node.kind), node.span)
}

// ==================== Literals ====================

/// Integer literal text: decimal digits with `_` separators, 32-bit signed
pub(crate) fn parse_integer(text: &str, span: Span) -> DecorateResult<i32> {
    text.replace('_', "").parse::<i32>().map_err(|_| {
        NanError::new(NanErrorKind::NotANumber, span)
            .with_message(format!("`{text}` does not fit in int"))
            .into()
    })
}

pub(crate) fn parse_float(text: &str, span: Span) -> DecorateResult<f64> {
    text.replace('_', "").parse::<f64>().map_err(|_| {
        NanError::new(NanErrorKind::NotANumber, span)
            .with_message(format!("`{text}` is not a valid float"))
            .into()
    })
}

/// Strip the quotes of a string literal and resolve its escapes
pub(crate) fn unescape(raw: &str, span: Span) -> DecorateResult<String> {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or_else(|| SolidError::internal("string literal without quotes", span))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            other => {
                return Err(SolidError::internal(
                    format!("escape `\\{}` survived lexing", other.unwrap_or(' ')),
                    span,
                ))
            }
        }
    }
    Ok(out)
}

/// Value of a literal leaf
pub(crate) fn literal_value(node: &CstNode) -> DecorateResult<Value> {
    let raw = text(node)?;
    Ok(match node.kind {
        NodeKind::NullLiteral => Value::Null,
        NodeKind::BooleanLiteral => Value::Boolean(raw == "true"),
        NodeKind::IntegerLiteral => Value::Integer(parse_integer(raw, node.span)?),
        NodeKind::FloatLiteral => Value::Float(parse_float(raw, node.span)?),
        NodeKind::StringLiteral => Value::string(&unescape(raw, node.span)?),
        _ => return Err(unexpected(node, "literal")),
    })
}
