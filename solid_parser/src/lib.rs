//! solid_parser
//!
//! Lexer and parser for the Solid language. Produces a concrete syntax tree
//! whose nodes carry a [`NodeKind`], a [`Span`] and named fields that the
//! compiler decorates into its typed AST.
//!
//! # Example
//!
//! ```
//! use solid_parser::{parse, NodeKind};
//!
//! let cst = parse("let x: int = 42;").expect("parse failed");
//!
//! assert_eq!(cst.kind, NodeKind::Goal);
//! assert_eq!(cst.children[0].kind, NodeKind::VariableDeclaration);
//! ```

pub mod cst;
pub mod error;
pub mod lexer;
pub mod node_kind;
pub mod parser;
pub mod span;
pub mod token;

// Re-exports
pub use cst::CstNode;
pub use error::{format_span_context, LexError, ParseError, ParseErrors, ParseResult};
pub use lexer::{Lexer, SpannedToken};
pub use node_kind::NodeKind;
pub use parser::Parser;
pub use span::{SourceMap, Span};
pub use token::{Associativity, Precedence, Token};

/// Parse Solid source code into a CST
///
/// Returns a `Goal` node holding every statement, or the first error
/// (lexical or syntactic) in source order of detection.
pub fn parse(source: &str) -> ParseResult<CstNode> {
    let (cst, errors) = parser::parse(source);
    match errors.into_iter().next() {
        None => Ok(cst),
        Some(error) => Err(error),
    }
}

/// Parse Solid source code with error recovery
///
/// Returns a CST even if there are parse errors, along with a list of errors.
pub fn parse_with_errors(source: &str) -> (CstNode, ParseErrors) {
    parser::parse(source)
}

/// Tokenize Solid source code
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, LexError>> {
    lexer::tokenize(source)
}

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let cst = parse("").unwrap();
        assert_eq!(cst.kind, NodeKind::Goal);
        assert!(cst.children.is_empty());
    }

    #[test]
    fn test_first_error_wins() {
        let err = parse("1 # 2; let = 3;").unwrap_err();
        assert_eq!(err.code(), 1101);
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("1 + 2");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
