//! Recursive descent parser for Solid
//!
//! Converts the token stream from the lexer into CST nodes. Statements and
//! type expressions are parsed by plain recursive descent; value expressions
//! use precedence climbing (see [`crate::token::Precedence`]).

mod collections;
mod expressions;
mod literals;
mod statements;
mod types;

use crate::cst::CstNode;
use crate::error::{ParseError, ParseErrors, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::node_kind::NodeKind;
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// Solid parser
///
/// Parses Solid source code into a Concrete Syntax Tree (CST).
#[derive(Debug)]
pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) lexer: Lexer<'a>,
    pub(crate) source_map: SourceMap,
    /// Current token (peeked)
    pub(crate) current: Option<SpannedToken<'a>>,
    /// Collected errors, lexical ones included, in detection order
    pub(crate) errors: ParseErrors,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lexer: Lexer::new(source),
            source_map: SourceMap::new(source),
            current: None,
            errors: ParseErrors::new(),
        }
    }

    /// Parse the source and return a Goal CST node
    pub fn parse(mut self) -> (CstNode, ParseErrors) {
        let mut children = Vec::new();

        self.advance();

        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(node) => children.push(node),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        let span = self.source_map.span(0, self.source.len());
        (
            CstNode::with_children(NodeKind::Goal, span, children),
            self.errors,
        )
    }

    // ==================== Token Management ====================

    /// Advance to the next token, recording (and skipping) lexical errors
    pub(crate) fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let prev = self.current.take();
        loop {
            match self.lexer.next_token() {
                Some(Ok(token)) => {
                    self.current = Some(token);
                    break;
                }
                Some(Err(e)) => {
                    self.errors.push(e.into());
                }
                None => break,
            }
        }
        prev
    }

    pub(crate) fn check(&self, expected: &Token) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| &t.token == expected)
    }

    pub(crate) fn check_any(&self, expected: &[Token]) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| expected.contains(&t.token))
    }

    /// Token after the current one (lexical errors read as `None`)
    pub(crate) fn peek_next(&mut self) -> Option<Token> {
        match self.lexer.peek() {
            Some(Ok(token)) => Some(token.token.clone()),
            _ => None,
        }
    }

    /// Consume the current token if it matches
    pub(crate) fn eat(&mut self, expected: &Token) -> Option<SpannedToken<'a>> {
        if self.check(expected) {
            self.advance()
        } else {
            None
        }
    }

    /// Consume current token if it matches, return error otherwise
    pub(crate) fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken<'a>> {
        match self.eat(&expected) {
            Some(token) => Ok(token),
            None => Err(self.error_here(expected.describe())),
        }
    }

    /// Build an "expected X" error at the current position
    pub(crate) fn error_here(&self, expected: &str) -> ParseError {
        match &self.current {
            Some(token) => ParseError::unexpected_token(token.text, expected, token.span),
            None => ParseError::unexpected_eof(expected, self.current_span()),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current
            .as_ref()
            .map(|t| t.span)
            .unwrap_or_else(|| self.source_map.span(self.source.len(), self.source.len()))
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    /// Consume the current token as a leaf of the given kind
    pub(crate) fn leaf(&mut self, kind: NodeKind) -> ParseResult<CstNode> {
        match self.advance() {
            Some(token) => Ok(CstNode::leaf(kind, token.span, token.text)),
            None => Err(self.error_here(kind.as_str())),
        }
    }

    /// Span from `start` (byte offset) to the end of `last`
    pub(crate) fn span_from(&self, start: usize, last: &Span) -> Span {
        self.source_map.span(start, last.end)
    }

    /// Error recovery: skip past the next `;`
    pub(crate) fn synchronize(&mut self) {
        while let Some(token) = self.advance() {
            if token.token == Token::Semicolon {
                return;
            }
        }
    }
}

/// Parse source code into a CST (convenience function)
pub fn parse(source: &str) -> (CstNode, ParseErrors) {
    Parser::new(source).parse()
}
