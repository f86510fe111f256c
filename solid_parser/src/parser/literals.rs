//! Literal leaves shared by expressions and unit types

use crate::cst::CstNode;
use crate::error::ParseResult;
use crate::node_kind::NodeKind;
use crate::token::Token;

use super::Parser;

impl<'a> Parser<'a> {
    /// Parse `null`, `true`, `false`, a number or a string into a literal leaf
    pub(crate) fn parse_literal(&mut self) -> ParseResult<CstNode> {
        let kind = match self.current.as_ref().map(|t| &t.token) {
            Some(Token::Null) => NodeKind::NullLiteral,
            Some(Token::True | Token::False) => NodeKind::BooleanLiteral,
            Some(Token::Integer) => NodeKind::IntegerLiteral,
            Some(Token::Float) => NodeKind::FloatLiteral,
            Some(Token::String) => NodeKind::StringLiteral,
            _ => return Err(self.error_here("literal")),
        };
        self.leaf(kind)
    }

    /// Parse an identifier leaf
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<CstNode> {
        if self.check(&Token::Identifier) {
            self.leaf(NodeKind::Identifier)
        } else {
            Err(self.error_here(Token::Identifier.describe()))
        }
    }

    /// Consume the current token as an anonymous operator leaf
    pub(crate) fn parse_operator(&mut self) -> ParseResult<CstNode> {
        self.leaf(NodeKind::Operator)
    }
}

#[cfg(test)]
mod tests {
    use crate::node_kind::NodeKind;
    use crate::parser::Parser;

    #[test]
    fn test_literal_kinds() {
        let cases = [
            ("null", NodeKind::NullLiteral),
            ("false", NodeKind::BooleanLiteral),
            ("1_000", NodeKind::IntegerLiteral),
            ("4.2e1", NodeKind::FloatLiteral),
            (r"'it\'s'", NodeKind::StringLiteral),
        ];
        for (source, kind) in cases {
            let mut parser = Parser::new(source);
            parser.advance();
            let node = parser.parse_literal().unwrap();
            assert_eq!(node.kind, kind, "{source}");
            assert_eq!(node.text_str(), Some(source));
        }
    }

    #[test]
    fn test_non_literal_is_rejected() {
        let mut parser = Parser::new("foo");
        parser.advance();
        assert_eq!(parser.parse_literal().unwrap_err().code(), 1201);
    }
}
