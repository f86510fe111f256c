//! Expression parsing using precedence climbing
//!
//! Binary operators are folded by [`Precedence`]; prefix operators take an
//! operand parsed at [`Precedence::Exponential`] so `-2 ^ 2` reads as
//! `-(2 ^ 2)`. Access and call postfixes bind tightest.

use crate::cst::CstNode;
use crate::error::{ParseError, ParseResult};
use crate::node_kind::NodeKind;
use crate::span::Span;
use crate::token::{Associativity, Precedence, Token};

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<CstNode> {
        self.parse_expression_with_precedence(Precedence::Lowest)
    }

    pub(crate) fn parse_expression_with_precedence(
        &mut self,
        min_prec: Precedence,
    ) -> ParseResult<CstNode> {
        let mut left = self.parse_prefix()?;

        while let Some((prec, assoc)) = self
            .current
            .as_ref()
            .and_then(|t| t.token.binary_precedence())
        {
            if prec < min_prec {
                break;
            }
            let operator = self.parse_operator()?.field("operator");
            let next_prec = match assoc {
                Associativity::Left => prec.tighter(),
                Associativity::Right => prec,
            };
            let right = self.parse_expression_with_precedence(next_prec)?;
            let span = left.span.merge(&right.span);
            left = CstNode::with_children(
                NodeKind::BinaryExpression,
                span,
                vec![left.field("left"), operator, right.field("right")],
            );
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<CstNode> {
        let Some(token) = self.current.as_ref().map(|t| t.token.clone()) else {
            return Err(self.error_here("expression"));
        };

        if token.is_prefix_operator() {
            let operator = self.parse_operator()?;
            let operand = self.parse_expression_with_precedence(Precedence::Exponential)?;
            let span = operator.span.merge(&operand.span);
            return Ok(CstNode::with_children(
                NodeKind::UnaryExpression,
                span,
                vec![operator.field("operator"), operand.field("operand")],
            ));
        }

        if token == Token::KwIf {
            return self.parse_conditional();
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// `if c then a else b`
    fn parse_conditional(&mut self) -> ParseResult<CstNode> {
        let start = self.expect(Token::KwIf)?.span.start;
        let condition = self.parse_expression()?.field("condition");
        self.expect(Token::KwThen)?;
        let consequence = self.parse_expression()?.field("consequence");
        self.expect(Token::KwElse)?;
        let alternative = self.parse_expression()?.field("alternative");
        let span = self.span_from(start, &alternative.span);

        Ok(CstNode::with_children(
            NodeKind::ConditionalExpression,
            span,
            vec![condition, consequence, alternative],
        ))
    }

    fn parse_primary(&mut self) -> ParseResult<CstNode> {
        match self.current.as_ref().map(|t| &t.token) {
            Some(t) if t.is_literal() => self.parse_literal(),
            Some(Token::Identifier) => self.parse_identifier(),
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => self.parse_bracket_literal(),
            Some(Token::LBrace) => self.parse_brace_literal(),
            _ => Err(self.error_here("expression")),
        }
    }

    // ==================== Postfix ====================

    fn parse_postfix(&mut self, mut base: CstNode) -> ParseResult<CstNode> {
        loop {
            if self.check_any(&[Token::Dot, Token::QuestionDot, Token::BangDot]) {
                base = self.parse_access(base)?;
            } else if self.check(&Token::LParen) {
                let arguments = self.parse_arguments()?;
                let span = base.span.merge(&arguments.span);
                base = CstNode::with_children(
                    NodeKind::CallExpression,
                    span,
                    vec![base.field("callee"), arguments],
                );
            } else {
                return Ok(base);
            }
        }
    }

    fn parse_access(&mut self, base: CstNode) -> ParseResult<CstNode> {
        let operator = self.parse_operator()?;
        let plain = operator.text_str() == Some(".");

        match self.current.as_ref().map(|t| t.token.clone()) {
            Some(Token::Integer) => {
                let accessor = self.leaf(NodeKind::IndexAccessor)?;
                Ok(access(base, operator, accessor))
            }
            // `t.0.1` lexes its tail as the float `0.1`
            Some(Token::Float) => self.parse_chained_index(base, operator),
            Some(Token::Identifier) => {
                let accessor = self.leaf(NodeKind::PropertyAccessor)?;
                Ok(access(base, operator, accessor))
            }
            Some(Token::LBracket) => {
                let start = self.expect(Token::LBracket)?.span.start;
                let index = self.parse_expression()?.field("index");
                let end = self.expect(Token::RBracket)?.span;
                let accessor = CstNode::with_children(
                    NodeKind::ComputedAccessor,
                    self.span_from(start, &end),
                    vec![index],
                );
                Ok(access(base, operator, accessor))
            }
            Some(Token::Lt) if plain => self.parse_generic_call(base),
            _ => Err(self.error_here("index, property name, '[' or '<'")),
        }
    }

    /// Split a float token such as `0.1` into two index accessors
    fn parse_chained_index(&mut self, base: CstNode, operator: CstNode) -> ParseResult<CstNode> {
        let Some(token) = self.advance() else {
            return Err(self.error_here("index"));
        };
        let parts = token.text.split_once('.').filter(|(first, second)| {
            [first, second]
                .iter()
                .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
        });
        let Some((first, second)) = parts else {
            return Err(ParseError::invalid_syntax(
                format!("'{}' is not a valid index", token.text),
                token.span,
            ));
        };

        let dot = token.span.start + first.len();
        let first_span = self.source_map.span(token.span.start, dot);
        let dot_span = self.source_map.span(dot, dot + 1);
        let second_span = self.source_map.span(dot + 1, token.span.end);

        let inner = access(
            base,
            operator,
            CstNode::leaf(NodeKind::IndexAccessor, first_span, first),
        );
        Ok(access(
            inner,
            CstNode::leaf(NodeKind::Operator, dot_span, "."),
            CstNode::leaf(NodeKind::IndexAccessor, second_span, second),
        ))
    }

    /// `callee.<T, U>(args)`, entered with the current token at `<`
    fn parse_generic_call(&mut self, callee: CstNode) -> ParseResult<CstNode> {
        let start = self.expect(Token::Lt)?.span.start;
        let mut generics = Vec::new();
        if !self.check(&Token::Gt) {
            loop {
                generics.push(self.parse_type()?);
                if self.eat(&Token::Comma).is_none() {
                    break;
                }
            }
        }
        let end = self.expect(Token::Gt)?.span;
        let generics = CstNode::with_children(
            NodeKind::TypeArguments,
            self.span_from(start, &end),
            generics,
        )
        .field("generics");

        let arguments = self.parse_arguments()?;
        let span = callee.span.merge(&arguments.span);
        Ok(CstNode::with_children(
            NodeKind::CallExpression,
            span,
            vec![callee.field("callee"), generics, arguments],
        ))
    }

    /// `(a, b, ...)`
    fn parse_arguments(&mut self) -> ParseResult<CstNode> {
        let start = self.expect(Token::LParen)?.span.start;
        let mut arguments = Vec::new();
        while !self.check(&Token::RParen) {
            arguments.push(self.parse_expression()?);
            if self.eat(&Token::Comma).is_none() {
                break;
            }
        }
        let end = self.expect(Token::RParen)?.span;
        Ok(CstNode::with_children(
            NodeKind::Arguments,
            self.span_from(start, &end),
            arguments,
        )
        .field("arguments"))
    }
}

fn access(base: CstNode, operator: CstNode, accessor: CstNode) -> CstNode {
    let span: Span = base.span.merge(&accessor.span);
    CstNode::with_children(
        NodeKind::AccessExpression,
        span,
        vec![
            base.field("base"),
            operator.field("operator"),
            accessor.field("accessor"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use crate::cst::CstNode;
    use crate::node_kind::NodeKind;
    use crate::parser::parse;

    fn expression(source: &str) -> CstNode {
        let (goal, errors) = parse(&format!("{source};"));
        assert!(errors.is_empty(), "{source}: {}", errors.format_all(source));
        goal.children[0].children[0].clone()
    }

    /// Fully parenthesized rendering of binary and unary structure
    fn shape(node: &CstNode) -> String {
        match node.kind {
            NodeKind::BinaryExpression => format!(
                "({} {} {})",
                shape(node.child_by_field("left").unwrap()),
                node.operator().unwrap(),
                shape(node.child_by_field("right").unwrap())
            ),
            NodeKind::UnaryExpression => format!(
                "({}{})",
                node.operator().unwrap(),
                shape(node.child_by_field("operand").unwrap())
            ),
            _ => node.text_str().unwrap_or("?").to_string(),
        }
    }

    #[test]
    fn test_precedence_and_associativity() {
        let cases = [
            ("1 + 2 * 3", "(1 + (2 * 3))"),
            ("1 - 2 - 3", "((1 - 2) - 3)"),
            ("2 ^ 3 ^ 2", "(2 ^ (3 ^ 2))"),
            ("-2 ^ 2", "(-(2 ^ 2))"),
            ("-a * b", "((-a) * b)"),
            ("a < b == c || d && e", "(((a < b) == c) || (d && e))"),
            ("a !< b !| c", "((a !< b) !| c)"),
        ];
        for (source, expected) in cases {
            assert_eq!(shape(&expression(source)), expected, "{source}");
        }
    }

    #[test]
    fn test_conditional() {
        let node = expression("if a then 1 else 2 + 3");
        assert_eq!(node.kind, NodeKind::ConditionalExpression);
        assert_eq!(
            node.child_by_field("alternative").unwrap().kind,
            NodeKind::BinaryExpression
        );
    }

    #[test]
    fn test_access_forms() {
        let node = expression("a?.b.[i]!.0");
        assert_eq!(node.operator(), Some("!."));
        assert_eq!(
            node.child_by_field("accessor").unwrap().kind,
            NodeKind::IndexAccessor
        );
        let computed = node.child_by_field("base").unwrap();
        assert_eq!(
            computed.child_by_field("accessor").unwrap().kind,
            NodeKind::ComputedAccessor
        );
    }

    #[test]
    fn test_float_after_dot_splits_into_indices() {
        let node = expression("t.0.1");
        let accessor = node.child_by_field("accessor").unwrap();
        assert_eq!(accessor.text_str(), Some("1"));
        let inner = node.child_by_field("base").unwrap();
        assert_eq!(
            inner.child_by_field("accessor").unwrap().text_str(),
            Some("0")
        );
        assert_eq!((accessor.span.start, accessor.span.end), (4, 5));
    }

    #[test]
    fn test_generic_call() {
        let node = expression("Map.<str, int>()");
        assert_eq!(node.kind, NodeKind::CallExpression);
        assert_eq!(node.child_by_field("callee").unwrap().text_str(), Some("Map"));
        assert_eq!(node.child_by_field("generics").unwrap().child_count(), 2);
        assert_eq!(node.child_by_field("arguments").unwrap().child_count(), 0);
    }

    #[test]
    fn test_plain_call() {
        let node = expression("f(1, 2,)");
        assert_eq!(node.child_by_field("arguments").unwrap().child_count(), 2);
        assert!(node.child_by_field("generics").is_none());
    }
}
