//! Type expression parsing
//!
//! ```text
//! type         := intersection ('|' intersection)*
//! intersection := mutable ('&' mutable)*
//! mutable      := 'mutable' mutable | postfix
//! postfix      := primary ('?' | '[' ']' | '[' INT ']' | '{' '}')*
//! primary      := keyword | literal | '-' number | IDENT | '(' type ')'
//!               | '[' tuple-or-record-or-dict ']' | '{' type '->' type '}'
//! ```

use crate::cst::CstNode;
use crate::error::ParseResult;
use crate::node_kind::NodeKind;
use crate::token::Token;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_type(&mut self) -> ParseResult<CstNode> {
        self.parse_binary_type(Token::Pipe, NodeKind::UnionType, Self::parse_intersection_type)
    }

    fn parse_intersection_type(&mut self) -> ParseResult<CstNode> {
        self.parse_binary_type(Token::Amp, NodeKind::IntersectionType, Self::parse_mutable_type)
    }

    fn parse_binary_type(
        &mut self,
        operator: Token,
        kind: NodeKind,
        operand: fn(&mut Self) -> ParseResult<CstNode>,
    ) -> ParseResult<CstNode> {
        let mut left = operand(self)?;
        while self.check(&operator) {
            let op = self.parse_operator()?.field("operator");
            let right = operand(self)?;
            let span = left.span.merge(&right.span);
            left = CstNode::with_children(kind, span, vec![left.field("left"), op, right.field("right")]);
        }
        Ok(left)
    }

    fn parse_mutable_type(&mut self) -> ParseResult<CstNode> {
        if !self.check(&Token::KwMutable) {
            return self.parse_postfix_type();
        }
        let operator = self.parse_operator()?;
        let inner = self.parse_mutable_type()?;
        let span = operator.span.merge(&inner.span);
        Ok(CstNode::with_children(
            NodeKind::MutableType,
            span,
            vec![operator.field("operator"), inner.field("type")],
        ))
    }

    fn parse_postfix_type(&mut self) -> ParseResult<CstNode> {
        let mut base = self.parse_primary_type()?;
        loop {
            let mut children = Vec::new();
            let (kind, close) = if let Some(question) = self.eat(&Token::Question) {
                (NodeKind::NullableType, question)
            } else if self.check(&Token::LBracket) && self.peek_next() == Some(Token::RBracket) {
                self.advance();
                (NodeKind::ListType, self.expect(Token::RBracket)?)
            } else if self.check(&Token::LBracket) && self.peek_next() == Some(Token::Integer) {
                self.advance();
                children.push(self.leaf(NodeKind::IntegerLiteral)?.field("count"));
                (NodeKind::TupleRepeatType, self.expect(Token::RBracket)?)
            } else if self.check(&Token::LBrace) && self.peek_next() == Some(Token::RBrace) {
                self.advance();
                (NodeKind::SetType, self.expect(Token::RBrace)?)
            } else {
                return Ok(base);
            };

            let span = self.span_from(base.span.start, &close.span);
            children.insert(0, base.field("type"));
            base = CstNode::with_children(kind, span, children);
        }
    }

    fn parse_primary_type(&mut self) -> ParseResult<CstNode> {
        let Some(token) = self.current.as_ref().map(|t| t.token.clone()) else {
            return Err(self.error_here("type"));
        };

        match token {
            t if t.is_type_keyword() => self.leaf(NodeKind::KeywordType),
            t if t.is_literal() => {
                let value = self.parse_literal()?;
                Ok(CstNode::with_children(
                    NodeKind::LiteralType,
                    value.span,
                    vec![value.field("value")],
                ))
            }
            Token::Minus | Token::Plus => {
                let operator = self.parse_operator()?;
                if !self.check_any(&[Token::Integer, Token::Float]) {
                    return Err(self.error_here("number"));
                }
                let value = self.parse_literal()?;
                let span = operator.span.merge(&value.span);
                Ok(CstNode::with_children(
                    NodeKind::LiteralType,
                    span,
                    vec![operator.field("operator"), value.field("value")],
                ))
            }
            Token::Identifier => self.leaf(NodeKind::TypeName),
            Token::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::LBracket => self.parse_bracket_type(),
            Token::LBrace => self.parse_map_type(),
            _ => Err(self.error_here("type")),
        }
    }

    /// `[A, ?: B]`, `[a: A, b?: B]` or `[:T]`
    fn parse_bracket_type(&mut self) -> ParseResult<CstNode> {
        let start = self.expect(Token::LBracket)?.span.start;

        let (kind, items) = if self.eat(&Token::Colon).is_some() {
            (NodeKind::DictType, vec![self.parse_type()?.field("type")])
        } else if self.check(&Token::Identifier)
            && matches!(self.peek_next(), Some(Token::Colon | Token::QuestionColon))
        {
            (
                NodeKind::RecordType,
                self.parse_separated(Token::RBracket, Self::parse_record_type_entry)?,
            )
        } else {
            (
                NodeKind::TupleType,
                self.parse_separated(Token::RBracket, Self::parse_tuple_type_entry)?,
            )
        };

        let end = self.expect(Token::RBracket)?.span;
        Ok(CstNode::with_children(kind, self.span_from(start, &end), items))
    }

    fn parse_tuple_type_entry(&mut self) -> ParseResult<CstNode> {
        let mut children = Vec::new();
        if self.check(&Token::QuestionColon) {
            children.push(self.parse_operator()?.field("modifier"));
        }
        let ty = self.parse_type()?;
        let span = children
            .first()
            .map_or(ty.span, |m: &CstNode| m.span.merge(&ty.span));
        children.push(ty.field("type"));
        Ok(CstNode::with_children(NodeKind::TupleTypeEntry, span, children))
    }

    fn parse_record_type_entry(&mut self) -> ParseResult<CstNode> {
        let key = self.parse_identifier()?.field("key");
        let mut children = vec![key];
        if self.check(&Token::QuestionColon) {
            children.push(self.parse_operator()?.field("modifier"));
        } else {
            self.expect(Token::Colon)?;
        }
        let ty = self.parse_type()?;
        let span = children[0].span.merge(&ty.span);
        children.push(ty.field("type"));
        Ok(CstNode::with_children(NodeKind::RecordTypeEntry, span, children))
    }

    /// `{K -> V}`
    fn parse_map_type(&mut self) -> ParseResult<CstNode> {
        let start = self.expect(Token::LBrace)?.span.start;
        let key = self.parse_type()?.field("key");
        self.expect(Token::Arrow)?;
        let value = self.parse_type()?.field("value");
        let end = self.expect(Token::RBrace)?.span;
        Ok(CstNode::with_children(
            NodeKind::MapType,
            self.span_from(start, &end),
            vec![key, value],
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::cst::CstNode;
    use crate::node_kind::NodeKind;
    use crate::parser::parse;

    fn declared_type(source: &str) -> CstNode {
        let program = format!("type T = {source};");
        let (goal, errors) = parse(&program);
        assert!(errors.is_empty(), "{source}: {}", errors.format_all(&program));
        goal.children[0].child_by_field("value").unwrap().clone()
    }

    #[test]
    fn test_union_binds_looser_than_intersection() {
        let ty = declared_type("int | str & obj");
        assert_eq!(ty.kind, NodeKind::UnionType);
        assert_eq!(
            ty.child_by_field("right").unwrap().kind,
            NodeKind::IntersectionType
        );
    }

    #[test]
    fn test_postfix_types() {
        let ty = declared_type("mutable int[]?");
        assert_eq!(ty.kind, NodeKind::MutableType);
        let nullable = ty.child_by_field("type").unwrap();
        assert_eq!(nullable.kind, NodeKind::NullableType);
        assert_eq!(
            nullable.child_by_field("type").unwrap().kind,
            NodeKind::ListType
        );

        let repeat = declared_type("float[3]");
        assert_eq!(repeat.kind, NodeKind::TupleRepeatType);
        assert_eq!(repeat.child_by_field("count").unwrap().text_str(), Some("3"));

        assert_eq!(declared_type("str{}").kind, NodeKind::SetType);
    }

    #[test]
    fn test_bracket_types() {
        let tuple = declared_type("[int, ?: str]");
        assert_eq!(tuple.kind, NodeKind::TupleType);
        assert!(tuple.children[1].has_modifier("?:"));

        let record = declared_type("[a: int, b?: [c: bool]]");
        assert_eq!(record.kind, NodeKind::RecordType);
        assert!(!record.children[0].has_modifier("?:"));
        assert!(record.children[1].has_modifier("?:"));

        assert_eq!(declared_type("[:float]").kind, NodeKind::DictType);
        assert_eq!(declared_type("[]").kind, NodeKind::TupleType);
        assert_eq!(declared_type("{str -> int}").kind, NodeKind::MapType);
    }

    #[test]
    fn test_literal_types() {
        let negative = declared_type("-4.2");
        assert_eq!(negative.kind, NodeKind::LiteralType);
        assert_eq!(negative.operator(), Some("-"));
        assert_eq!(declared_type("'hello'").kind, NodeKind::LiteralType);
        assert_eq!(declared_type("Other").kind, NodeKind::TypeName);
    }

    #[test]
    fn test_list_span_covers_brackets() {
        let ty = declared_type("int []");
        assert_eq!(ty.kind, NodeKind::ListType);
        assert_eq!((ty.span.start, ty.span.end), (9, 15));
    }
}
