//! Collection literals: tuples, records, sets and maps

use crate::cst::CstNode;
use crate::error::ParseResult;
use crate::node_kind::NodeKind;
use crate::token::Token;

use super::Parser;

impl<'a> Parser<'a> {
    /// `[a, b]`, `[]` or `[k= v, ...]`
    pub(crate) fn parse_bracket_literal(&mut self) -> ParseResult<CstNode> {
        let start = self.expect(Token::LBracket)?.span.start;

        let is_record =
            self.check(&Token::Identifier) && self.peek_next() == Some(Token::Eq);
        let (kind, items) = if is_record {
            (NodeKind::RecordLiteral, self.parse_separated(Token::RBracket, Self::parse_record_entry)?)
        } else {
            (NodeKind::TupleLiteral, self.parse_separated(Token::RBracket, Self::parse_expression)?)
        };

        let end = self.expect(Token::RBracket)?.span;
        Ok(CstNode::with_children(kind, self.span_from(start, &end), items))
    }

    fn parse_record_entry(&mut self) -> ParseResult<CstNode> {
        let key = self.parse_identifier()?.field("key");
        self.expect(Token::Eq)?;
        let value = self.parse_expression()?.field("value");
        let span = key.span.merge(&value.span);
        Ok(CstNode::with_children(
            NodeKind::RecordEntry,
            span,
            vec![key, value],
        ))
    }

    /// `{a, b}`, `{}` or `{k -> v, ...}`
    pub(crate) fn parse_brace_literal(&mut self) -> ParseResult<CstNode> {
        let start = self.expect(Token::LBrace)?.span.start;

        if let Some(end) = self.eat(&Token::RBrace) {
            return Ok(CstNode::with_children(
                NodeKind::SetLiteral,
                self.span_from(start, &end.span),
                Vec::new(),
            ));
        }

        let first = self.parse_expression()?;
        let (kind, items) = if self.check(&Token::Arrow) {
            let mut entries = vec![self.finish_map_entry(first)?];
            if self.eat(&Token::Comma).is_some() {
                entries.extend(self.parse_separated(Token::RBrace, |p| {
                    let key = p.parse_expression()?;
                    p.finish_map_entry(key)
                })?);
            }
            (NodeKind::MapLiteral, entries)
        } else {
            let mut elements = vec![first];
            if self.eat(&Token::Comma).is_some() {
                elements.extend(self.parse_separated(Token::RBrace, Self::parse_expression)?);
            }
            (NodeKind::SetLiteral, elements)
        };

        let end = self.expect(Token::RBrace)?.span;
        Ok(CstNode::with_children(kind, self.span_from(start, &end), items))
    }

    fn finish_map_entry(&mut self, key: CstNode) -> ParseResult<CstNode> {
        self.expect(Token::Arrow)?;
        let value = self.parse_expression()?.field("value");
        let span = key.span.merge(&value.span);
        Ok(CstNode::with_children(
            NodeKind::MapEntry,
            span,
            vec![key.field("key"), value],
        ))
    }

    /// Items separated by commas up to (not including) `close`; a trailing
    /// comma is allowed
    pub(crate) fn parse_separated(
        &mut self,
        close: Token,
        mut item: impl FnMut(&mut Self) -> ParseResult<CstNode>,
    ) -> ParseResult<Vec<CstNode>> {
        let mut items = Vec::new();
        while !self.check(&close) && !self.is_at_end() {
            items.push(item(self)?);
            if self.eat(&Token::Comma).is_none() {
                break;
            }
        }
        Ok(items)
    }
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

    #[test]
    fn test_bracket_literals() {
        assert_eq!(expression("[]").kind, NodeKind::TupleLiteral);
        assert_eq!(expression("[1, 'two', 3.0]").child_count(), 3);

        let record = expression("[a= 1, b= [c= 2],]");
        assert_eq!(record.kind, NodeKind::RecordLiteral);
        assert_eq!(record.child_count(), 2);
        assert_eq!(
            record.children[1].child_by_field("value").unwrap().kind,
            NodeKind::RecordLiteral
        );
    }

    #[test]
    fn test_tuple_of_identifiers_is_not_a_record() {
        let tuple = expression("[a, b == c]");
        assert_eq!(tuple.kind, NodeKind::TupleLiteral);
        assert_eq!(tuple.children[1].kind, NodeKind::BinaryExpression);
    }

    #[test]
    fn test_brace_literals() {
        assert_eq!(expression("{}").kind, NodeKind::SetLiteral);
        assert_eq!(expression("{1, 2, 3}").child_count(), 3);

        let map = expression("{'a' -> 1, 'b' -> 2}");
        assert_eq!(map.kind, NodeKind::MapLiteral);
        assert_eq!(
            map.children[0].child_by_field("key").unwrap().kind,
            NodeKind::StringLiteral
        );
    }

    #[test]
    fn test_mixed_map_entries_are_rejected() {
        let (_, errors) = parse("{1 -> 2, 3};");
        assert_eq!(errors.first().map(|e| e.code()), Some(1201));
    }
}
