//! Statement parsing
//!
//! ```text
//! statement := ';'
//!            | 'let' 'unfixed'? IDENT ':' type '=' expr ';'
//!            | 'type' IDENT '=' type ';'
//!            | target '=' expr ';'
//!            | expr ';'
//! ```

use crate::cst::CstNode;
use crate::error::{ParseError, ParseResult};
use crate::node_kind::NodeKind;
use crate::token::Token;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_statement(&mut self) -> ParseResult<CstNode> {
        match self.current.as_ref().map(|t| &t.token) {
            Some(Token::Semicolon) => self.leaf(NodeKind::EmptyStatement),
            Some(Token::KwLet) => self.parse_variable_declaration(),
            Some(Token::KwType) => self.parse_type_declaration(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_variable_declaration(&mut self) -> ParseResult<CstNode> {
        let start = self.expect(Token::KwLet)?.span.start;
        let mut children = Vec::new();

        if self.check(&Token::KwUnfixed) {
            children.push(self.parse_operator()?.field("modifier"));
        }
        children.push(self.parse_identifier()?.field("name"));
        self.expect(Token::Colon)?;
        children.push(self.parse_type()?.field("type"));
        self.expect(Token::Eq)?;
        children.push(self.parse_expression()?.field("value"));
        let end = self.expect(Token::Semicolon)?.span;

        Ok(CstNode::with_children(
            NodeKind::VariableDeclaration,
            self.span_from(start, &end),
            children,
        ))
    }

    fn parse_type_declaration(&mut self) -> ParseResult<CstNode> {
        let start = self.expect(Token::KwType)?.span.start;
        let name = self.parse_identifier()?.field("name");
        self.expect(Token::Eq)?;
        let value = self.parse_type()?.field("value");
        let end = self.expect(Token::Semicolon)?.span;

        Ok(CstNode::with_children(
            NodeKind::TypeDeclaration,
            self.span_from(start, &end),
            vec![name, value],
        ))
    }

    /// `expr;` or, when the expression is followed by `=`, an assignment
    fn parse_expression_statement(&mut self) -> ParseResult<CstNode> {
        let expression = self.parse_expression()?;
        let start = expression.span.start;

        if self.eat(&Token::Eq).is_some() {
            if !matches!(
                expression.kind,
                NodeKind::Identifier | NodeKind::AccessExpression
            ) {
                return Err(ParseError::invalid_syntax(
                    format!("cannot assign to {}", expression.kind),
                    expression.span,
                ));
            }
            let value = self.parse_expression()?.field("value");
            let end = self.expect(Token::Semicolon)?.span;
            return Ok(CstNode::with_children(
                NodeKind::Assignment,
                self.span_from(start, &end),
                vec![expression.field("target"), value],
            ));
        }

        let end = self.expect(Token::Semicolon)?.span;
        Ok(CstNode::with_children(
            NodeKind::ExpressionStatement,
            self.span_from(start, &end),
            vec![expression.field("expression")],
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::node_kind::NodeKind;
    use crate::parser::parse;

    #[test]
    fn test_variable_declaration_fields() {
        let (goal, errors) = parse("let unfixed x: int = 1;");
        assert!(errors.is_empty());
        let decl = goal.child(0).unwrap();
        assert_eq!(decl.kind, NodeKind::VariableDeclaration);
        assert!(decl.has_modifier("unfixed"));
        assert_eq!(decl.child_by_field("name").unwrap().text_str(), Some("x"));
        assert_eq!(decl.child_by_field("type").unwrap().kind, NodeKind::KeywordType);
        assert_eq!(
            decl.child_by_field("value").unwrap().kind,
            NodeKind::IntegerLiteral
        );
        assert_eq!((decl.span.start, decl.span.end), (0, 23));
    }

    #[test]
    fn test_annotation_is_required() {
        let (_, errors) = parse("let x = 1;");
        assert_eq!(errors.first().map(|e| e.code()), Some(1201));
    }

    #[test]
    fn test_assignment_targets() {
        let (goal, errors) = parse("x = 1; a.b.0 = 2;");
        assert!(errors.is_empty());
        assert_eq!(goal.child(0).unwrap().kind, NodeKind::Assignment);
        assert_eq!(
            goal.child(1)
                .unwrap()
                .child_by_field("target")
                .unwrap()
                .kind,
            NodeKind::AccessExpression
        );

        let (_, errors) = parse("1 + 2 = 3;");
        assert_eq!(errors.first().map(|e| e.code()), Some(1203));
    }

    #[test]
    fn test_recovery_continues_after_semicolon() {
        let (goal, errors) = parse("let = ; 1; ;");
        assert_eq!(errors.len(), 1);
        let kinds: Vec<_> = goal.children.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::ExpressionStatement, NodeKind::EmptyStatement]
        );
    }

    #[test]
    fn test_missing_semicolon_at_eof() {
        let (_, errors) = parse("1 + 2");
        assert_eq!(errors.first().map(|e| e.code()), Some(1202));
    }
}
