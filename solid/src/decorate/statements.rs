use solid_parser::{CstNode, NodeKind};

use super::{field, text, unexpected, DecorateResult, Decorator};
use crate::ast::{Assignment, DeclarationType, DeclarationVariable, Goal, Statement};

impl Decorator<'_> {
    pub(super) fn goal(&self, node: &CstNode) -> DecorateResult<Goal> {
        if node.kind != NodeKind::Goal {
            return Err(unexpected(node, "program root"));
        }
        let statements = node
            .named_children()
            .map(|s| self.statement(s))
            .collect::<DecorateResult<_>>()?;
        Ok(Goal::new(statements, node.span))
    }

    fn statement(&self, node: &CstNode) -> DecorateResult<Statement> {
        match node.kind {
            NodeKind::EmptyStatement => Ok(Statement::Empty(node.span)),
            NodeKind::ExpressionStatement => {
                Ok(Statement::Expression(self.expression(field(node, "expression")?)?))
            }
            NodeKind::VariableDeclaration => {
                let name = field(node, "name")?;
                Ok(Statement::Variable(DeclarationVariable::new(
                    text(name)?.to_string(),
                    name.span,
                    node.has_modifier("unfixed"),
                    self.type_expression(field(node, "type")?)?,
                    self.expression(field(node, "value")?)?,
                    node.span,
                )))
            }
            NodeKind::TypeDeclaration => {
                let name = field(node, "name")?;
                Ok(Statement::Type(DeclarationType::new(
                    text(name)?.to_string(),
                    name.span,
                    self.type_expression(field(node, "value")?)?,
                    node.span,
                )))
            }
            NodeKind::Assignment => {
                let target = field(node, "target")?;
                if !matches!(target.kind, NodeKind::Identifier | NodeKind::AccessExpression) {
                    return Err(unexpected(target, "assignment target"));
                }
                Ok(Statement::Assignment(Assignment::new(
                    self.expression(target)?,
                    self.expression(field(node, "value")?)?,
                    node.span,
                )))
            }
            _ => Err(unexpected(node, "statement position")),
        }
    }
}
