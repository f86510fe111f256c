use solid_parser::{CstNode, NodeKind};

use super::{field, literal_value, operator, parse_integer, text, unexpected, DecorateResult, Decorator};
use crate::ast::{
    AccessMode, Accessor, BinaryOperator, Collection, Expression, ExpressionKind, UnaryOperator,
};
use crate::value::Value;

impl Decorator<'_> {
    pub(super) fn expression(&self, node: &CstNode) -> DecorateResult<Expression> {
        let boxed = |name: &str| -> DecorateResult<Box<Expression>> {
            Ok(Box::new(self.expression(field(node, name)?)?))
        };

        let kind = match node.kind {
            k if k.is_literal() => ExpressionKind::Constant(literal_value(node)?),
            NodeKind::Identifier => return Ok(Expression::variable(text(node)?, node.span)),
            NodeKind::TupleLiteral | NodeKind::RecordLiteral | NodeKind::SetLiteral
            | NodeKind::MapLiteral => {
                self.require_collections(node.span)?;
                ExpressionKind::Collection(self.collection(node)?)
            }
            NodeKind::AccessExpression => {
                let mode = match operator(node)? {
                    "." => AccessMode::Plain,
                    "?." => AccessMode::Optional,
                    "!." => AccessMode::Claim,
                    _ => return Err(unexpected(node, "access operator")),
                };
                if mode != AccessMode::Plain {
                    self.require_optional_access(node.span)?;
                }
                ExpressionKind::Access {
                    base: boxed("base")?,
                    mode,
                    accessor: self.accessor(field(node, "accessor")?)?,
                }
            }
            NodeKind::CallExpression => {
                let generics = match node.child_by_field("generics") {
                    Some(list) => list
                        .named_children()
                        .map(|t| self.type_expression(t))
                        .collect::<DecorateResult<_>>()?,
                    None => Vec::new(),
                };
                let arguments = field(node, "arguments")?
                    .named_children()
                    .map(|a| self.expression(a))
                    .collect::<DecorateResult<_>>()?;
                ExpressionKind::Call {
                    callee: boxed("callee")?,
                    generics,
                    arguments,
                }
            }
            NodeKind::UnaryExpression => {
                let op = UnaryOperator::from_text(operator(node)?)
                    .ok_or_else(|| unexpected(node, "unary operator"))?;
                let operand = field(node, "operand")?;
                if op == UnaryOperator::Minus && operand.kind == NodeKind::IntegerLiteral {
                    // the sign belongs to the literal, so `-2147483648` fits
                    let digits = format!("-{}", text(operand)?);
                    ExpressionKind::Constant(Value::Integer(parse_integer(&digits, node.span)?))
                } else {
                    ExpressionKind::Unary {
                        op,
                        operand: Box::new(self.expression(operand)?),
                    }
                }
            }
            NodeKind::BinaryExpression => {
                let op = BinaryOperator::from_text(operator(node)?)
                    .ok_or_else(|| unexpected(node, "binary operator"))?;
                ExpressionKind::Binary {
                    op,
                    left: boxed("left")?,
                    right: boxed("right")?,
                }
            }
            NodeKind::ConditionalExpression => ExpressionKind::Conditional {
                condition: boxed("condition")?,
                consequence: boxed("consequence")?,
                alternative: boxed("alternative")?,
            },
            _ => return Err(unexpected(node, "expression position")),
        };
        Ok(Expression::new(kind, node.span))
    }

    fn collection(&self, node: &CstNode) -> DecorateResult<Collection> {
        let items = || {
            node.named_children()
                .map(|item| self.expression(item))
                .collect::<DecorateResult<Vec<_>>>()
        };

        Ok(match node.kind {
            NodeKind::TupleLiteral => Collection::Tuple(items()?),
            NodeKind::SetLiteral => Collection::Set(items()?),
            NodeKind::RecordLiteral => Collection::Record(
                node.named_children()
                    .map(|entry| {
                        let key = field(entry, "key")?;
                        Ok((
                            text(key)?.to_string(),
                            key.span,
                            self.expression(field(entry, "value")?)?,
                        ))
                    })
                    .collect::<DecorateResult<_>>()?,
            ),
            NodeKind::MapLiteral => Collection::Map(
                node.named_children()
                    .map(|entry| {
                        Ok((
                            self.expression(field(entry, "key")?)?,
                            self.expression(field(entry, "value")?)?,
                        ))
                    })
                    .collect::<DecorateResult<_>>()?,
            ),
            _ => return Err(unexpected(node, "collection literal")),
        })
    }

    fn accessor(&self, node: &CstNode) -> DecorateResult<Accessor> {
        Ok(match node.kind {
            NodeKind::IndexAccessor => Accessor::Index(parse_integer(text(node)?, node.span)?),
            NodeKind::PropertyAccessor => Accessor::Property(text(node)?.to_string()),
            NodeKind::ComputedAccessor => {
                Accessor::Computed(Box::new(self.expression(field(node, "index")?)?))
            }
            _ => return Err(unexpected(node, "accessor")),
        })
    }
}
