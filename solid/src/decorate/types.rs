use std::cell::Cell;

use solid_parser::{CstNode, NodeKind};

use super::{field, literal_value, parse_integer, text, unexpected, DecorateResult, Decorator};
use crate::ast::{TypeEntryExpression, TypeExpression, TypeExpressionKind, TypeOperator};
use crate::error::SolidError;
use crate::types::SolidType;
use crate::value::Value;

fn keyword_type(node: &CstNode) -> DecorateResult<SolidType> {
    Ok(match text(node)? {
        "void" => SolidType::Void,
        "bool" => SolidType::Boolean,
        "int" => SolidType::Integer,
        "float" => SolidType::Float,
        "str" => SolidType::String,
        "obj" => SolidType::Object,
        "unknown" => SolidType::Unknown,
        "never" => SolidType::Never,
        _ => return Err(unexpected(node, "type keyword")),
    })
}

/// `42`, `-4.2`, `'s'`, `true`, `null`
fn literal_type(node: &CstNode) -> DecorateResult<SolidType> {
    let literal = field(node, "value")?;
    let value = match (node.operator(), literal.kind) {
        (Some("-"), NodeKind::IntegerLiteral) => {
            Value::Integer(parse_integer(&format!("-{}", text(literal)?), literal.span)?)
        }
        (Some("-"), _) => match literal_value(literal)? {
            Value::Float(x) => Value::Float(-x),
            value => value,
        },
        _ => literal_value(literal)?,
    };
    value
        .to_scalar()
        .map(SolidType::Unit)
        .ok_or_else(|| unexpected(node, "literal type"))
}

impl Decorator<'_> {
    pub(super) fn type_expression(&self, node: &CstNode) -> DecorateResult<TypeExpression> {
        use TypeExpressionKind as K;

        let inner = |name: &str| -> DecorateResult<Box<TypeExpression>> {
            Ok(Box::new(self.type_expression(field(node, name)?)?))
        };

        let kind = match node.kind {
            NodeKind::KeywordType => K::Constant(keyword_type(node)?),
            NodeKind::LiteralType => K::Constant(literal_type(node)?),
            NodeKind::TypeName => K::Alias {
                name: text(node)?.to_string(),
                symbol: Cell::new(None),
            },
            NodeKind::TupleType => K::Tuple(
                node.named_children()
                    .map(|entry| {
                        Ok(TypeEntryExpression {
                            key: None,
                            value: self.type_expression(field(entry, "type")?)?,
                            optional: entry.has_modifier("?:"),
                        })
                    })
                    .collect::<DecorateResult<_>>()?,
            ),
            NodeKind::RecordType => K::Record(
                node.named_children()
                    .map(|entry| {
                        let key = field(entry, "key")?;
                        Ok(TypeEntryExpression {
                            key: Some((text(key)?.to_string(), key.span)),
                            value: self.type_expression(field(entry, "type")?)?,
                            optional: entry.has_modifier("?:"),
                        })
                    })
                    .collect::<DecorateResult<_>>()?,
            ),
            NodeKind::DictType => K::Dict(inner("type")?),
            NodeKind::MapType => K::Map(inner("key")?, inner("value")?),
            NodeKind::NullableType => K::Nullable(inner("type")?),
            NodeKind::ListType => K::List(inner("type")?),
            NodeKind::SetType => K::Set(inner("type")?),
            NodeKind::TupleRepeatType => {
                let count = field(node, "count")?;
                let n = parse_integer(text(count)?, count.span)?;
                let n = usize::try_from(n)
                    .map_err(|_| SolidError::internal("negative tuple repeat count", count.span))?;
                K::Repeat(inner("type")?, n)
            }
            NodeKind::MutableType => K::Mutable(inner("type")?),
            NodeKind::UnionType => K::Operation(TypeOperator::Union, inner("left")?, inner("right")?),
            NodeKind::IntersectionType => {
                K::Operation(TypeOperator::Intersection, inner("left")?, inner("right")?)
            }
            _ => return Err(unexpected(node, "type position")),
        };
        Ok(TypeExpression::new(kind, node.span))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Statement;
    use crate::config::SolidConfig;
    use crate::decorate::decorate;
    use crate::types::{Scalar, SolidType};
    use crate::validator::Validator;

    fn evaluate(annotation: &str) -> SolidType {
        let source = format!("type T = {annotation};");
        let cst = solid_parser::parse(&source).unwrap();
        let goal = decorate(&cst, &SolidConfig::default()).unwrap();
        let mut v = Validator::new(SolidConfig::default());
        goal.var_check(&mut v).unwrap();
        let Some(Statement::Type(declaration)) = goal.statements.first() else {
            panic!("expected a type declaration");
        };
        declaration.value.evaluate(&mut v).unwrap()
    }

    #[test]
    fn test_negative_literal_type() {
        assert_eq!(evaluate("-4"), SolidType::Unit(Scalar::Integer(-4)));
        assert_eq!(evaluate("-4.5"), SolidType::Unit(Scalar::Float(-4.5)));
        assert_eq!(
            evaluate("-2147483648"),
            SolidType::Unit(Scalar::Integer(i32::MIN))
        );
    }

    #[test]
    fn test_repeat_type() {
        assert_eq!(evaluate("int[2]"), evaluate("[int, int]"));
    }

    #[test]
    fn test_optional_entries() {
        let SolidType::Record { fields, .. } = evaluate("[a: int, b?: str]") else {
            panic!("expected a record type");
        };
        assert!(!fields["a"].optional);
        assert!(fields["b"].optional);
    }
}
