//! Tests for node_kind module

use super::*;

#[test]
fn test_statement_kinds() {
    assert!(NodeKind::VariableDeclaration.is_statement());
    assert!(NodeKind::Assignment.is_statement());
    assert!(!NodeKind::BinaryExpression.is_statement());
}

#[test]
fn test_expression_and_type_kinds_are_disjoint() {
    let kinds = [
        NodeKind::IntegerLiteral,
        NodeKind::Identifier,
        NodeKind::TupleLiteral,
        NodeKind::TupleType,
        NodeKind::TypeName,
        NodeKind::UnionType,
        NodeKind::ConditionalExpression,
    ];
    for kind in kinds {
        assert!(
            !(kind.is_expression() && kind.is_type()),
            "{kind} is classified as both expression and type"
        );
    }
    assert!(NodeKind::TupleLiteral.is_expression());
    assert!(NodeKind::TupleType.is_type());
}

#[test]
fn test_collection_literals() {
    assert!(NodeKind::MapLiteral.is_collection_literal());
    assert!(!NodeKind::MapType.is_collection_literal());
}

#[test]
fn test_operator_is_anonymous() {
    assert!(!NodeKind::Operator.is_named());
    assert!(NodeKind::Identifier.is_named());
}

#[test]
fn test_display_uses_snake_case() {
    assert_eq!(NodeKind::VariableDeclaration.to_string(), "variable_declaration");
    assert_eq!(NodeKind::Error.to_string(), "ERROR");
}
