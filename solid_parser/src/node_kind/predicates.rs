//! NodeKind predicate methods

use super::NodeKind;

impl NodeKind {
    /// Check if this is a named node (operator leaves are anonymous)
    pub fn is_named(&self) -> bool {
        !matches!(self, NodeKind::Operator)
    }

    /// Check if this kind can appear directly under [`NodeKind::Goal`]
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::EmptyStatement
                | NodeKind::ExpressionStatement
                | NodeKind::VariableDeclaration
                | NodeKind::TypeDeclaration
                | NodeKind::Assignment
        )
    }

    /// Check if this is a literal leaf
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::NullLiteral
                | NodeKind::BooleanLiteral
                | NodeKind::IntegerLiteral
                | NodeKind::FloatLiteral
                | NodeKind::StringLiteral
        )
    }

    /// Check if this is an expression node
    pub fn is_expression(&self) -> bool {
        self.is_literal()
            || matches!(
                self,
                NodeKind::Identifier
                    | NodeKind::TupleLiteral
                    | NodeKind::RecordLiteral
                    | NodeKind::SetLiteral
                    | NodeKind::MapLiteral
                    | NodeKind::AccessExpression
                    | NodeKind::CallExpression
                    | NodeKind::UnaryExpression
                    | NodeKind::BinaryExpression
                    | NodeKind::ConditionalExpression
            )
    }

    /// Check if this is a type expression node
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            NodeKind::KeywordType
                | NodeKind::LiteralType
                | NodeKind::TypeName
                | NodeKind::TupleType
                | NodeKind::RecordType
                | NodeKind::DictType
                | NodeKind::MapType
                | NodeKind::NullableType
                | NodeKind::ListType
                | NodeKind::TupleRepeatType
                | NodeKind::SetType
                | NodeKind::MutableType
                | NodeKind::UnionType
                | NodeKind::IntersectionType
        )
    }

    /// Check if this is a collection literal gated by the `literal_collections` feature
    pub fn is_collection_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::TupleLiteral
                | NodeKind::RecordLiteral
                | NodeKind::SetLiteral
                | NodeKind::MapLiteral
        )
    }

    /// Check if this is an accessor child of an access expression
    pub fn is_accessor(&self) -> bool {
        matches!(
            self,
            NodeKind::IndexAccessor | NodeKind::PropertyAccessor | NodeKind::ComputedAccessor
        )
    }
}
