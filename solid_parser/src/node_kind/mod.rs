//! Node kinds for the Solid CST

mod predicates;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

/// CST node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // ==================== Top Level ====================
    /// Root node holding every statement
    Goal,

    // ==================== Statements ====================
    /// A lone `;`
    EmptyStatement,
    /// `expr;`
    ExpressionStatement,
    /// `let [unfixed] name: type = expr;`
    VariableDeclaration,
    /// `type Name = type;`
    TypeDeclaration,
    /// `target = expr;`
    Assignment,

    // ==================== Literals ====================
    NullLiteral,
    BooleanLiteral,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    Identifier,

    // ==================== Expressions ====================
    /// `[a, b]`
    TupleLiteral,
    /// `[k= v, ...]`
    RecordLiteral,
    /// `k= v` inside a record literal
    RecordEntry,
    /// `{a, b}`
    SetLiteral,
    /// `{k -> v, ...}`
    MapLiteral,
    /// `k -> v` inside a map literal
    MapEntry,
    /// `base.n`, `base.key`, `base.[expr]` and the `?.` / `!.` forms
    AccessExpression,
    /// `.n`
    IndexAccessor,
    /// `.key`
    PropertyAccessor,
    /// `.[expr]`
    ComputedAccessor,
    /// `callee.<T>(args)` or `callee(args)`
    CallExpression,
    /// `<T, U>` on a call
    TypeArguments,
    /// `(a, b)` on a call
    Arguments,
    /// `op operand`
    UnaryExpression,
    /// `left op right`
    BinaryExpression,
    /// `if c then a else b`
    ConditionalExpression,

    // ==================== Types ====================
    /// `void`, `bool`, `int`, `float`, `str`, `obj`, `unknown`, `never`
    KeywordType,
    /// A literal used as a unit type: `null`, `true`, `42`, `-4.2`, `'s'`
    LiteralType,
    /// A reference to a type alias
    TypeName,
    /// `[A, ?: B]`
    TupleType,
    /// One item of a tuple type
    TupleTypeEntry,
    /// `[a: A, b?: B]`
    RecordType,
    /// One `key: T` of a record type
    RecordTypeEntry,
    /// `[:T]`
    DictType,
    /// `{K -> V}`
    MapType,
    /// `T?`
    NullableType,
    /// `T[]`
    ListType,
    /// `T[n]`
    TupleRepeatType,
    /// `T{}`
    SetType,
    /// `mutable T`
    MutableType,
    /// `A | B`
    UnionType,
    /// `A & B`
    IntersectionType,

    // ==================== Leaves ====================
    /// An operator or modifier keyword kept as text
    Operator,
    /// Error recovery node
    Error,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl NodeKind {
    /// snake_case name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Goal => "goal",
            NodeKind::EmptyStatement => "empty_statement",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::VariableDeclaration => "variable_declaration",
            NodeKind::TypeDeclaration => "type_declaration",
            NodeKind::Assignment => "assignment",
            NodeKind::NullLiteral => "null_literal",
            NodeKind::BooleanLiteral => "boolean_literal",
            NodeKind::IntegerLiteral => "integer_literal",
            NodeKind::FloatLiteral => "float_literal",
            NodeKind::StringLiteral => "string_literal",
            NodeKind::Identifier => "identifier",
            NodeKind::TupleLiteral => "tuple_literal",
            NodeKind::RecordLiteral => "record_literal",
            NodeKind::RecordEntry => "record_entry",
            NodeKind::SetLiteral => "set_literal",
            NodeKind::MapLiteral => "map_literal",
            NodeKind::MapEntry => "map_entry",
            NodeKind::AccessExpression => "access_expression",
            NodeKind::IndexAccessor => "index_accessor",
            NodeKind::PropertyAccessor => "property_accessor",
            NodeKind::ComputedAccessor => "computed_accessor",
            NodeKind::CallExpression => "call_expression",
            NodeKind::TypeArguments => "type_arguments",
            NodeKind::Arguments => "arguments",
            NodeKind::UnaryExpression => "unary_expression",
            NodeKind::BinaryExpression => "binary_expression",
            NodeKind::ConditionalExpression => "conditional_expression",
            NodeKind::KeywordType => "keyword_type",
            NodeKind::LiteralType => "literal_type",
            NodeKind::TypeName => "type_name",
            NodeKind::TupleType => "tuple_type",
            NodeKind::TupleTypeEntry => "tuple_type_entry",
            NodeKind::RecordType => "record_type",
            NodeKind::RecordTypeEntry => "record_type_entry",
            NodeKind::DictType => "dict_type",
            NodeKind::MapType => "map_type",
            NodeKind::NullableType => "nullable_type",
            NodeKind::ListType => "list_type",
            NodeKind::TupleRepeatType => "tuple_repeat_type",
            NodeKind::SetType => "set_type",
            NodeKind::MutableType => "mutable_type",
            NodeKind::UnionType => "union_type",
            NodeKind::IntersectionType => "intersection_type",
            NodeKind::Operator => "operator",
            NodeKind::Error => "ERROR",
        }
    }
}
