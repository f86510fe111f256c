//! Concrete Syntax Tree (CST) node structure
//!
//! The parser produces one [`CstNode`] tree rooted at [`NodeKind::Goal`].
//! Leaves keep their raw token text; structural children are addressed by
//! field name (`name`, `type`, `value`, `left`, `operator`, ...).

use serde::{Deserialize, Serialize};

use crate::node_kind::NodeKind;
use crate::span::Span;

/// A node in the Concrete Syntax Tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstNode {
    pub kind: NodeKind,

    pub span: Span,

    /// Whether this is a named node (vs an anonymous operator leaf)
    pub is_named: bool,

    pub children: Vec<CstNode>,

    /// Raw token text for leaf nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Field name if this node is a named field of its parent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}

impl CstNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            is_named: kind.is_named(),
            children: Vec::new(),
            text: None,
            field_name: None,
        }
    }

    /// Create a new leaf node with text
    pub fn leaf(kind: NodeKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(kind, span)
        }
    }

    /// Create a new node with children
    pub fn with_children(kind: NodeKind, span: Span, children: Vec<CstNode>) -> Self {
        Self {
            children,
            ..Self::new(kind, span)
        }
    }

    /// Attach a field name to this node (builder style)
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    /// Add a named field child
    pub fn push_field(&mut self, field_name: impl Into<String>, child: CstNode) {
        self.children.push(child.field(field_name));
    }

    pub fn child(&self, index: usize) -> Option<&CstNode> {
        self.children.get(index)
    }

    /// Get child by field name
    pub fn child_by_field(&self, name: &str) -> Option<&CstNode> {
        self.children
            .iter()
            .find(|c| c.field_name.as_deref() == Some(name))
    }

    /// Get named children (excluding anonymous operator leaves)
    pub fn named_children(&self) -> impl Iterator<Item = &CstNode> {
        self.children.iter().filter(|c| c.is_named)
    }

    pub fn text_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Text of the operator leaf of this node, if any
    pub fn operator(&self) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.kind == NodeKind::Operator && c.field_name.as_deref() == Some("operator"))
            .and_then(|c| c.text_str())
    }

    /// Check whether a modifier leaf (e.g. `unfixed`) is present
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.children.iter().any(|c| {
            c.field_name.as_deref() == Some("modifier") && c.text_str() == Some(modifier)
        })
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Get the text from source
    pub fn text_from_source<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }

    /// Render the tree as an indented outline, one node per line.
    ///
    /// ```text
    /// VariableDeclaration
    ///   name: Identifier = "x"
    ///   type: KeywordType = "int"
    ///   value: IntegerLiteral = "42"
    /// ```
    pub fn debug_ast_string(&self) -> String {
        let mut output = String::new();
        self.write_outline(&mut output, 0);
        output
    }

    fn write_outline(&self, output: &mut String, indent: usize) {
        output.push_str(&"  ".repeat(indent));
        if let Some(name) = &self.field_name {
            output.push_str(name);
            output.push_str(": ");
        }
        output.push_str(&format!("{:?}", self.kind));
        if let Some(text) = &self.text {
            output.push_str(&format!(" = {:?}", text));
        }
        output.push('\n');
        for child in &self.children {
            child.write_outline(output, indent + 1);
        }
    }

    /// Serialize the tree to JSON for tooling
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
