//! Parser tests
//!
//! End-to-end checks of the public parsing API on whole programs.

use pretty_assertions::assert_eq;
use solid_parser::{parse, parse_with_errors, CstNode, NodeKind};

fn statements(source: &str) -> Vec<CstNode> {
    let (root, errors) = parse_with_errors(source);
    assert!(errors.is_empty(), "{}", errors.format_all(source));
    assert_eq!(root.kind, NodeKind::Goal);
    root.children
}

fn kinds(source: &str) -> Vec<NodeKind> {
    statements(source).iter().map(|s| s.kind).collect()
}

#[test]
fn test_statement_kinds() {
    assert_eq!(
        kinds(
            "
            % declarations
            let x: int = 1;
            let unfixed y: float = 2.0;
            type T = [int, str];
            ;
            y = x + 1;
            x;
            "
        ),
        vec![
            NodeKind::VariableDeclaration,
            NodeKind::VariableDeclaration,
            NodeKind::TypeDeclaration,
            NodeKind::EmptyStatement,
            NodeKind::Assignment,
            NodeKind::ExpressionStatement,
        ]
    );
}

#[test]
fn test_declaration_outline() {
    let goal = parse("let x: int[] = [1, 2];").unwrap();
    insta::assert_snapshot!(goal.debug_ast_string(), @r#"
    Goal
      VariableDeclaration
        name: Identifier = "x"
        type: ListType
          type: KeywordType = "int"
        value: TupleLiteral
          IntegerLiteral = "1"
          IntegerLiteral = "2"
    "#);
}

#[test]
fn test_conditional_with_access_and_call() {
    let stmts = statements("if a.ok then List.<int>() else [1].0;");
    let cond = stmts[0].child_by_field("expression").unwrap();
    assert_eq!(cond.kind, NodeKind::ConditionalExpression);
    assert_eq!(
        cond.child_by_field("condition").unwrap().kind,
        NodeKind::AccessExpression
    );
    assert_eq!(
        cond.child_by_field("consequence").unwrap().kind,
        NodeKind::CallExpression
    );
    let alternative = cond.child_by_field("alternative").unwrap();
    assert_eq!(
        alternative.child_by_field("base").unwrap().kind,
        NodeKind::TupleLiteral
    );
}

#[test]
fn test_record_type_declaration() {
    let stmts = statements("type Point = mutable [x: float, y: float, label?: str];");
    let value = stmts[0].child_by_field("value").unwrap();
    assert_eq!(value.kind, NodeKind::MutableType);
    let record = value.child_by_field("type").unwrap();
    let keys: Vec<_> = record
        .children
        .iter()
        .filter_map(|e| e.child_by_field("key").and_then(|k| k.text_str()))
        .collect();
    assert_eq!(keys, vec!["x", "y", "label"]);
}

#[test]
fn test_spans_and_lines() {
    let stmts = statements("1;\n  let b: bool = true;");
    let decl = &stmts[1];
    assert_eq!(decl.span.line(), 2);
    assert_eq!(decl.span.column(), 3);
    assert_eq!(
        decl.text_from_source("1;\n  let b: bool = true;"),
        "let b: bool = true;"
    );
}

#[test]
fn test_error_codes() {
    let cases = [
        ("let x: int = 'open;", 1102),
        (r"'\z';", 1103),
        ("1__2;", 1104),
        ("1.0e;", 1105),
        ("let 1: int = 1;", 1201),
        ("let x: int = ", 1202),
        ("f(1) = 2;", 1203),
    ];
    for (source, code) in cases {
        let err = parse(source).unwrap_err();
        assert_eq!(err.code(), code, "{source}: {err}");
    }
}

#[test]
fn test_error_context_rendering() {
    let source = "let x: int = ;";
    let err = parse(source).unwrap_err();
    let rendered = err.format_with_context(source);
    assert!(rendered.contains("let x: int = ;"));
    assert!(rendered.contains('^'));
}

#[test]
fn test_json_export() {
    let goal = parse("x;").unwrap();
    let json = goal.to_json();
    assert_eq!(json["kind"], "Goal");
    assert_eq!(json["children"][0]["kind"], "ExpressionStatement");
    assert_eq!(json["children"][0]["children"][0]["field_name"], "expression");
}
