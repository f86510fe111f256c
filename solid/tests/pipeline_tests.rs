//! Integration tests: source text through to the printed module

mod common;
use common::*;

use pretty_assertions::assert_eq;
use solid::SolidConfig;

// ==================== Expression statements ====================

#[test]
fn test_arithmetic_without_folding() {
    let out = print_ok("2 + 3;", &unfolded());
    assert_eq!(
        out,
        main_module(&[], &["(drop (i32.add (i32.const 2) (i32.const 3)))"])
    );
}

#[test]
fn test_arithmetic_is_folded_by_default() {
    let out = print_ok("2 + 3;", &SolidConfig::default());
    assert_eq!(out, main_module(&[], &["(drop (i32.const 5))"]));
}

#[test]
fn test_mixed_arithmetic_converts_the_int_side() {
    let out = print_ok("2 + 3.0;", &unfolded());
    assert_eq!(
        out,
        main_module(
            &[],
            &["(drop (f64.add (f64.convert_i32_s (i32.const 2)) (f64.const 3.0)))"]
        )
    );
}

#[test]
fn test_integer_exponent_pulls_in_its_helper() {
    let out = print_ok("2 ^ 10;", &unfolded());
    assert!(out.contains("\t(func $exp (param $b i32)"), "{out}");
    assert!(out.contains("(drop (call $exp (i32.const 2) (i32.const 10)))"), "{out}");

    let out = print_ok("2.0 ^ 0.5;", &unfolded());
    let import = out.find("(import \"Math\" \"pow\"").expect("missing import");
    let main = out.find("(func (export \"main\")").expect("missing main");
    assert!(import < main);
}

#[test]
fn test_empty_program() {
    assert_eq!(print_ok("", &SolidConfig::default()), main_module(&[], &[]));
    assert_eq!(print_ok(";;", &SolidConfig::default()), main_module(&[], &[]));
}

// ==================== Identity and equality ====================

#[test]
fn test_identity_tells_signed_zeros_apart() {
    assert_eq!(
        print_ok("0 === -0.0;", &SolidConfig::default()),
        main_module(&[], &["(drop (i32.const 0))"])
    );
    assert_eq!(
        print_ok("0 == -0.0;", &SolidConfig::default()),
        main_module(&[], &["(drop (i32.const 1))"])
    );
}

#[test]
fn test_unfolded_identity_calls_a_helper() {
    let out = print_ok("0 === -0.0;", &unfolded());
    assert!(out.contains("\t(func $i_f_id "), "{out}");
    assert!(
        out.contains("(drop (call $i_f_id (i32.const 0) (f64.neg (f64.const 0.0))))"),
        "{out}"
    );

    // `$f_i_id` delegates to `$i_f_id`, so both are emitted
    let out = print_ok("-0.0 === 0;", &unfolded());
    assert!(out.contains("(func $f_i_id "), "{out}");
    assert!(out.contains("(func $i_f_id "), "{out}");
}

#[test]
fn test_values_of_different_kinds_are_never_equal() {
    let src = "let unfixed b: bool = true; let unfixed i: int = 1; b === i; b !== i; b == i;";
    assert_eq!(
        print_ok(src, &SolidConfig::default()),
        main_module(
            &["(local $var0 i32)", "(local $var1 i32)"],
            &[
                "(local.set $var0 (i32.const 1))",
                "(local.set $var1 (i32.const 1))",
                "(drop (i32.const 0))",
                "(drop (i32.const 1))",
                "(drop (i32.const 0))",
            ]
        )
    );

    // the same answers the folder gives
    let constants = main_module(&[], &["(drop (i32.const 0))", "(drop (i32.const 0))"]);
    assert_eq!(print_ok("true === 1; null == 0;", &SolidConfig::default()), constants);
    assert_eq!(print_ok("true === 1; null == 0;", &unfolded()), constants);
}

#[test]
fn test_same_kind_equality_compares_at_run_time() {
    let out = print_ok("let unfixed n: int = 0; n == 0;", &SolidConfig::default());
    assert!(out.contains("(drop (i32.eq (local.get $var0) (i32.const 0)))"), "{out}");
}

#[test]
fn test_most_negative_int_literal() {
    for config in [SolidConfig::default(), unfolded()] {
        assert_eq!(
            print_ok("-2147483648;", &config),
            main_module(&[], &["(drop (i32.const -2147483648))"])
        );
    }
}

// ==================== Variables ====================

#[test]
fn test_fixed_scalar_becomes_a_global() {
    let out = print_ok("let x: int = 42; x + 1;", &unfolded());
    assert_eq!(
        out,
        "(module\n\
         \t(global $glb0 i32 (i32.const 42))\n\
         \t(func (export \"main\")\n\
         \t\t;; statement 0\n\
         \t\t(drop (i32.add (global.get $glb0) (i32.const 1)))\n\
         \t)\n\
         )"
    );

    let folded = print_ok("let x: int = 42; x + 1;", &SolidConfig::default());
    assert!(folded.contains("\t\t(drop (i32.const 43))\n"), "{folded}");
}

#[test]
fn test_unfixed_variable_is_reassignable() {
    let out = print_ok("let unfixed x: int = 1; x = 2;", &SolidConfig::default());
    assert_eq!(
        out,
        main_module(
            &["(local $var0 i32)"],
            &["(local.set $var0 (i32.const 1))", "(local.set $var0 (i32.const 2))"]
        )
    );
}

#[test]
fn test_int_initializer_widens_into_float_local() {
    let out = print_ok("let unfixed f: float = 1;", &SolidConfig::default());
    assert_eq!(
        out,
        main_module(
            &["(local $var0 f64)"],
            &["(local.set $var0 (f64.convert_i32_s (i32.const 1)))"]
        )
    );
}

#[test]
fn test_logical_and_keeps_left_operand_in_a_temp() {
    let out = print_ok(
        "let unfixed a: bool = true; a && false;",
        &SolidConfig::default(),
    );
    assert!(out.contains("\t\t(local $var0 i32)\n\t\t(local $tmp0 i32)\n"), "{out}");
    assert!(
        out.contains(
            "(drop (if (result i32) (call $inot (local.tee $tmp0 (local.get $var0))) \
             (then (local.get $tmp0)) (else (i32.const 0))))"
        ),
        "{out}"
    );
}

#[test]
fn test_type_declarations_emit_nothing() {
    let out = print_ok("type Real = float; let unfixed n: Real = 3;", &SolidConfig::default());
    assert_eq!(
        out,
        main_module(
            &["(local $var1 f64)"],
            &["(local.set $var1 (f64.convert_i32_s (i32.const 3)))"]
        )
    );
}

// ==================== Diagnostics and IR ====================

#[test]
fn test_notes_are_collected_on_request() {
    use solid::diagnostics::DiagnosticReason;

    let (_, notes) = solid::print_with_diagnostics("let f: float = 1; 2 * 3;", None).unwrap();
    assert!(notes
        .iter()
        .any(|d| d.reason == DiagnosticReason::CoercionInserted));
    assert!(notes
        .iter()
        .any(|d| d.reason == DiagnosticReason::ConstantFolded("6".into())));

    let (_, notes) = solid::print_with_diagnostics("let unfixed i: int = 1;", Some(&unfolded())).unwrap();
    assert!(notes.is_empty());
}

#[test]
fn test_ir_json_is_the_instruction_tree() {
    let json = solid::emit_ir_json("2 + 3;", None).unwrap();
    let tree: serde_json::Value = serde_json::from_str(&json).unwrap();
    let statement = &tree["Module"]["statements"][0]["Statement"];
    assert_eq!(statement["index"], 0);
    assert_eq!(statement["body"]["Drop"]["ConstInt"], 5);
}

#[test]
fn test_config_from_toml() {
    let config = SolidConfig::from_toml_str(
        "[compiler_options]\nconstant_folding = false\n",
    )
    .unwrap();
    assert_eq!(
        print_ok("1 - 1;", &config),
        main_module(&[], &["(drop (i32.sub (i32.const 1) (i32.const 1)))"])
    );
}
