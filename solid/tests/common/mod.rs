//! Shared helpers for integration tests
// Each test target uses a different subset of these helpers.
#![allow(dead_code)]

use solid::{SolidConfig, SolidError};

/// Defaults with constant folding switched off, so expressions reach the builder
pub fn unfolded() -> SolidConfig {
    SolidConfig::default().with_constant_folding(false)
}

/// Compile to text, panicking with the rendered error on failure
pub fn print_ok(src: &str, config: &SolidConfig) -> String {
    solid::print(src, Some(config))
        .unwrap_or_else(|e| panic!("compile failed: {}", e.format_with_context(src)))
}

/// Compile and return the error code, panicking if compilation succeeds
pub fn error_code(src: &str, config: &SolidConfig) -> u32 {
    match solid::print(src, Some(config)) {
        Ok(out) => panic!("expected an error, got:\n{out}"),
        Err(e) => e.code(),
    }
}

pub fn compile_error(src: &str) -> SolidError {
    match solid::print(src, None) {
        Ok(out) => panic!("expected an error, got:\n{out}"),
        Err(e) => e,
    }
}

/// Wrap statement lines the way the module printer lays out `main`
pub fn main_module(locals: &[&str], statements: &[&str]) -> String {
    let mut out = String::from("(module\n\t(func (export \"main\")\n");
    for local in locals {
        out.push_str(&format!("\t\t{local}\n"));
    }
    for (i, statement) in statements.iter().enumerate() {
        out.push_str(&format!("\t\t;; statement {i}\n\t\t{statement}\n"));
    }
    out.push_str("\t)\n)");
    out
}
