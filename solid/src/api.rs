//! Rust API for compiling Solid source.
//!
//! Every entry point runs the same pipeline and stops at the first error:
//!
//! ```text
//! parse → decorate → var_check → type_check → build → optimize → validate
//! ```
//!
//! `config` defaults to [`DEFAULT_CONFIG`] when `None`.

use solid_parser::Span;

use crate::ast::{Goal, Statement};
use crate::backend;
use crate::builder::binary::{self, BinaryError, ImageFlags, ModuleImage};
use crate::builder::{Builder, Instruction};
use crate::config::{SolidConfig, DEFAULT_CONFIG};
use crate::decorate::decorate;
use crate::diagnostics::{solid_trace_log, Diagnostic};
use crate::error::SolidError;
use crate::types::SolidType;
use crate::validator::Validator;

fn config_or_default(config: Option<&SolidConfig>) -> &SolidConfig {
    config.unwrap_or(&*DEFAULT_CONFIG)
}

/// Parse, decorate and check a program
fn analyze(
    source: &str,
    config: &SolidConfig,
    collect_diagnostics: bool,
) -> Result<(Goal, Validator), SolidError> {
    let cst = solid_parser::parse(source)?;
    let goal = decorate(&cst, config)?;
    solid_trace_log(format_args!(
        "[solid] decorated {} statement(s)",
        goal.statements.len()
    ));

    let mut v = Validator::new(config.clone());
    if collect_diagnostics {
        v.diagnostics_mut().enable();
    }
    goal.var_check(&mut v)?;
    solid_trace_log(format_args!("[solid] var_check done"));
    goal.type_check(&mut v)?;
    solid_trace_log(format_args!("[solid] type_check done"));
    Ok((goal, v))
}

/// Run the whole pipeline and return the validated module
fn assemble(
    source: &str,
    config: &SolidConfig,
    collect_diagnostics: bool,
) -> Result<(Instruction, Vec<Diagnostic>), SolidError> {
    let (goal, mut v) = analyze(source, config, collect_diagnostics)?;

    let mut builder = Builder::new();
    goal.build(&mut v, &mut builder)?;
    let module = backend::optimize(builder.finish())?;
    backend::validate(&module)?;
    solid_trace_log(format_args!("[solid] module validated"));

    Ok((module, v.take_diagnostics()))
}

/// Compile to the module's text form
pub fn print(source: &str, config: Option<&SolidConfig>) -> Result<String, SolidError> {
    let (module, _) = assemble(source, config_or_default(config), false)?;
    Ok(module.to_string())
}

/// Compile to a binary module image
pub fn compile(source: &str, config: Option<&SolidConfig>) -> Result<Vec<u8>, SolidError> {
    let config = config_or_default(config);
    let (module, _) = assemble(source, config, false)?;
    binary::encode(&module, ImageFlags::from(config))
        .map_err(|e| SolidError::internal(e.to_string(), Span::empty()))
}

/// Text form plus the notes collected while compiling
pub fn print_with_diagnostics(
    source: &str,
    config: Option<&SolidConfig>,
) -> Result<(String, Vec<Diagnostic>), SolidError> {
    let (module, diagnostics) = assemble(source, config_or_default(config), true)?;
    Ok((module.to_string(), diagnostics))
}

/// The validated instruction tree as JSON
pub fn emit_ir_json(source: &str, config: Option<&SolidConfig>) -> Result<String, SolidError> {
    let (module, _) = assemble(source, config_or_default(config), false)?;
    serde_json::to_string_pretty(&module)
        .map_err(|e| SolidError::internal(e.to_string(), Span::empty()))
}

/// Stop after type checking
pub fn check(source: &str, config: Option<&SolidConfig>) -> Result<(), SolidError> {
    analyze(source, config_or_default(config), false).map(|_| ())
}

/// Read back an image produced by [`compile`]
pub fn decode(bytes: &[u8]) -> Result<ModuleImage, BinaryError> {
    binary::decode(bytes)
}

/// Evaluate a standalone type annotation such as `[int, ?: str] | null`
pub fn parse_type(annotation: &str) -> Result<SolidType, SolidError> {
    let source = format!("type Annotation = {annotation};");
    let (goal, mut v) = analyze(&source, &DEFAULT_CONFIG, false)?;
    match goal.statements.first() {
        Some(Statement::Type(declaration)) => declaration.value.evaluate(&mut v),
        _ => Err(SolidError::internal("annotation did not parse as a type", goal.span)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_stops_before_lowering() {
        // strings type check but have no lowering
        assert!(check("let s: str = 'hi';", None).is_ok());
        assert_eq!(print("let unfixed s: str = 'hi';", None).unwrap_err().code(), 9001);
    }

    #[test]
    fn test_parse_errors_keep_their_code() {
        let err = print("let x: int = ;", None).unwrap_err();
        assert!(matches!(err, SolidError::Parse(_)));
        assert_eq!(err.code(), 1201);
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(parse_type("int | float").unwrap(), SolidType::Integer.union(&SolidType::Float));
    }
}
