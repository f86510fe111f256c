//! Per-compilation semantic state.
//!
//! The [`Validator`] owns the symbol table, the type [`Lattice`], the
//! diagnostics collector and the configuration. Every pass receives it by
//! mutable reference; nothing here is global.

use std::collections::HashMap;

use solid_parser::Span;

use crate::config::SolidConfig;
use crate::diagnostics::{Diagnostic, DiagnosticReason, DiagnosticsCollector};
use crate::error::{AssignmentError, ReferenceError, SolidError};
use crate::types::{AliasId, Lattice, SolidType};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    TypeAlias,
}

impl SymbolKind {
    fn describe(self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::TypeAlias => "type",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Unique within the compilation, in declaration order
    pub id: usize,
    pub name: String,
    pub span: Span,
    /// False until the declaration has progressed far enough to be read
    pub readable: bool,
    pub unfixed: bool,
    /// Declared type of a variable
    pub ty: Option<SolidType>,
    /// Compile-time value of a fixed variable, if its initializer assessed
    pub value: Option<Value>,
    /// Arena slot of a type alias
    pub alias: Option<AliasId>,
}

#[derive(Debug)]
pub struct Validator {
    config: SolidConfig,
    symbols: Vec<Symbol>,
    scope: HashMap<String, usize>,
    lattice: Lattice,
    diagnostics: DiagnosticsCollector,
}

impl Validator {
    pub fn new(config: SolidConfig) -> Self {
        Self {
            config,
            symbols: Vec::new(),
            scope: HashMap::new(),
            lattice: Lattice::new(),
            diagnostics: DiagnosticsCollector::default(),
        }
    }

    pub fn config(&self) -> &SolidConfig {
        &self.config
    }

    pub fn constant_folding(&self) -> bool {
        self.config.compiler_options.constant_folding
    }

    pub fn int_coercion(&self) -> bool {
        self.config.compiler_options.int_coercion
    }

    // ==================== Symbols ====================

    /// Register a declaration. The symbol is not readable yet.
    pub fn declare(
        &mut self,
        kind: SymbolKind,
        name: &str,
        span: Span,
        unfixed: bool,
    ) -> Result<usize, SolidError> {
        if self.scope.contains_key(name) {
            return Err(AssignmentError::duplicate_declaration(name, span).into());
        }
        let id = self.symbols.len();
        let alias = match kind {
            SymbolKind::TypeAlias => Some(self.lattice.declare_alias(name)),
            SymbolKind::Variable => None,
        };
        self.symbols.push(Symbol {
            kind,
            id,
            name: name.to_string(),
            span,
            readable: false,
            unfixed,
            ty: None,
            value: None,
            alias,
        });
        self.scope.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn mark_readable(&mut self, id: usize) {
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.readable = true;
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.scope.contains_key(name)
    }

    /// Resolve a reference to `name` expecting a symbol of `kind`
    pub fn check_reference(
        &self,
        name: &str,
        kind: SymbolKind,
        span: Span,
    ) -> Result<usize, SolidError> {
        let Some(&id) = self.scope.get(name) else {
            return Err(ReferenceError::undeclared(name, span).into());
        };
        let symbol = self.symbol(id, span)?;
        if symbol.kind != kind {
            return Err(ReferenceError::kind_mismatch(name, kind.describe(), span).into());
        }
        if !symbol.readable {
            return Err(ReferenceError::dead_zone(name, span).into());
        }
        Ok(id)
    }

    pub fn symbol(&self, id: usize, span: Span) -> Result<&Symbol, SolidError> {
        self.symbols
            .get(id)
            .ok_or_else(|| SolidError::internal(format!("unknown symbol #{id}"), span))
    }

    pub fn symbol_mut(&mut self, id: usize, span: Span) -> Result<&mut Symbol, SolidError> {
        self.symbols
            .get_mut(id)
            .ok_or_else(|| SolidError::internal(format!("unknown symbol #{id}"), span))
    }

    // ==================== Types ====================

    pub fn lattice(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    pub fn is_subtype(&mut self, a: &SolidType, b: &SolidType) -> bool {
        self.lattice.is_subtype(a, b)
    }

    /// Whether values of `ty` are represented as f64
    pub fn is_float(&mut self, ty: &SolidType) -> bool {
        *ty != SolidType::Never && self.lattice.is_subtype(ty, &SolidType::Float)
    }

    /// Expand aliases at the top of `ty`
    pub fn resolve(&self, ty: &SolidType) -> SolidType {
        self.lattice.resolve(ty)
    }

    // ==================== Diagnostics ====================

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticsCollector {
        &mut self.diagnostics
    }

    pub fn note(&mut self, reason: DiagnosticReason, span: &Span) {
        self.diagnostics.emit(Diagnostic::new(reason).with_location(span));
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(SolidConfig::default())
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut v = validator();
        v.declare(SymbolKind::Variable, "x", Span::empty(), false).unwrap();
        let err = v
            .declare(SymbolKind::TypeAlias, "x", Span::empty(), false)
            .unwrap_err();
        assert_eq!(err.code(), 2201);
    }

    #[test]
    fn test_reference_errors() {
        let mut v = validator();
        let id = v.declare(SymbolKind::Variable, "x", Span::empty(), false).unwrap();

        let dead = v.check_reference("x", SymbolKind::Variable, Span::empty());
        assert_eq!(dead.unwrap_err().code(), 2102);

        v.mark_readable(id);
        assert_eq!(v.check_reference("x", SymbolKind::Variable, Span::empty()).unwrap(), id);
        assert_eq!(
            v.check_reference("x", SymbolKind::TypeAlias, Span::empty())
                .unwrap_err()
                .code(),
            2103
        );
        assert_eq!(
            v.check_reference("y", SymbolKind::Variable, Span::empty())
                .unwrap_err()
                .code(),
            2101
        );
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut v = validator();
        let a = v.declare(SymbolKind::Variable, "a", Span::empty(), true).unwrap();
        let b = v.declare(SymbolKind::TypeAlias, "B", Span::empty(), false).unwrap();
        assert!(a < b);
        assert!(v.symbol(b, Span::empty()).unwrap().alias.is_some());
    }

    #[test]
    fn test_float_representation() {
        let mut v = validator();
        assert!(v.is_float(&SolidType::Float));
        assert!(!v.is_float(&SolidType::Integer));
        assert!(!v.is_float(&SolidType::Never));
        assert!(!v.is_float(&SolidType::Integer.union(&SolidType::Float)));
    }
}
