//! Statement nodes and the [`Goal`] that drives the passes

use std::cell::Cell;

use solid_parser::Span;

use super::expr::constant_instruction;
use super::{Expression, ExpressionKind, TypeExpression};
use crate::builder::{Builder, Instruction, Slot};
use crate::diagnostics::DiagnosticReason;
use crate::error::{
    AssignmentError, MutabilityError, SolidError, TypeError, UnsupportedFeature,
    UnsupportedFeatureKind, VoidError,
};
use crate::types::SolidType;
use crate::validator::{SymbolKind, Validator};
use crate::value::Value;

/// `let [unfixed] name: T = value;`
#[derive(Debug)]
pub struct DeclarationVariable {
    pub name: String,
    pub name_span: Span,
    pub unfixed: bool,
    pub declared: TypeExpression,
    pub value: Expression,
    pub span: Span,
    symbol: Cell<Option<usize>>,
    coerced: Cell<bool>,
}

/// `type Name = T;`
#[derive(Debug)]
pub struct DeclarationType {
    pub name: String,
    pub name_span: Span,
    pub value: TypeExpression,
    pub span: Span,
    symbol: Cell<Option<usize>>,
}

/// `target = value;` where the target is a variable or an access
#[derive(Debug)]
pub struct Assignment {
    pub target: Expression,
    pub value: Expression,
    pub span: Span,
    coerced: Cell<bool>,
}

#[derive(Debug)]
pub enum Statement {
    Empty(Span),
    Expression(Expression),
    Variable(DeclarationVariable),
    Type(DeclarationType),
    Assignment(Assignment),
}

/// A whole program
#[derive(Debug)]
pub struct Goal {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl DeclarationVariable {
    pub fn new(
        name: String,
        name_span: Span,
        unfixed: bool,
        declared: TypeExpression,
        value: Expression,
        span: Span,
    ) -> Self {
        Self {
            name,
            name_span,
            unfixed,
            declared,
            value,
            span,
            symbol: Cell::new(None),
            coerced: Cell::new(false),
        }
    }

    fn id(&self) -> Result<usize, SolidError> {
        self.symbol.get().ok_or_else(|| {
            SolidError::internal(format!("`{}` was never declared", self.name), self.name_span)
        })
    }

    fn type_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        let declared = self.declared.evaluate(v)?;
        if v.is_subtype(&SolidType::Void, &declared) {
            return Err(VoidError::new(self.declared.span).into());
        }

        let actual = self.value.type_check(v)?;
        let coerced = narrows(v, &actual, &declared, self.value.span)?;
        self.coerced.set(coerced);

        let value = if self.unfixed {
            None
        } else {
            self.value.assess(v)?.map(|value| match value {
                Value::Integer(i) if coerced => Value::Float(f64::from(i)),
                other => other,
            })
        };

        let symbol = v.symbol_mut(self.id()?, self.name_span)?;
        symbol.ty = Some(declared);
        symbol.value = value;
        Ok(())
    }

    fn build(&self, v: &mut Validator, b: &mut Builder) -> Result<Instruction, SolidError> {
        let id = self.id()?;
        let symbol = v.symbol(id, self.name_span)?;
        if let Some(value) = &symbol.value {
            if matches!(
                value,
                Value::Null | Value::Boolean(_) | Value::Integer(_) | Value::Float(_)
            ) {
                let init = constant_instruction(value, self.value.span)?;
                b.declare_global(id, init);
                return Ok(Instruction::Nop);
            }
        }

        let declared = symbol.ty.clone().ok_or_else(|| {
            SolidError::internal(format!("`{}` has no type", self.name), self.name_span)
        })?;
        let float = representation(v, &declared, self.declared.span)?;
        let name = b.declare_local(id, float);
        let value = self.value.build(v, b)?.coerce(float || self.coerced.get());
        Ok(Instruction::LocalSet {
            name,
            value: Box::new(value),
        })
    }
}

impl DeclarationType {
    pub fn new(name: String, name_span: Span, value: TypeExpression, span: Span) -> Self {
        Self {
            name,
            name_span,
            value,
            span,
            symbol: Cell::new(None),
        }
    }

    fn type_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        let id = self.symbol.get().ok_or_else(|| {
            SolidError::internal(format!("type `{}` was never declared", self.name), self.name_span)
        })?;
        let alias = v.symbol(id, self.name_span)?.alias.ok_or_else(|| {
            SolidError::internal(format!("`{}` has no alias slot", self.name), self.name_span)
        })?;
        let definition = self.value.evaluate(v)?;
        if definition.mentions_alias(alias) {
            v.note(DiagnosticReason::RecursiveAlias(self.name.clone()), &self.span);
        }
        v.lattice().define_alias(alias, definition);
        Ok(())
    }
}

impl Assignment {
    pub fn new(target: Expression, value: Expression, span: Span) -> Self {
        Self {
            target,
            value,
            span,
            coerced: Cell::new(false),
        }
    }

    fn type_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        let target_ty = match &self.target.kind {
            ExpressionKind::Variable { name, symbol } => {
                let id = symbol.get().ok_or_else(|| {
                    SolidError::internal(format!("`{name}` used before name resolution"), self.target.span)
                })?;
                let symbol = v.symbol(id, self.target.span)?;
                if !symbol.unfixed {
                    return Err(AssignmentError::reassignment(name, self.target.span).into());
                }
                symbol.ty.clone().ok_or_else(|| {
                    SolidError::internal(format!("`{name}` has no type"), self.target.span)
                })?
            }
            ExpressionKind::Access { base, .. } => {
                let base_ty = base.type_check(v)?;
                let resolved = v.resolve(&base_ty);
                let mutable = match &resolved {
                    SolidType::Union(members) => members
                        .iter()
                        .all(|m| v.resolve(m).is_mutable() || *m == SolidType::null()),
                    other => other.is_mutable(),
                };
                if !mutable {
                    return Err(MutabilityError::new(base_ty, base.span).into());
                }
                self.target.type_check(v)?
            }
            _ => {
                return Err(SolidError::internal(
                    "assignment target is neither a variable nor an access",
                    self.target.span,
                ))
            }
        };

        let actual = self.value.type_check(v)?;
        self.coerced
            .set(narrows(v, &actual, &target_ty, self.value.span)?);
        Ok(())
    }

    fn build(&self, v: &mut Validator, b: &mut Builder) -> Result<Instruction, SolidError> {
        let Some(id) = self.target.symbol() else {
            return Err(UnsupportedFeature::new(
                UnsupportedFeatureKind::Lowering("assignment to members".to_string()),
                self.target.span,
            )
            .into());
        };
        let value = self.value.build(v, b)?;
        match b.slot(id).cloned() {
            Some(Slot::Local { name, float }) => Ok(Instruction::LocalSet {
                name,
                value: Box::new(value.coerce(float || self.coerced.get())),
            }),
            Some(Slot::Global { name, float }) => Ok(Instruction::GlobalSet {
                name,
                value: Box::new(value.coerce(float)),
            }),
            None => Err(SolidError::internal(
                "assignment to a variable without storage",
                self.target.span,
            )),
        }
    }
}

/// Check `actual ⊑ expected`, falling back to int → float coercion.
/// Returns whether the value has to be converted.
fn narrows(
    v: &mut Validator,
    actual: &SolidType,
    expected: &SolidType,
    span: Span,
) -> Result<bool, SolidError> {
    if v.is_subtype(actual, expected) {
        return Ok(false);
    }
    if v.int_coercion()
        && *actual != SolidType::Never
        && v.is_subtype(actual, &SolidType::Integer)
        && v.is_subtype(&SolidType::Float, expected)
    {
        v.note(DiagnosticReason::CoercionInserted, &span);
        return Ok(true);
    }
    Err(TypeError::not_narrow(actual, expected, span).into())
}

/// Whether a variable of type `ty` lives in an f64 local. Types outside
/// `null | bool | int | float` have no local representation.
fn representation(v: &mut Validator, ty: &SolidType, span: Span) -> Result<bool, SolidError> {
    if v.is_float(ty) {
        return Ok(true);
    }
    let i32_like = SolidType::union_all([SolidType::null(), SolidType::Boolean, SolidType::Integer]);
    if v.is_subtype(ty, &i32_like) {
        return Ok(false);
    }
    Err(UnsupportedFeature::new(
        UnsupportedFeatureKind::Lowering(format!("variables of type `{ty}`")),
        span,
    )
    .into())
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Empty(span) => *span,
            Statement::Expression(e) => e.span,
            Statement::Variable(d) => d.span,
            Statement::Type(d) => d.span,
            Statement::Assignment(a) => a.span,
        }
    }

    /// Register the declared name before any statement is checked
    fn hoist(&self, v: &mut Validator) -> Result<(), SolidError> {
        match self {
            Statement::Variable(d) => {
                let id = v.declare(SymbolKind::Variable, &d.name, d.name_span, d.unfixed)?;
                d.symbol.set(Some(id));
            }
            Statement::Type(d) => {
                let id = v.declare(SymbolKind::TypeAlias, &d.name, d.name_span, false)?;
                d.symbol.set(Some(id));
            }
            _ => {}
        }
        Ok(())
    }

    pub fn var_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        match self {
            Statement::Empty(_) => Ok(()),
            Statement::Expression(e) => e.var_check(v),
            Statement::Variable(d) => {
                d.declared.var_check(v)?;
                d.value.var_check(v)?;
                v.mark_readable(d.id()?);
                Ok(())
            }
            Statement::Type(d) => {
                if let Some(id) = d.symbol.get() {
                    v.mark_readable(id);
                }
                d.value.var_check(v)
            }
            Statement::Assignment(a) => {
                a.target.var_check(v)?;
                a.value.var_check(v)
            }
        }
    }

    pub fn type_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        match self {
            Statement::Empty(_) => Ok(()),
            Statement::Expression(e) => e.type_check(v).map(|_| ()),
            Statement::Variable(d) => d.type_check(v),
            Statement::Type(d) => d.type_check(v),
            Statement::Assignment(a) => a.type_check(v),
        }
    }

    pub fn build(&self, v: &mut Validator, b: &mut Builder) -> Result<Instruction, SolidError> {
        match self {
            Statement::Empty(_) | Statement::Type(_) => Ok(Instruction::Nop),
            Statement::Expression(e) => Ok(Instruction::Drop(Box::new(e.build(v, b)?))),
            Statement::Variable(d) => d.build(v, b),
            Statement::Assignment(a) => a.build(v, b),
        }
    }
}

impl Goal {
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }

    /// Hoist every declaration, then resolve names statement by statement
    pub fn var_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        for statement in &self.statements {
            statement.hoist(v)?;
        }
        self.statements.iter().try_for_each(|s| s.var_check(v))
    }

    /// Alias definitions first so every annotation sees them, then the
    /// remaining statements in order
    pub fn type_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        let (aliases, rest): (Vec<_>, Vec<_>) = self
            .statements
            .iter()
            .partition(|s| matches!(s, Statement::Type(_)));
        aliases
            .into_iter()
            .chain(rest)
            .try_for_each(|s| s.type_check(v))
    }

    pub fn build(&self, v: &mut Validator, b: &mut Builder) -> Result<(), SolidError> {
        for statement in &self.statements {
            let index = b.next_statement();
            let body = statement.build(v, b)?;
            b.push_statement(Instruction::Statement {
                index,
                body: Box::new(body),
            });
        }
        Ok(())
    }
}
