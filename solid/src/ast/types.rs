//! Type expressions: the annotations of declarations and the values of
//! type aliases

use std::cell::Cell;
use std::collections::BTreeMap;

use solid_parser::Span;

use super::Memo;
use crate::error::{AssignmentError, SolidError, TypeError, TypeErrorKind};
use crate::types::{SolidType, TypeEntry};
use crate::validator::{SymbolKind, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOperator {
    Union,
    Intersection,
}

/// One item of a tuple type or one field of a record type
#[derive(Debug)]
pub struct TypeEntryExpression {
    /// Field name and its span; `None` for tuple items
    pub key: Option<(String, Span)>,
    pub value: TypeExpression,
    pub optional: bool,
}

#[derive(Debug)]
pub enum TypeExpressionKind {
    /// Keyword and literal types
    Constant(SolidType),
    Alias {
        name: String,
        symbol: Cell<Option<usize>>,
    },
    Tuple(Vec<TypeEntryExpression>),
    Record(Vec<TypeEntryExpression>),
    Dict(Box<TypeExpression>),
    Map(Box<TypeExpression>, Box<TypeExpression>),
    List(Box<TypeExpression>),
    /// `T[n]`
    Repeat(Box<TypeExpression>, usize),
    Set(Box<TypeExpression>),
    Nullable(Box<TypeExpression>),
    Mutable(Box<TypeExpression>),
    Operation(TypeOperator, Box<TypeExpression>, Box<TypeExpression>),
}

#[derive(Debug)]
pub struct TypeExpression {
    pub kind: TypeExpressionKind,
    pub span: Span,
    var_check: Memo<()>,
    evaluated: Memo<SolidType>,
}

impl TypeExpression {
    pub fn new(kind: TypeExpressionKind, span: Span) -> Self {
        Self {
            kind,
            span,
            var_check: Memo::new(),
            evaluated: Memo::new(),
        }
    }

    pub fn constant(ty: SolidType, span: Span) -> Self {
        Self::new(TypeExpressionKind::Constant(ty), span)
    }

    fn children(&self) -> Vec<&TypeExpression> {
        use TypeExpressionKind as K;
        match &self.kind {
            K::Constant(_) | K::Alias { .. } => Vec::new(),
            K::Tuple(entries) | K::Record(entries) => entries.iter().map(|e| &e.value).collect(),
            K::Map(key, value) | K::Operation(_, key, value) => vec![key.as_ref(), value.as_ref()],
            K::Dict(inner)
            | K::List(inner)
            | K::Repeat(inner, _)
            | K::Set(inner)
            | K::Nullable(inner)
            | K::Mutable(inner) => vec![inner.as_ref()],
        }
    }

    pub fn var_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        self.var_check.get_or_compute("var_check", self.span, || {
            if let TypeExpressionKind::Alias { name, symbol } = &self.kind {
                symbol.set(Some(v.check_reference(name, SymbolKind::TypeAlias, self.span)?));
            }
            self.children().into_iter().try_for_each(|c| c.var_check(v))
        })
    }

    /// The type this expression denotes
    pub fn evaluate(&self, v: &mut Validator) -> Result<SolidType, SolidError> {
        self.evaluated
            .get_or_compute("type_check", self.span, || self.compute(v))
    }

    fn compute(&self, v: &mut Validator) -> Result<SolidType, SolidError> {
        use TypeExpressionKind as K;

        Ok(match &self.kind {
            K::Constant(ty) => ty.clone(),
            K::Alias { name, symbol } => {
                let id = symbol.get().ok_or_else(|| {
                    SolidError::internal(format!("type `{name}` used before name resolution"), self.span)
                })?;
                let alias = v.symbol(id, self.span)?.alias.ok_or_else(|| {
                    SolidError::internal(format!("`{name}` has no alias slot"), self.span)
                })?;
                SolidType::Alias {
                    id: alias,
                    name: name.clone(),
                }
            }
            K::Tuple(entries) => SolidType::tuple(
                entries
                    .iter()
                    .map(|e| {
                        Ok(TypeEntry {
                            ty: e.value.evaluate(v)?,
                            optional: e.optional,
                        })
                    })
                    .collect::<Result<_, SolidError>>()?,
            ),
            K::Record(entries) => {
                let mut fields = BTreeMap::new();
                for entry in entries {
                    let Some((key, key_span)) = &entry.key else {
                        return Err(SolidError::internal("record field without a key", self.span));
                    };
                    if fields.contains_key(key) {
                        return Err(AssignmentError::duplicate_key(key, *key_span).into());
                    }
                    let ty = entry.value.evaluate(v)?;
                    fields.insert(
                        key.clone(),
                        TypeEntry {
                            ty,
                            optional: entry.optional,
                        },
                    );
                }
                SolidType::record(fields)
            }
            K::Dict(inner) => SolidType::dict(inner.evaluate(v)?),
            K::List(inner) => SolidType::list(inner.evaluate(v)?),
            K::Repeat(inner, count) => {
                let ty = inner.evaluate(v)?;
                SolidType::tuple(vec![TypeEntry::required(ty); *count])
            }
            K::Set(inner) => SolidType::set(expect_value_type(inner, v)?),
            K::Map(key, value) => {
                SolidType::map(expect_value_type(key, v)?, value.evaluate(v)?)
            }
            K::Nullable(inner) => inner.evaluate(v)?.nullable(),
            K::Mutable(inner) => {
                let ty = inner.evaluate(v)?;
                v.resolve(&ty).to_mutable().ok_or_else(|| {
                    TypeError::invalid_operation(
                        format!("`mutable` requires a collection type, found `{ty}`"),
                        self.span,
                    )
                })?
            }
            K::Operation(op, left, right) => {
                let (l, r) = (left.evaluate(v)?, right.evaluate(v)?);
                match op {
                    TypeOperator::Union => l.union(&r),
                    TypeOperator::Intersection => l.intersect(&r),
                }
            }
        })
    }
}

/// Set elements and map keys are compared by content, so they must be
/// value types
pub(crate) fn check_value_type(
    v: &mut Validator,
    ty: &SolidType,
    span: Span,
) -> Result<(), SolidError> {
    if v.is_subtype(ty, &SolidType::value_type()) {
        Ok(())
    } else {
        Err(TypeError::new(
            TypeErrorKind::UnexpectedReference,
            format!("`{ty}` is not a value type"),
            span,
        )
        .into())
    }
}

fn expect_value_type(node: &TypeExpression, v: &mut Validator) -> Result<SolidType, SolidError> {
    let ty = node.evaluate(v)?;
    check_value_type(v, &ty, node.span)?;
    Ok(ty)
}
