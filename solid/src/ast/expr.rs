//! Expression nodes

use std::cell::Cell;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use solid_parser::Span;

use super::types::check_value_type;
use super::{BinaryOperator, Memo, OperatorCategory, TypeExpression, UnaryOperator};
use crate::builder::{
    ArithmeticOp, Builder, ComparisonOp, Instruction, LogicalOp, RepresentationMismatch, UnaryOp,
};
use crate::diagnostics::DiagnosticReason;
use crate::error::{
    AssignmentError, NanError, NanErrorKind, SolidError, TypeError, TypeErrorKind,
    UnsupportedFeature, UnsupportedFeatureKind,
};
use crate::types::{Scalar, SolidType, TypeEntry};
use crate::validator::{SymbolKind, Validator};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// `.`
    Plain,
    /// `?.`: null base gives null
    Optional,
    /// `!.`: the base is claimed non-null
    Claim,
}

#[derive(Debug)]
pub enum Accessor {
    /// `.0`
    Index(i32),
    /// `.name`
    Property(String),
    /// `.[expr]`
    Computed(Box<Expression>),
}

#[derive(Debug)]
pub enum Collection {
    Tuple(Vec<Expression>),
    /// Fields in source order, with the span of each key
    Record(Vec<(String, Span, Expression)>),
    Set(Vec<Expression>),
    Map(Vec<(Expression, Expression)>),
}

#[derive(Debug)]
pub enum ExpressionKind {
    Constant(Value),
    Variable {
        name: String,
        symbol: Cell<Option<usize>>,
    },
    Collection(Collection),
    Access {
        base: Box<Expression>,
        mode: AccessMode,
        accessor: Accessor,
    },
    Call {
        callee: Box<Expression>,
        generics: Vec<TypeExpression>,
        arguments: Vec<Expression>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Conditional {
        condition: Box<Expression>,
        consequence: Box<Expression>,
        alternative: Box<Expression>,
    },
}

#[derive(Debug, Default)]
struct ExpressionMemos {
    var_check: Memo<()>,
    type_check: Memo<SolidType>,
    assess: Memo<Option<Value>>,
    build: Memo<Instruction>,
}

#[derive(Debug)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
    memos: ExpressionMemos,
}

/// Built-in collection constructors, the only callable values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Constructor {
    List,
    Dict,
    Set,
    Map,
}

impl Constructor {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "List" => Constructor::List,
            "Dict" => Constructor::Dict,
            "Set" => Constructor::Set,
            "Map" => Constructor::Map,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Constructor::List => "List",
            Constructor::Dict => "Dict",
            Constructor::Set => "Set",
            Constructor::Map => "Map",
        }
    }
}

fn unsupported(what: &str, span: Span) -> SolidError {
    UnsupportedFeature::new(UnsupportedFeatureKind::Lowering(what.to_string()), span).into()
}

fn lowered(
    instruction: Result<Instruction, RepresentationMismatch>,
    span: Span,
) -> Result<Instruction, SolidError> {
    instruction.map_err(|e| SolidError::internal(e.to_string(), span))
}

/// Instruction producing a compile-time value
pub(crate) fn constant_instruction(value: &Value, span: Span) -> Result<Instruction, SolidError> {
    Ok(match value {
        Value::Null => Instruction::ConstInt(0),
        Value::Boolean(b) => Instruction::ConstInt(i32::from(*b)),
        Value::Integer(i) => Instruction::ConstInt(*i),
        Value::Float(x) => Instruction::ConstFloat(*x),
        Value::Tuple(items) => Instruction::TupleMake(
            items
                .iter()
                .map(|item| constant_instruction(item, span))
                .collect::<Result<_, _>>()?,
        ),
        Value::Record(fields) => Instruction::TupleMake(
            fields
                .values()
                .map(|item| constant_instruction(item, span))
                .collect::<Result<_, _>>()?,
        ),
        Value::String(_) => return Err(unsupported("string values", span)),
        Value::List(_) | Value::Dict(_) | Value::Set(_) | Value::Map(_) => {
            return Err(unsupported("constant collections", span))
        }
    })
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self {
            kind,
            span,
            memos: ExpressionMemos::default(),
        }
    }

    pub fn constant(value: Value, span: Span) -> Self {
        Self::new(ExpressionKind::Constant(value), span)
    }

    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExpressionKind::Variable {
                name: name.into(),
                symbol: Cell::new(None),
            },
            span,
        )
    }

    /// The symbol a variable node resolved to during `var_check`
    pub fn symbol(&self) -> Option<usize> {
        match &self.kind {
            ExpressionKind::Variable { symbol, .. } => symbol.get(),
            _ => None,
        }
    }

    fn children(&self) -> Vec<&Expression> {
        use ExpressionKind as K;
        match &self.kind {
            K::Constant(_) | K::Variable { .. } => Vec::new(),
            K::Collection(Collection::Tuple(items) | Collection::Set(items)) => {
                items.iter().collect()
            }
            K::Collection(Collection::Record(fields)) => fields.iter().map(|f| &f.2).collect(),
            K::Collection(Collection::Map(entries)) => {
                entries.iter().flat_map(|(k, v)| [k, v]).collect()
            }
            K::Access { base, accessor, .. } => match accessor {
                Accessor::Computed(index) => vec![base.as_ref(), index.as_ref()],
                _ => vec![base.as_ref()],
            },
            K::Call {
                callee, arguments, ..
            } => std::iter::once(callee.as_ref()).chain(arguments).collect(),
            K::Unary { operand, .. } => vec![operand.as_ref()],
            K::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            K::Conditional {
                condition,
                consequence,
                alternative,
            } => vec![condition.as_ref(), consequence.as_ref(), alternative.as_ref()],
        }
    }

    /// A constructor name the program has not shadowed
    fn constructor(&self, v: &Validator) -> Option<Constructor> {
        match &self.kind {
            ExpressionKind::Variable { name, .. } if !v.is_declared(name) => {
                Constructor::from_name(name)
            }
            _ => None,
        }
    }

    // ==================== var_check ====================

    pub fn var_check(&self, v: &mut Validator) -> Result<(), SolidError> {
        self.memos.var_check.get_or_compute("var_check", self.span, || {
            match &self.kind {
                ExpressionKind::Variable { name, symbol } => {
                    symbol.set(Some(v.check_reference(
                        name,
                        SymbolKind::Variable,
                        self.span,
                    )?));
                    Ok(())
                }
                ExpressionKind::Call {
                    callee,
                    generics,
                    arguments,
                } => {
                    if callee.constructor(v).is_none() {
                        callee.var_check(v)?;
                    }
                    generics.iter().try_for_each(|g| g.var_check(v))?;
                    arguments.iter().try_for_each(|a| a.var_check(v))
                }
                _ => self.children().into_iter().try_for_each(|c| c.var_check(v)),
            }
        })
    }

    // ==================== type_check ====================

    /// Type of the expression. Folding replaces it with the type of the
    /// assessed value.
    pub fn type_check(&self, v: &mut Validator) -> Result<SolidType, SolidError> {
        self.memos.type_check.get_or_compute("type_check", self.span, || {
            let ty = self.compute_type(v)?;
            let value = self.assess(v)?;
            match value {
                Some(value) if v.constant_folding() => {
                    if !matches!(self.kind, ExpressionKind::Constant(_)) {
                        v.note(DiagnosticReason::ConstantFolded(value.to_string()), &self.span);
                    }
                    Ok(value.to_type())
                }
                _ => Ok(ty),
            }
        })
    }

    fn compute_type(&self, v: &mut Validator) -> Result<SolidType, SolidError> {
        use ExpressionKind as K;

        match &self.kind {
            K::Constant(value) => Ok(value.to_type()),
            K::Variable { name, symbol } => {
                let id = symbol.get().ok_or_else(|| {
                    SolidError::internal(format!("`{name}` used before name resolution"), self.span)
                })?;
                v.symbol(id, self.span)?.ty.clone().ok_or_else(|| {
                    SolidError::internal(format!("`{name}` read before its type is known"), self.span)
                })
            }
            K::Collection(collection) => self.collection_type(v, collection),
            K::Access {
                base,
                mode,
                accessor,
            } => self.access_type(v, base, *mode, accessor),
            K::Call {
                callee,
                generics,
                arguments,
            } => self.call_type(v, callee, generics, arguments),
            K::Unary { op, operand } => {
                let ty = operand.type_check(v)?;
                match op {
                    UnaryOperator::Not | UnaryOperator::Emptiness => Ok(SolidType::Boolean),
                    UnaryOperator::Plus | UnaryOperator::Minus => {
                        if v.is_subtype(&ty, &SolidType::Integer) {
                            Ok(SolidType::Integer)
                        } else if v.is_subtype(&ty, &SolidType::Float) {
                            Ok(SolidType::Float)
                        } else {
                            Err(TypeError::invalid_operation(
                                format!("unary `{}` cannot be applied to `{ty}`", op.text()),
                                self.span,
                            )
                            .into())
                        }
                    }
                }
            }
            K::Binary { op, left, right } => self.binary_type(v, *op, left, right),
            K::Conditional {
                condition,
                consequence,
                alternative,
            } => {
                let test = condition.type_check(v)?;
                if !v.is_subtype(&test, &SolidType::Boolean) {
                    return Err(TypeError::not_narrow(&test, SolidType::Boolean, condition.span).into());
                }
                let (a, b) = (consequence.type_check(v)?, alternative.type_check(v)?);
                if v.is_float(&a) != v.is_float(&b) {
                    return Err(TypeError::invalid_operation(
                        format!("branches of types `{a}` and `{b}` have different representations"),
                        self.span,
                    )
                    .into());
                }
                Ok(a.union(&b))
            }
        }
    }

    fn collection_type(
        &self,
        v: &mut Validator,
        collection: &Collection,
    ) -> Result<SolidType, SolidError> {
        Ok(match collection {
            Collection::Tuple(items) => SolidType::tuple(
                items
                    .iter()
                    .map(|item| Ok(TypeEntry::required(item.type_check(v)?)))
                    .collect::<Result<_, SolidError>>()?,
            ),
            Collection::Record(fields) => {
                let mut types = BTreeMap::new();
                for (key, key_span, value) in fields {
                    if types.contains_key(key) {
                        return Err(AssignmentError::duplicate_key(key, *key_span).into());
                    }
                    let ty = value.type_check(v)?;
                    types.insert(key.clone(), TypeEntry::required(ty));
                }
                SolidType::record(types)
            }
            Collection::Set(elements) => {
                let mut union = SolidType::Never;
                for element in elements {
                    let ty = element.type_check(v)?;
                    check_value_type(v, &ty, element.span)?;
                    union = union.union(&ty);
                }
                SolidType::set(union)
            }
            Collection::Map(entries) => {
                let (mut keys, mut values) = (SolidType::Never, SolidType::Never);
                for (key, value) in entries {
                    let key_ty = key.type_check(v)?;
                    check_value_type(v, &key_ty, key.span)?;
                    keys = keys.union(&key_ty);
                    values = values.union(&value.type_check(v)?);
                }
                SolidType::map(keys, values)
            }
        })
    }

    fn binary_type(
        &self,
        v: &mut Validator,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> Result<SolidType, SolidError> {
        let (l, r) = (left.type_check(v)?, right.type_check(v)?);
        let invalid = || -> SolidError {
            TypeError::invalid_operation(
                format!("`{}` cannot be applied to `{l}` and `{r}`", op.text()),
                self.span,
            )
            .into()
        };

        match op.category() {
            OperatorCategory::Arithmetic | OperatorCategory::Comparative => {
                let l_int = v.is_subtype(&l, &SolidType::Integer);
                let r_int = v.is_subtype(&r, &SolidType::Integer);
                let numeric = if l_int && r_int {
                    SolidType::Integer
                } else {
                    let l_float = v.is_subtype(&l, &SolidType::Float);
                    let r_float = v.is_subtype(&r, &SolidType::Float);
                    if !(l_int || l_float) || !(r_int || r_float) {
                        return Err(invalid());
                    }
                    if l_int || r_int {
                        if !v.int_coercion() {
                            return Err(invalid());
                        }
                        v.note(DiagnosticReason::CoercionInserted, &self.span);
                    }
                    SolidType::Float
                };
                Ok(match op.category() {
                    OperatorCategory::Comparative => SolidType::Boolean,
                    _ => numeric,
                })
            }
            OperatorCategory::Equality => {
                let negated = matches!(op, BinaryOperator::Isnt | BinaryOperator::Neq);
                Ok(if never_equal(v, &l, &r) {
                    SolidType::boolean_unit(negated)
                } else {
                    SolidType::Boolean
                })
            }
            OperatorCategory::Logical => {
                if v.is_float(&l) != v.is_float(&r) {
                    return Err(invalid());
                }
                Ok(match op {
                    BinaryOperator::And => v.resolve(&l).intersect(&SolidType::falsy()).union(&r),
                    BinaryOperator::Or => v.resolve(&l).subtract(&SolidType::falsy()).union(&r),
                    _ => SolidType::Boolean,
                })
            }
        }
    }

    fn access_type(
        &self,
        v: &mut Validator,
        base: &Expression,
        mode: AccessMode,
        accessor: &Accessor,
    ) -> Result<SolidType, SolidError> {
        let declared = base.type_check(v)?;
        let base_ty = v.resolve(&declared);
        let nullable = v.lattice().includes(&base_ty, &Value::Null);

        let target = match mode {
            AccessMode::Plain if nullable => {
                return Err(TypeError::invalid_operation(
                    format!("`{base_ty}` may be null; use `?.` or `!.`"),
                    self.span,
                )
                .into());
            }
            AccessMode::Plain => base_ty,
            AccessMode::Optional | AccessMode::Claim => {
                v.resolve(&base_ty.subtract(&SolidType::null()))
            }
        };

        let member = self.member_type(v, &target, accessor)?;
        Ok(match mode {
            AccessMode::Optional => member.nullable(),
            _ => member,
        })
    }

    fn member_type(
        &self,
        v: &mut Validator,
        ty: &SolidType,
        accessor: &Accessor,
    ) -> Result<SolidType, SolidError> {
        let no_member = || -> SolidError {
            TypeError::invalid_operation(format!("`{ty}` has no such member"), self.span).into()
        };
        let entry_type = |entry: &TypeEntry| {
            if entry.optional {
                entry.ty.clone().nullable()
            } else {
                entry.ty.clone()
            }
        };
        let computed_type = |v: &mut Validator| match accessor {
            Accessor::Computed(index) => index.type_check(v).map(Some),
            _ => Ok(None),
        };

        match ty {
            // members of a resolved union are neither aliases nor unions
            SolidType::Union(members) => {
                let mut union = SolidType::Never;
                for member in members {
                    union = union.union(&self.member_type(v, member, accessor)?);
                }
                Ok(union)
            }
            SolidType::Tuple { items, .. } => {
                let index = match (accessor, computed_type(v)?) {
                    (Accessor::Index(i), _) => Some(*i),
                    (_, Some(SolidType::Unit(Scalar::Integer(i)))) => Some(i),
                    (_, Some(t)) if v.is_subtype(&t, &SolidType::Integer) => None,
                    _ => return Err(no_member()),
                };
                let Some(index) = index else {
                    return Ok(SolidType::union_all(items.iter().map(entry_type)));
                };
                let len = items.len() as i64;
                let at = if index < 0 {
                    len + i64::from(index)
                } else {
                    i64::from(index)
                };
                match usize::try_from(at).ok().and_then(|at| items.get(at)) {
                    Some(entry) => Ok(entry_type(entry)),
                    None => Err(TypeError::new(
                        TypeErrorKind::IndexOutOfBounds,
                        format!("index {index} is out of bounds for `{ty}`"),
                        self.span,
                    )
                    .into()),
                }
            }
            SolidType::Record { fields, .. } => {
                let key = match (accessor, computed_type(v)?) {
                    (Accessor::Property(name), _) => Some(name.clone()),
                    (_, Some(SolidType::Unit(Scalar::String(s)))) => Some(s),
                    (_, Some(t)) if v.is_subtype(&t, &SolidType::String) => None,
                    _ => return Err(no_member()),
                };
                let Some(key) = key else {
                    return Ok(SolidType::union_all(fields.values().map(entry_type)));
                };
                fields.get(&key).map(entry_type).ok_or_else(|| {
                    TypeError::new(
                        TypeErrorKind::PropertyDoesNotExist,
                        format!("property `{key}` does not exist on `{ty}`"),
                        self.span,
                    )
                    .into()
                })
            }
            SolidType::List { item, .. } => match (accessor, computed_type(v)?) {
                (Accessor::Index(_), _) => Ok(item.as_ref().clone()),
                (_, Some(t)) if v.is_subtype(&t, &SolidType::Integer) => Ok(item.as_ref().clone()),
                _ => Err(no_member()),
            },
            SolidType::Dict { item, .. } => match (accessor, computed_type(v)?) {
                (Accessor::Property(_), _) => Ok(item.as_ref().clone()),
                (_, Some(t)) if v.is_subtype(&t, &SolidType::String) => Ok(item.as_ref().clone()),
                _ => Err(no_member()),
            },
            SolidType::Map { key, value, .. } => match computed_type(v)? {
                Some(t) if v.is_subtype(&t, key) => Ok(value.as_ref().clone()),
                _ => Err(no_member()),
            },
            _ => Err(no_member()),
        }
    }

    fn call_type(
        &self,
        v: &mut Validator,
        callee: &Expression,
        generics: &[TypeExpression],
        arguments: &[Expression],
    ) -> Result<SolidType, SolidError> {
        let Some(ctor) = callee.constructor(v) else {
            let ty = callee.type_check(v)?;
            return Err(TypeError::new(
                TypeErrorKind::NotCallable,
                format!("`{ty}` is not callable"),
                callee.span,
            )
            .into());
        };

        let params = generics
            .iter()
            .map(|g| g.evaluate(v))
            .collect::<Result<Vec<_>, _>>()?;
        let wrong_arity = |message: String| -> SolidError {
            TypeError::new(TypeErrorKind::WrongArity, message, self.span).into()
        };
        let expected = if ctor == Constructor::Map { 2 } else { 1 };
        if params.len() != expected {
            return Err(wrong_arity(format!(
                "`{}` expects {expected} type argument(s), found {}",
                ctor.name(),
                params.len()
            )));
        }
        if arguments.len() > 1 {
            return Err(wrong_arity(format!(
                "`{}` takes at most one argument, found {}",
                ctor.name(),
                arguments.len()
            )));
        }

        let result = match (ctor, params.as_slice()) {
            (Constructor::List, [t]) => SolidType::list(t.clone()),
            (Constructor::Dict, [t]) => SolidType::dict(t.clone()),
            (Constructor::Set, [t]) => {
                check_value_type(v, t, generics[0].span)?;
                SolidType::set(t.clone())
            }
            (Constructor::Map, [k, val]) => {
                check_value_type(v, k, generics[0].span)?;
                SolidType::map(k.clone(), val.clone())
            }
            _ => return Err(SolidError::internal("constructor arity", self.span)),
        };

        if let Some(argument) = arguments.first() {
            let actual = argument.type_check(v)?;
            let resolved = v.resolve(&actual);
            let fits = match (ctor, &resolved, params.as_slice()) {
                (Constructor::List | Constructor::Set, SolidType::Tuple { items, .. }, [t]) => {
                    items.iter().all(|e| v.is_subtype(&e.ty, t))
                }
                (Constructor::Dict, SolidType::Record { fields, .. }, [t]) => {
                    fields.values().all(|e| v.is_subtype(&e.ty, t))
                }
                (Constructor::Map, SolidType::Tuple { items, .. }, [k, val]) => {
                    let pair = SolidType::tuple(vec![
                        TypeEntry::required(k.clone()),
                        TypeEntry::required(val.clone()),
                    ]);
                    items.iter().all(|e| v.is_subtype(&e.ty, &pair))
                }
                _ => false,
            };
            if !fits {
                let shape = match (ctor, params.as_slice()) {
                    (Constructor::Dict, [t]) => format!("[:{t}]"),
                    (Constructor::Map, [k, val]) => format!("[{k}, {val}][]"),
                    (_, [t]) => format!("{t}[]"),
                    _ => String::new(),
                };
                return Err(TypeError::not_narrow(&actual, shape, argument.span).into());
            }
        }

        result
            .to_mutable()
            .ok_or_else(|| SolidError::internal("constructor result is not a collection", self.span))
    }

    // ==================== assess ====================

    /// Compile-time value, if every input is known
    pub fn assess(&self, v: &mut Validator) -> Result<Option<Value>, SolidError> {
        self.memos
            .assess
            .get_or_compute("assess", self.span, || self.compute_value(v))
    }

    fn compute_value(&self, v: &mut Validator) -> Result<Option<Value>, SolidError> {
        use ExpressionKind as K;

        Ok(match &self.kind {
            K::Constant(value) => Some(value.clone()),
            K::Variable { symbol, .. } => match symbol.get() {
                Some(id) => {
                    let symbol = v.symbol(id, self.span)?;
                    if symbol.unfixed {
                        None
                    } else {
                        symbol.value.clone()
                    }
                }
                None => None,
            },
            K::Collection(collection) => self.collection_value(v, collection)?,
            K::Access {
                base,
                mode,
                accessor,
            } => {
                let Some(base) = base.assess(v)? else {
                    return Ok(None);
                };
                if matches!(base, Value::Null) {
                    return Ok((*mode == AccessMode::Optional).then_some(Value::Null));
                }
                let key = match accessor {
                    Accessor::Computed(index) => match index.assess(v)? {
                        Some(key) => Some(key),
                        None => return Ok(None),
                    },
                    _ => None,
                };
                member_value(&base, accessor, key.as_ref())
            }
            K::Call { .. } => None,
            K::Unary { op, operand } => operand
                .assess(v)?
                .and_then(|value| value.apply_unary(*op)),
            K::Binary { op, left, right } => {
                let Some(l) = left.assess(v)? else {
                    if *op == BinaryOperator::Div {
                        reject_zero_divisor(v, left, right)?;
                    }
                    return Ok(None);
                };
                let decided = match op {
                    BinaryOperator::And if l.is_falsy() => Some(l.clone()),
                    BinaryOperator::Or if !l.is_falsy() => Some(l.clone()),
                    BinaryOperator::Nand if l.is_falsy() => Some(Value::Boolean(true)),
                    BinaryOperator::Nor if !l.is_falsy() => Some(Value::Boolean(false)),
                    _ => None,
                };
                if decided.is_some() {
                    return Ok(decided);
                }
                let Some(r) = right.assess(v)? else {
                    return Ok(None);
                };
                l.apply_binary(*op, &r)
                    .map_err(|kind| NanError::new(kind, self.span))?
            }
            K::Conditional {
                condition,
                consequence,
                alternative,
            } => match condition.assess(v)? {
                Some(test) if test.is_falsy() => alternative.assess(v)?,
                Some(_) => consequence.assess(v)?,
                None => None,
            },
        })
    }

    fn collection_value(
        &self,
        v: &mut Validator,
        collection: &Collection,
    ) -> Result<Option<Value>, SolidError> {
        fn all(v: &mut Validator, items: &[Expression]) -> Result<Option<Vec<Value>>, SolidError> {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item.assess(v)? {
                    Some(value) => values.push(value),
                    None => return Ok(None),
                }
            }
            Ok(Some(values))
        }

        Ok(match collection {
            Collection::Tuple(items) => all(v, items)?.map(Value::tuple),
            Collection::Set(items) => all(v, items)?.map(Value::set),
            Collection::Record(fields) => {
                let mut values = IndexMap::new();
                for (key, _, value) in fields {
                    match value.assess(v)? {
                        Some(value) => values.insert(key.clone(), value),
                        None => return Ok(None),
                    };
                }
                Some(Value::record(values))
            }
            Collection::Map(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    match (key.assess(v)?, value.assess(v)?) {
                        (Some(k), Some(val)) => pairs.push((k, val)),
                        _ => return Ok(None),
                    }
                }
                Some(Value::map(pairs))
            }
        })
    }

    // ==================== build ====================

    pub fn build(&self, v: &mut Validator, b: &mut Builder) -> Result<Instruction, SolidError> {
        self.memos.build.get_or_compute("build", self.span, || {
            if v.constant_folding() {
                if let Some(value) = self.assess(v)? {
                    return constant_instruction(&value, self.span);
                }
            }
            self.compute_build(v, b)
        })
    }

    fn compute_build(&self, v: &mut Validator, b: &mut Builder) -> Result<Instruction, SolidError> {
        use ExpressionKind as K;

        match &self.kind {
            K::Constant(value) => constant_instruction(value, self.span),
            K::Variable { name, symbol } => {
                let id = symbol.get().ok_or_else(|| {
                    SolidError::internal(format!("`{name}` used before name resolution"), self.span)
                })?;
                b.read(id, self.span)
            }
            K::Collection(Collection::Tuple(items)) => Ok(Instruction::TupleMake(
                items
                    .iter()
                    .map(|item| item.build(v, b))
                    .collect::<Result<_, _>>()?,
            )),
            K::Collection(Collection::Record(fields)) => Ok(Instruction::TupleMake(
                fields
                    .iter()
                    .map(|(_, _, value)| value.build(v, b))
                    .collect::<Result<_, _>>()?,
            )),
            K::Collection(Collection::Set(_)) => Err(unsupported("set literals", self.span)),
            K::Collection(Collection::Map(_)) => Err(unsupported("map literals", self.span)),
            K::Access { .. } => Err(unsupported("member access", self.span)),
            K::Call { .. } => Err(unsupported("constructor calls", self.span)),
            K::Unary { op, operand } => {
                let operand = operand.build(v, b)?;
                Ok(match op {
                    UnaryOperator::Not | UnaryOperator::Emptiness => {
                        Instruction::unop(UnaryOp::Not, operand)
                    }
                    UnaryOperator::Plus => operand,
                    UnaryOperator::Minus => Instruction::unop(UnaryOp::Neg, operand),
                })
            }
            K::Binary { op, left, right } if op.category() == OperatorCategory::Equality => {
                self.build_equality(v, b, *op, left, right)
            }
            K::Binary { op, left, right } => {
                let (l, r) = (left.build(v, b)?, right.build(v, b)?);
                self.build_binary(b, *op, l, r)
            }
            K::Conditional {
                condition,
                consequence,
                alternative,
            } => {
                let condition = condition.build(v, b)?;
                let consequence = consequence.build(v, b)?;
                let alternative = alternative.build(v, b)?;
                lowered(Instruction::cond(condition, consequence, alternative), self.span)
            }
        }
    }

    /// Operands of types that can never compare equal were typed as a
    /// boolean unit. Otherwise each operand must have a single encoding,
    /// since `null`, booleans and ints all share i32.
    fn build_equality(
        &self,
        v: &mut Validator,
        b: &mut Builder,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> Result<Instruction, SolidError> {
        if let SolidType::Unit(Scalar::Boolean(decided)) = self.type_check(v)? {
            return Ok(Instruction::ConstInt(i32::from(decided)));
        }
        for operand in [left, right] {
            let ty = operand.type_check(v)?;
            if !has_one_encoding(v, &ty) {
                return Err(unsupported(
                    &format!("comparing values of type `{ty}`"),
                    operand.span,
                ));
            }
        }
        let (l, r) = (left.build(v, b)?, right.build(v, b)?);
        self.build_binary(b, op, l, r)
    }

    fn build_binary(
        &self,
        b: &mut Builder,
        op: BinaryOperator,
        l: Instruction,
        r: Instruction,
    ) -> Result<Instruction, SolidError> {
        use BinaryOperator as B;

        let float = l.is_float() || r.is_float();
        let instruction = match op {
            B::Exp | B::Mul | B::Div | B::Add | B::Sub => {
                let arithmetic = match op {
                    B::Exp => ArithmeticOp::Exp,
                    B::Mul => ArithmeticOp::Mul,
                    B::Div => ArithmeticOp::Div,
                    B::Add => ArithmeticOp::Add,
                    _ => ArithmeticOp::Sub,
                };
                Instruction::binop(arithmetic, l.coerce(float), r.coerce(float))
            }
            B::Lt | B::Gt | B::Le | B::Ge | B::Nlt | B::Ngt => {
                let comparison = match op {
                    B::Lt => ComparisonOp::Lt,
                    B::Gt => ComparisonOp::Gt,
                    B::Le => ComparisonOp::Le,
                    B::Ge => ComparisonOp::Ge,
                    B::Nlt => ComparisonOp::Nlt,
                    _ => ComparisonOp::Ngt,
                };
                Instruction::comparison(comparison, l.coerce(float), r.coerce(float))
            }
            B::Is => Ok(Instruction::equality(true, false, l, r)),
            B::Isnt => Ok(Instruction::equality(true, true, l, r)),
            B::Eq => Ok(Instruction::equality(false, false, l, r)),
            B::Neq => Ok(Instruction::equality(false, true, l, r)),
            B::And | B::Nand => {
                let temp = b.temp_local(l.is_float());
                let and = Instruction::logical(LogicalOp::And, temp, l, r);
                match op {
                    B::Nand => and.map(|i| Instruction::unop(UnaryOp::Not, i)),
                    _ => and,
                }
            }
            B::Or | B::Nor => {
                let temp = b.temp_local(l.is_float());
                let or = Instruction::logical(LogicalOp::Or, temp, l, r);
                match op {
                    B::Nor => or.map(|i| Instruction::unop(UnaryOp::Not, i)),
                    _ => or,
                }
            }
        };
        lowered(instruction, self.span)
    }
}

/// Scalar operands whose types share no value compare unequal under both
/// `===` and `==`. Ints and floats meet numerically, so two possible
/// numbers are never decided here.
fn never_equal(v: &mut Validator, left: &SolidType, right: &SolidType) -> bool {
    let scalars = SolidType::value_type();
    if !v.is_subtype(left, &scalars) || !v.is_subtype(right, &scalars) {
        return false;
    }
    let (left, right) = (v.resolve(left), v.resolve(right));
    let numbers = SolidType::Integer.union(&SolidType::Float);
    if left.intersect(&numbers) != SolidType::Never && right.intersect(&numbers) != SolidType::Never {
        return false;
    }
    left.intersect(&right) == SolidType::Never
}

fn has_one_encoding(v: &mut Validator, ty: &SolidType) -> bool {
    [
        SolidType::null(),
        SolidType::Boolean,
        SolidType::Integer,
        SolidType::Float,
    ]
    .iter()
    .any(|kind| v.is_subtype(ty, kind))
}

/// An integer division by a constant zero fails even when the dividend is
/// only known at run time
fn reject_zero_divisor(
    v: &mut Validator,
    left: &Expression,
    right: &Expression,
) -> Result<(), SolidError> {
    if !matches!(right.assess(v)?, Some(Value::Integer(0))) {
        return Ok(());
    }
    let dividend = left.type_check(v)?;
    if v.is_subtype(&dividend, &SolidType::Integer) {
        return Err(NanError::new(NanErrorKind::DivideByZero, right.span).into());
    }
    Ok(())
}

/// Member of a known value; `None` when the lookup misses
fn member_value(base: &Value, accessor: &Accessor, key: Option<&Value>) -> Option<Value> {
    let position = |len: usize, i: i32| -> Option<usize> {
        let at = if i < 0 { len as i64 + i64::from(i) } else { i64::from(i) };
        usize::try_from(at).ok()
    };

    match (base, accessor, key) {
        (Value::Tuple(items) | Value::List(items), Accessor::Index(i), _)
        | (Value::Tuple(items) | Value::List(items), _, Some(Value::Integer(i))) => {
            items.get(position(items.len(), *i)?).cloned()
        }
        (Value::Record(fields) | Value::Dict(fields), Accessor::Property(name), _) => {
            fields.get(name).cloned()
        }
        (Value::Record(fields) | Value::Dict(fields), _, Some(Value::String(name))) => {
            fields.get(name.as_ref()).cloned()
        }
        (Value::Map(entries), _, Some(key)) => entries
            .iter()
            .find(|(k, _)| k.equal(key))
            .map(|(_, value)| value.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolidConfig;

    fn span() -> Span {
        Span::empty()
    }

    fn int(i: i32) -> Expression {
        Expression::constant(Value::Integer(i), span())
    }

    fn float(x: f64) -> Expression {
        Expression::constant(Value::Float(x), span())
    }

    fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
        Expression::new(
            ExpressionKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span(),
        )
    }

    fn validator(folding: bool) -> Validator {
        Validator::new(SolidConfig::default().with_constant_folding(folding))
    }

    #[test]
    fn test_folding_gives_unit_type() {
        let mut v = validator(true);
        v.diagnostics_mut().enable();
        let sum = binary(BinaryOperator::Add, int(2), int(3));
        assert_eq!(sum.type_check(&mut v).unwrap(), SolidType::Unit(Scalar::Integer(5)));
        assert_eq!(v.diagnostics_mut().count(), 1);

        let mut v = validator(false);
        let sum = binary(BinaryOperator::Add, int(2), int(3));
        assert_eq!(sum.type_check(&mut v).unwrap(), SolidType::Integer);
    }

    #[test]
    fn test_mixed_arithmetic_needs_coercion() {
        let mut v = Validator::new(
            SolidConfig::default()
                .with_constant_folding(false)
                .with_int_coercion(false),
        );
        let sum = binary(BinaryOperator::Add, int(2), float(3.0));
        assert_eq!(sum.type_check(&mut v).unwrap_err().code(), 2301);

        let mut v = validator(false);
        let sum = binary(BinaryOperator::Add, int(2), float(3.0));
        assert_eq!(sum.type_check(&mut v).unwrap(), SolidType::Float);
        let mut b = Builder::new();
        assert_eq!(
            sum.build(&mut v, &mut b).unwrap().to_string(),
            "(f64.add (f64.convert_i32_s (i32.const 2)) (f64.const 3.0))"
        );
    }

    #[test]
    fn test_division_by_zero_is_reported_without_folding() {
        let mut v = validator(false);
        let div = binary(BinaryOperator::Div, int(5), int(0));
        assert_eq!(div.type_check(&mut v).unwrap_err().code(), 2402);
    }

    #[test]
    fn test_logical_type() {
        let mut v = validator(false);
        let null = Expression::constant(Value::Null, span());
        let and = binary(BinaryOperator::And, null, int(1));
        assert_eq!(
            and.type_check(&mut v).unwrap(),
            SolidType::null().union(&SolidType::Unit(Scalar::Integer(1)))
        );

        let mixed = binary(BinaryOperator::Or, int(1), float(1.0));
        assert_eq!(mixed.type_check(&mut v).unwrap_err().code(), 2301);
    }

    #[test]
    fn test_tuple_access() {
        let mut v = validator(false);
        let tuple = Expression::new(
            ExpressionKind::Collection(Collection::Tuple(vec![int(1), float(2.0)])),
            span(),
        );
        let access = |tuple, accessor| {
            Expression::new(
                ExpressionKind::Access {
                    base: Box::new(tuple),
                    mode: AccessMode::Plain,
                    accessor,
                },
                span(),
            )
        };

        let last = access(tuple, Accessor::Computed(Box::new(int(-1))));
        assert_eq!(last.type_check(&mut v).unwrap(), SolidType::Unit(Scalar::Float(2.0)));

        let tuple = Expression::new(
            ExpressionKind::Collection(Collection::Tuple(vec![int(1)])),
            span(),
        );
        let out = access(tuple, Accessor::Index(3));
        assert_eq!(out.type_check(&mut v).unwrap_err().code(), 2303);
    }

    #[test]
    fn test_record_duplicate_and_missing_keys() {
        let mut v = validator(false);
        let record = Expression::new(
            ExpressionKind::Collection(Collection::Record(vec![
                ("a".into(), span(), int(1)),
                ("a".into(), span(), int(2)),
            ])),
            span(),
        );
        assert_eq!(record.type_check(&mut v).unwrap_err().code(), 2202);

        let record = Expression::new(
            ExpressionKind::Collection(Collection::Record(vec![("a".into(), span(), int(1))])),
            span(),
        );
        let missing = Expression::new(
            ExpressionKind::Access {
                base: Box::new(record),
                mode: AccessMode::Plain,
                accessor: Accessor::Property("b".into()),
            },
            span(),
        );
        assert_eq!(missing.type_check(&mut v).unwrap_err().code(), 2304);
    }

    #[test]
    fn test_set_elements_must_be_value_types() {
        let mut v = validator(false);
        let inner = Expression::new(
            ExpressionKind::Collection(Collection::Tuple(vec![int(1)])),
            span(),
        );
        let set = Expression::new(ExpressionKind::Collection(Collection::Set(vec![inner])), span());
        assert_eq!(set.type_check(&mut v).unwrap_err().code(), 2307);
    }

    #[test]
    fn test_identity_lowering_picks_helper() {
        let mut v = validator(false);
        let mut b = Builder::new();
        let is = binary(BinaryOperator::Is, int(0), float(-0.0));
        assert_eq!(
            is.build(&mut v, &mut b).unwrap().to_string(),
            "(call $i_f_id (i32.const 0) (f64.const -0.0))"
        );
    }

    #[test]
    fn test_short_circuit_assessment() {
        let mut v = validator(true);
        let unknown = Expression::variable("x", span());
        let or = binary(BinaryOperator::Or, int(3), unknown);
        assert_eq!(or.assess(&mut v).unwrap(), Some(Value::Integer(3)));
    }
}
