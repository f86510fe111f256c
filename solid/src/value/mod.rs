//! Compile-time values.
//!
//! Collections are persistent: they are shared behind [`Rc`] and never
//! mutated after construction, so reference identity is stable.
//!
//! # Module Organization
//!
//! - `equality.rs`: structural [`Value::equal`] with a pairwise memo
//! - `ops.rs`: operator evaluation used for constant folding

mod equality;
mod ops;

pub use equality::EqualityMemo;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::types::display::{format_float, quote_string};
use crate::types::{Scalar, SolidType, TypeEntry};

/// Equivalence used to deduplicate set elements and map keys
pub type Comparator<'a> = &'a dyn Fn(&Value, &Value) -> bool;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i32),
    Float(f64),
    String(Rc<str>),
    Tuple(Rc<Vec<Value>>),
    Record(Rc<IndexMap<String, Value>>),
    List(Rc<Vec<Value>>),
    Dict(Rc<IndexMap<String, Value>>),
    Set(Rc<Vec<Value>>),
    Map(Rc<Vec<(Value, Value)>>),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(s.into())
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(items))
    }

    pub fn record(fields: IndexMap<String, Value>) -> Self {
        Value::Record(Rc::new(fields))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn dict(fields: IndexMap<String, Value>) -> Self {
        Value::Dict(Rc::new(fields))
    }

    /// Build a set, keeping the first of each group of [`Value::equal`]
    /// elements
    pub fn set(elements: Vec<Value>) -> Self {
        Value::set_with(elements, &|a, b| a.equal(b))
    }

    pub fn set_with(elements: Vec<Value>, same: Comparator<'_>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(elements.len());
        for element in elements {
            if !unique.iter().any(|u| same(u, &element)) {
                unique.push(element);
            }
        }
        Value::Set(Rc::new(unique))
    }

    /// Build a map; a later entry replaces the value of an earlier
    /// [`Value::equal`] key but keeps the earlier key's position
    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::map_with(entries, &|a, b| a.equal(b))
    }

    pub fn map_with(entries: Vec<(Value, Value)>, same: Comparator<'_>) -> Self {
        let mut unique: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match unique.iter_mut().find(|(k, _)| same(k, &key)) {
                Some(slot) => slot.1 = value,
                None => unique.push((key, value)),
            }
        }
        Value::Map(Rc::new(unique))
    }

    /// Strict identity (`===`).
    ///
    /// Primitives compare by value and floats by bit pattern, so
    /// `0.0 === -0.0` is false while `NaN === NaN` holds. An integer is
    /// identical to the float with the same bits after conversion.
    /// Collections compare by reference.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Integer(i), Value::Float(x)) | (Value::Float(x), Value::Integer(i)) => {
                f64::from(*i).to_bits() == x.to_bits()
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b))
            | (Value::List(a), Value::List(b))
            | (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) | (Value::Dict(a), Value::Dict(b)) => {
                Rc::ptr_eq(a, b)
            }
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Loose equality (`==`)
    pub fn equal(&self, other: &Value) -> bool {
        EqualityMemo::default().equal(self, other)
    }

    /// `null`, `false`, `0`, `0.0` and `-0.0`
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(b) => !b,
            Value::Integer(i) => *i == 0,
            Value::Float(x) => *x == 0.0,
            _ => false,
        }
    }

    /// Falsy values, `''` and empty collections
    pub fn is_empty(&self) -> bool {
        self.is_falsy()
            || match self {
                Value::String(s) => s.is_empty(),
                Value::Tuple(items) | Value::List(items) | Value::Set(items) => items.is_empty(),
                Value::Record(fields) | Value::Dict(fields) => fields.is_empty(),
                Value::Map(entries) => entries.is_empty(),
                _ => false,
            }
    }

    /// Floats are the only values with an f64 representation
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// The narrowest type containing this value.
    ///
    /// Primitives give their unit type and tuples/records give structural
    /// types. Homogeneous collections give the union of their contents.
    pub fn to_type(&self) -> SolidType {
        match self {
            Value::Null => SolidType::null(),
            Value::Boolean(b) => SolidType::boolean_unit(*b),
            Value::Integer(i) => SolidType::Unit(Scalar::Integer(*i)),
            Value::Float(x) => SolidType::Unit(Scalar::Float(*x)),
            Value::String(s) => SolidType::Unit(Scalar::String(s.to_string())),
            Value::Tuple(items) => SolidType::tuple(
                items
                    .iter()
                    .map(|v| TypeEntry::required(v.to_type()))
                    .collect(),
            ),
            Value::Record(fields) => SolidType::record(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), TypeEntry::required(v.to_type())))
                    .collect::<BTreeMap<_, _>>(),
            ),
            Value::List(items) => {
                SolidType::list(SolidType::union_all(items.iter().map(Value::to_type)))
            }
            Value::Set(items) => {
                SolidType::set(SolidType::union_all(items.iter().map(Value::to_type)))
            }
            Value::Dict(fields) => {
                SolidType::dict(SolidType::union_all(fields.values().map(Value::to_type)))
            }
            Value::Map(entries) => SolidType::map(
                SolidType::union_all(entries.iter().map(|(k, _)| k.to_type())),
                SolidType::union_all(entries.iter().map(|(_, v)| v.to_type())),
            ),
        }
    }

    /// The value as a unit-type scalar, for primitives only
    pub fn to_scalar(&self) -> Option<Scalar> {
        Some(match self {
            Value::Null => Scalar::Null,
            Value::Boolean(b) => Scalar::Boolean(*b),
            Value::Integer(i) => Scalar::Integer(*i),
            Value::Float(x) => Scalar::Float(*x),
            Value::String(s) => Scalar::String(s.to_string()),
            _ => return None,
        })
    }
}

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &IndexMap<String, Value>) -> fmt::Result {
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{key}= {value}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::String(s) => write!(f, "{}", quote_string(s)),
            Value::Tuple(items) => {
                write!(f, "[")?;
                write_items(f, items.iter())?;
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "[")?;
                write_fields(f, fields)?;
                write!(f, "]")
            }
            Value::List(items) => {
                write!(f, "List.([")?;
                write_items(f, items.iter())?;
                write!(f, "])")
            }
            Value::Dict(fields) => {
                write!(f, "Dict.([")?;
                write_fields(f, fields)?;
                write!(f, "])")
            }
            Value::Set(items) => {
                write!(f, "{{")?;
                write_items(f, items.iter())?;
                write!(f, "}}")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} -> {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
