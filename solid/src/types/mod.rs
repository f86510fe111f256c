//! The Solid type lattice.
//!
//! A [`SolidType`] denotes a set of runtime values. The hierarchy is:
//!
//! ```text
//! unknown                       (top; includes void)
//!   ├── void                    (absence of a value)
//!   └── obj                     (every value)
//!         ├── bool, int, float, str, unit types (`null`, `42`, `'s'`, ...)
//!         └── [T, U], [a: T], T[], [:T], T{}, {K -> V}  (and `mutable` forms)
//! never                         (bottom)
//! ```
//!
//! # Module Organization
//!
//! - `ops.rs`: normalizing `union` / `intersect` / `subtract`
//! - `lattice.rs`: [`Lattice`], the per-compilation subtyping oracle with
//!   alias arena and memo tables
//! - `display.rs`: rendering as parseable type syntax

pub(crate) mod display;
mod lattice;
mod ops;

#[cfg(test)]
mod tests;

pub use lattice::Lattice;

use std::collections::BTreeMap;

use crate::value::Value;

/// Index of a type alias in the [`Lattice`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AliasId(pub usize);

/// The value of a unit type.
///
/// Equality and hashing compare floats by bit pattern, so `0.0` and `-0.0`
/// are distinct units.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Integer(i32),
    Float(f64),
    String(String),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Boolean(a), Scalar::Boolean(b)) => a == b,
            (Scalar::Integer(a), Scalar::Integer(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a.to_bits() == b.to_bits(),
            (Scalar::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl std::hash::Hash for Scalar {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Scalar::Null => {}
            Scalar::Boolean(v) => v.hash(state),
            Scalar::Integer(v) => v.hash(state),
            Scalar::Float(v) => v.to_bits().hash(state),
            Scalar::String(v) => v.hash(state),
        }
    }
}

impl Scalar {
    /// The primitive type that absorbs this unit in a union (none for `null`)
    pub fn primitive(&self) -> Option<SolidType> {
        match self {
            Scalar::Null => None,
            Scalar::Boolean(_) => Some(SolidType::Boolean),
            Scalar::Integer(_) => Some(SolidType::Integer),
            Scalar::Float(_) => Some(SolidType::Float),
            Scalar::String(_) => Some(SolidType::String),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Boolean(b) => Value::Boolean(*b),
            Scalar::Integer(i) => Value::Integer(*i),
            Scalar::Float(x) => Value::Float(*x),
            Scalar::String(s) => Value::String(s.as_str().into()),
        }
    }
}

/// One item of a tuple type or one field of a record type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeEntry {
    pub ty: SolidType,
    /// `?:` entries may be absent
    pub optional: bool,
}

impl TypeEntry {
    pub fn required(ty: SolidType) -> Self {
        Self {
            ty,
            optional: false,
        }
    }

    pub fn optional(ty: SolidType) -> Self {
        Self { ty, optional: true }
    }
}

/// A Solid type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolidType {
    /// Bottom: no values
    Never,
    /// Top: every value, and the absence of one
    Unknown,
    /// The absence of a value
    Void,
    /// Every value
    Object,
    Boolean,
    Integer,
    Float,
    String,
    /// Exactly one value
    Unit(Scalar),
    Tuple {
        items: Vec<TypeEntry>,
        mutable: bool,
    },
    Record {
        fields: BTreeMap<String, TypeEntry>,
        mutable: bool,
    },
    List {
        item: Box<SolidType>,
        mutable: bool,
    },
    Dict {
        item: Box<SolidType>,
        mutable: bool,
    },
    Set {
        item: Box<SolidType>,
        mutable: bool,
    },
    Map {
        key: Box<SolidType>,
        value: Box<SolidType>,
        mutable: bool,
    },
    /// Normalized union, see [`SolidType::union_all`]
    Union(Vec<SolidType>),
    /// Intersection that could not be simplified further
    Intersection(Vec<SolidType>),
    /// Reference to a (possibly recursive) alias, resolved by a [`Lattice`]
    Alias { id: AliasId, name: String },
}

impl SolidType {
    pub fn null() -> Self {
        SolidType::Unit(Scalar::Null)
    }

    pub fn boolean_unit(value: bool) -> Self {
        SolidType::Unit(Scalar::Boolean(value))
    }

    /// `null | bool | int | float | str`: the types whose values have no
    /// identity beyond their content
    pub fn value_type() -> Self {
        SolidType::union_all([
            SolidType::null(),
            SolidType::Boolean,
            SolidType::Integer,
            SolidType::Float,
            SolidType::String,
        ])
    }

    /// `null | false | 0 | 0.0 | -0.0`
    pub fn falsy() -> Self {
        SolidType::union_all([
            SolidType::null(),
            SolidType::boolean_unit(false),
            SolidType::Unit(Scalar::Integer(0)),
            SolidType::Unit(Scalar::Float(0.0)),
            SolidType::Unit(Scalar::Float(-0.0)),
        ])
    }

    /// `T | null`
    pub fn nullable(self) -> Self {
        self.union(&SolidType::null())
    }

    pub fn tuple(items: Vec<TypeEntry>) -> Self {
        SolidType::Tuple {
            items,
            mutable: false,
        }
    }

    pub fn record(fields: BTreeMap<String, TypeEntry>) -> Self {
        SolidType::Record {
            fields,
            mutable: false,
        }
    }

    pub fn list(item: SolidType) -> Self {
        SolidType::List {
            item: Box::new(item),
            mutable: false,
        }
    }

    pub fn dict(item: SolidType) -> Self {
        SolidType::Dict {
            item: Box::new(item),
            mutable: false,
        }
    }

    pub fn set(item: SolidType) -> Self {
        SolidType::Set {
            item: Box::new(item),
            mutable: false,
        }
    }

    pub fn map(key: SolidType, value: SolidType) -> Self {
        SolidType::Map {
            key: Box::new(key),
            value: Box::new(value),
            mutable: false,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            SolidType::Tuple { .. }
                | SolidType::Record { .. }
                | SolidType::List { .. }
                | SolidType::Dict { .. }
                | SolidType::Set { .. }
                | SolidType::Map { .. }
        )
    }

    pub fn is_mutable(&self) -> bool {
        match self {
            SolidType::Tuple { mutable, .. }
            | SolidType::Record { mutable, .. }
            | SolidType::List { mutable, .. }
            | SolidType::Dict { mutable, .. }
            | SolidType::Set { mutable, .. }
            | SolidType::Map { mutable, .. } => *mutable,
            _ => false,
        }
    }

    /// The `mutable` form of a collection type; `None` for anything else
    pub fn to_mutable(&self) -> Option<SolidType> {
        let mut ty = self.clone();
        match &mut ty {
            SolidType::Tuple { mutable, .. }
            | SolidType::Record { mutable, .. }
            | SolidType::List { mutable, .. }
            | SolidType::Dict { mutable, .. }
            | SolidType::Set { mutable, .. }
            | SolidType::Map { mutable, .. } => {
                *mutable = true;
                Some(ty)
            }
            _ => None,
        }
    }

    /// Check whether `alias` occurs anywhere inside this type
    pub fn mentions_alias(&self, alias: AliasId) -> bool {
        match self {
            SolidType::Alias { id, .. } => *id == alias,
            SolidType::Tuple { items, .. } => items.iter().any(|e| e.ty.mentions_alias(alias)),
            SolidType::Record { fields, .. } => {
                fields.values().any(|e| e.ty.mentions_alias(alias))
            }
            SolidType::List { item, .. }
            | SolidType::Dict { item, .. }
            | SolidType::Set { item, .. } => item.mentions_alias(alias),
            SolidType::Map { key, value, .. } => {
                key.mentions_alias(alias) || value.mentions_alias(alias)
            }
            SolidType::Union(members) | SolidType::Intersection(members) => {
                members.iter().any(|m| m.mentions_alias(alias))
            }
            _ => false,
        }
    }

    // ==================== Convenience (fresh lattice) ====================

    /// `self ⊑ other`, using a throwaway [`Lattice`] (no aliases)
    pub fn is_subtype_of(&self, other: &SolidType) -> bool {
        Lattice::new().is_subtype(self, other)
    }

    /// Mutual subtyping, using a throwaway [`Lattice`]
    pub fn equals(&self, other: &SolidType) -> bool {
        Lattice::new().equals(self, other)
    }

    pub fn includes(&self, value: &Value) -> bool {
        Lattice::new().includes(self, value)
    }
}
