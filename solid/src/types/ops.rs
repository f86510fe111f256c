//! Normalizing set operations on types.
//!
//! These operations need no alias environment: aliases are kept opaque and
//! only compared by identity. Subtyping lives in [`super::Lattice`].
//!
//! - union (|): least upper bound, normalized on construction
//! - intersect (&): greatest lower bound where it can be computed locally
//! - subtract (-): removal used to narrow logical operands

use std::collections::BTreeMap;

use super::{Scalar, SolidType, TypeEntry};

/// Runtime kind of the values a type describes. Types of different kinds
/// never share a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Tuple,
    Record,
    List,
    Dict,
    Set,
    Map,
}

fn value_kind(ty: &SolidType) -> Option<ValueKind> {
    Some(match ty {
        SolidType::Unit(Scalar::Null) => ValueKind::Null,
        SolidType::Boolean | SolidType::Unit(Scalar::Boolean(_)) => ValueKind::Boolean,
        SolidType::Integer | SolidType::Unit(Scalar::Integer(_)) => ValueKind::Integer,
        SolidType::Float | SolidType::Unit(Scalar::Float(_)) => ValueKind::Float,
        SolidType::String | SolidType::Unit(Scalar::String(_)) => ValueKind::String,
        SolidType::Tuple { .. } => ValueKind::Tuple,
        SolidType::Record { .. } => ValueKind::Record,
        SolidType::List { .. } => ValueKind::List,
        SolidType::Dict { .. } => ValueKind::Dict,
        SolidType::Set { .. } => ValueKind::Set,
        SolidType::Map { .. } => ValueKind::Map,
        _ => return None,
    })
}

impl SolidType {
    /// Union (|) of two types.
    ///
    /// # Examples
    /// ```text
    /// int | never        = int
    /// int | unknown      = unknown
    /// 42 | int           = int
    /// true | false       = bool
    /// obj | [int]        = obj
    /// obj | void         = obj | void
    /// ```
    pub fn union(&self, other: &SolidType) -> SolidType {
        SolidType::union_all([self.clone(), other.clone()])
    }

    /// Union of any number of types; an empty union is `never`.
    ///
    /// Members keep their first-seen order.
    pub fn union_all(types: impl IntoIterator<Item = SolidType>) -> SolidType {
        let mut members: Vec<SolidType> = Vec::new();
        let mut pending: Vec<SolidType> = types.into_iter().collect();
        pending.reverse();

        while let Some(ty) = pending.pop() {
            match ty {
                SolidType::Unknown => return SolidType::Unknown,
                SolidType::Never => {}
                SolidType::Union(nested) => pending.extend(nested.into_iter().rev()),
                ty => {
                    if !members.contains(&ty) {
                        members.push(ty);
                    }
                }
            }
        }

        // true | false = bool
        let t = SolidType::boolean_unit(true);
        let f = SolidType::boolean_unit(false);
        if let (Some(ti), Some(fi)) = (
            members.iter().position(|m| *m == t),
            members.iter().position(|m| *m == f),
        ) {
            let (first, second) = (ti.min(fi), ti.max(fi));
            members.remove(second);
            if members[..first].contains(&SolidType::Boolean) {
                members.remove(first);
            } else {
                members[first] = SolidType::Boolean;
            }
        }

        let has_object = members.contains(&SolidType::Object);
        let mut absorbed: Vec<SolidType> = members
            .iter()
            .filter(|m| match m {
                SolidType::Object | SolidType::Void | SolidType::Alias { .. } => true,
                SolidType::Unit(s) => {
                    !has_object
                        && !s
                            .primitive()
                            .is_some_and(|p| members.contains(&p))
                }
                _ => !has_object,
            })
            .cloned()
            .collect();

        if absorbed.len() > 1 {
            SolidType::Union(absorbed)
        } else {
            absorbed.pop().unwrap_or(SolidType::Never)
        }
    }

    /// Intersection (&) of two types.
    ///
    /// # Examples
    /// ```text
    /// T & unknown          = T
    /// T & never            = never
    /// int & float          = never
    /// 42 & int             = 42
    /// (int | str) & int    = int
    /// obj & [int]          = [int]
    /// void & int           = never
    /// [int, str] & [int]   = [int, str]
    /// ```
    pub fn intersect(&self, other: &SolidType) -> SolidType {
        use SolidType as T;

        match (self, other) {
            (T::Unknown, t) | (t, T::Unknown) => t.clone(),
            (T::Never, _) | (_, T::Never) => T::Never,

            (T::Union(members), t) | (t, T::Union(members)) => {
                T::union_all(members.iter().map(|m| m.intersect(t)))
            }

            (a, b) if a == b => a.clone(),

            (T::Void, _) | (_, T::Void) => T::Never,

            (T::Object, t) | (t, T::Object) if !matches!(t, T::Alias { .. }) => t.clone(),

            (T::Intersection(left), right) | (right, T::Intersection(left)) => {
                let mut members = left.clone();
                let extra: Vec<SolidType> = match right {
                    T::Intersection(r) => r.clone(),
                    r => vec![r.clone()],
                };
                for m in extra {
                    if !members.contains(&m) {
                        members.push(m);
                    }
                }
                T::Intersection(members)
            }

            (a, b) => match (value_kind(a), value_kind(b)) {
                (Some(ka), Some(kb)) if ka != kb => T::Never,
                (Some(_), Some(_)) => intersect_same_kind(a, b),
                _ => T::Intersection(vec![a.clone(), b.clone()]),
            },
        }
    }

    /// Remove `other` from this type (used to narrow logical operands).
    ///
    /// # Examples
    /// ```text
    /// T - T            = never
    /// unknown - void   = obj
    /// bool - true      = false
    /// (int | null) - null = int
    /// 42 - int         = never
    /// int - 0          = int       (conservative)
    /// ```
    pub fn subtract(&self, other: &SolidType) -> SolidType {
        use SolidType as T;

        if self == other {
            return T::Never;
        }

        match (self, other) {
            (_, T::Union(removed)) => removed
                .iter()
                .fold(self.clone(), |acc, r| acc.subtract(r)),
            (T::Union(members), _) => T::union_all(members.iter().map(|m| m.subtract(other))),
            (_, T::Unknown) => T::Never,
            (T::Unknown, T::Void) => T::Object,
            (T::Boolean, T::Unit(Scalar::Boolean(b))) => T::boolean_unit(!b),
            (T::Unit(s), t) if s.primitive().as_ref() == Some(t) => T::Never,
            (_, T::Object) if !matches!(self, T::Void | T::Unknown | T::Alias { .. }) => T::Never,
            _ => self.clone(),
        }
    }
}

/// Intersection of two types of the same runtime kind
fn intersect_same_kind(a: &SolidType, b: &SolidType) -> SolidType {
    use SolidType as T;

    match (a, b) {
        (T::Unit(_), T::Unit(_)) => T::Never,
        (T::Unit(_), _) => a.clone(),
        (_, T::Unit(_)) => b.clone(),

        (
            T::Tuple {
                items: x,
                mutable: false,
            },
            T::Tuple {
                items: y,
                mutable: false,
            },
        ) => {
            let mut items = Vec::new();
            for i in 0..x.len().max(y.len()) {
                let entry = match (x.get(i), y.get(i)) {
                    (Some(l), Some(r)) => TypeEntry {
                        ty: l.ty.intersect(&r.ty),
                        optional: l.optional && r.optional,
                    },
                    (Some(e), None) | (None, Some(e)) => e.clone(),
                    (None, None) => continue,
                };
                if !entry.optional && entry.ty == T::Never {
                    return T::Never;
                }
                items.push(entry);
            }
            T::tuple(items)
        }

        (
            T::Record {
                fields: x,
                mutable: false,
            },
            T::Record {
                fields: y,
                mutable: false,
            },
        ) => {
            let mut fields = BTreeMap::new();
            for key in x.keys().chain(y.keys()) {
                if fields.contains_key(key) {
                    continue;
                }
                let entry = match (x.get(key), y.get(key)) {
                    (Some(l), Some(r)) => TypeEntry {
                        ty: l.ty.intersect(&r.ty),
                        optional: l.optional && r.optional,
                    },
                    (Some(e), None) | (None, Some(e)) => e.clone(),
                    (None, None) => continue,
                };
                if !entry.optional && entry.ty == T::Never {
                    return T::Never;
                }
                fields.insert(key.clone(), entry);
            }
            T::record(fields)
        }

        (
            T::List {
                item: x,
                mutable: false,
            },
            T::List {
                item: y,
                mutable: false,
            },
        ) => T::list(x.intersect(y)),

        (
            T::Dict {
                item: x,
                mutable: false,
            },
            T::Dict {
                item: y,
                mutable: false,
            },
        ) => T::dict(x.intersect(y)),

        _ => T::Intersection(vec![a.clone(), b.clone()]),
    }
}
