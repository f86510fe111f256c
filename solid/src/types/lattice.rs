//! Per-compilation subtyping oracle.
//!
//! A [`Lattice`] owns the type-alias arena and the subtype memo table for
//! one compilation. Memo entries are tri-state: a pair being computed is
//! `Pending`, and a pending hit answers `true` so that aliases recursing
//! through a collection terminate. Bare self-references are removed by
//! [`Lattice::resolve`] before any question reaches the memo. A `true`
//! result recorded while an outer question was still open may rest on such
//! an assumption; if that outer question ends `false`, every `true`
//! recorded since it started is rolled back.

use std::collections::HashMap;

use super::{AliasId, Scalar, SolidType, TypeEntry};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoEntry {
    Pending,
    Done(bool),
}

#[derive(Debug, Clone)]
struct AliasEntry {
    name: String,
    definition: Option<SolidType>,
}

#[derive(Debug, Default)]
pub struct Lattice {
    aliases: Vec<AliasEntry>,
    memo: HashMap<(SolidType, SolidType), MemoEntry>,
    /// `true` results recorded while some question is still open
    journal: Vec<(SolidType, SolidType)>,
    depth: usize,
}

impl Lattice {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Aliases ====================

    /// Reserve an alias slot; its definition is supplied later
    pub fn declare_alias(&mut self, name: impl Into<String>) -> AliasId {
        self.aliases.push(AliasEntry {
            name: name.into(),
            definition: None,
        });
        AliasId(self.aliases.len() - 1)
    }

    pub fn define_alias(&mut self, id: AliasId, definition: SolidType) {
        if let Some(entry) = self.aliases.get_mut(id.0) {
            entry.definition = Some(definition);
            // Answers computed against the undefined alias are stale
            self.memo.clear();
        }
    }

    pub fn alias_name(&self, id: AliasId) -> Option<&str> {
        self.aliases.get(id.0).map(|a| a.name.as_str())
    }

    pub fn alias_definition(&self, id: AliasId) -> Option<&SolidType> {
        self.aliases.get(id.0).and_then(|a| a.definition.as_ref())
    }

    /// Expand the aliases at the top level of `ty`, through unions and
    /// intersections, down to non-alias types.
    ///
    /// An alias met again while it is still being expanded denotes no
    /// values: `type T = T | int` resolves to `int`, and a chain that loops
    /// (`type A = B; type B = A;`) or ends at an undefined alias resolves to
    /// `never`. Aliases under a collection constructor are left in place.
    pub fn resolve(&self, ty: &SolidType) -> SolidType {
        self.unfold(ty, &mut Vec::new())
    }

    fn unfold(&self, ty: &SolidType, expanding: &mut Vec<AliasId>) -> SolidType {
        match ty {
            SolidType::Alias { id, .. } => {
                if expanding.contains(id) {
                    return SolidType::Never;
                }
                let Some(definition) = self.alias_definition(*id) else {
                    return SolidType::Never;
                };
                expanding.push(*id);
                let unfolded = self.unfold(definition, expanding);
                expanding.pop();
                unfolded
            }
            SolidType::Union(members) => {
                SolidType::union_all(members.iter().map(|m| self.unfold(m, expanding)))
            }
            SolidType::Intersection(members) => members
                .iter()
                .map(|m| self.unfold(m, expanding))
                .fold(SolidType::Unknown, |acc, m| acc.intersect(&m)),
            other => other.clone(),
        }
    }

    // ==================== Subtyping ====================

    /// `a ⊑ b`, memoized per ordered pair
    pub fn is_subtype(&mut self, a: &SolidType, b: &SolidType) -> bool {
        if a == b {
            return true;
        }

        let key = (a.clone(), b.clone());
        match self.memo.get(&key) {
            Some(MemoEntry::Pending) => return true,
            Some(MemoEntry::Done(result)) => return *result,
            None => {}
        }

        let mark = self.journal.len();
        self.memo.insert(key.clone(), MemoEntry::Pending);
        self.depth += 1;
        let result = self.compute_subtype(a, b);
        self.depth -= 1;

        if result {
            self.memo.insert(key.clone(), MemoEntry::Done(true));
            self.journal.push(key);
        } else {
            for stale in self.journal.drain(mark..) {
                self.memo.remove(&stale);
            }
            self.memo.insert(key, MemoEntry::Done(false));
        }
        if self.depth == 0 {
            self.journal.clear();
        }
        result
    }

    /// Mutual subtyping
    pub fn equals(&mut self, a: &SolidType, b: &SolidType) -> bool {
        self.is_subtype(a, b) && self.is_subtype(b, a)
    }

    fn compute_subtype(&mut self, a: &SolidType, b: &SolidType) -> bool {
        use SolidType as T;

        match (a, b) {
            (T::Never, _) | (_, T::Unknown) => return true,
            (T::Alias { .. }, _) => {
                let resolved = self.resolve(a);
                return self.is_subtype(&resolved, b);
            }
            (_, T::Alias { .. }) => {
                let resolved = self.resolve(b);
                return self.is_subtype(a, &resolved);
            }
            (T::Union(members), _) => {
                return members.iter().all(|m| self.is_subtype(m, b));
            }
            (_, T::Intersection(members)) => {
                return members.iter().all(|m| self.is_subtype(a, m));
            }
            (T::Boolean, T::Union(members))
                if members.contains(&T::boolean_unit(true))
                    && members.contains(&T::boolean_unit(false)) =>
            {
                return true;
            }
            (_, T::Union(members)) => {
                return members.iter().any(|m| self.is_subtype(a, m));
            }
            (T::Intersection(members), _) => {
                return members.iter().any(|m| self.is_subtype(m, b));
            }
            _ => {}
        }

        match (a, b) {
            (T::Void, _) | (_, T::Void) | (T::Unknown, _) => false,
            (_, T::Object) => true,
            (T::Object, _) => false,
            (T::Unit(scalar), _) => self.includes(b, &scalar.to_value()),
            (_, T::Unit(_)) => false,

            (
                T::Tuple {
                    items: sub,
                    mutable: sub_mut,
                },
                T::Tuple {
                    items: sup,
                    mutable: sup_mut,
                },
            ) => {
                if *sup_mut {
                    *sub_mut
                        && sub.len() == sup.len()
                        && sub
                            .iter()
                            .zip(sup)
                            .all(|(x, y)| self.entries_equal(x, y))
                } else {
                    sup.iter()
                        .enumerate()
                        .all(|(i, y)| self.entry_narrows(sub.get(i), y))
                }
            }

            (
                T::Record {
                    fields: sub,
                    mutable: sub_mut,
                },
                T::Record {
                    fields: sup,
                    mutable: sup_mut,
                },
            ) => {
                if *sup_mut {
                    *sub_mut
                        && sub.len() == sup.len()
                        && sup.iter().all(|(key, y)| {
                            sub.get(key).is_some_and(|x| self.entries_equal(x, y))
                        })
                } else {
                    sup.iter()
                        .all(|(key, y)| self.entry_narrows(sub.get(key), y))
                }
            }

            (
                T::List {
                    item: x,
                    mutable: xm,
                },
                T::List {
                    item: y,
                    mutable: ym,
                },
            )
            | (
                T::Dict {
                    item: x,
                    mutable: xm,
                },
                T::Dict {
                    item: y,
                    mutable: ym,
                },
            )
            | (
                T::Set {
                    item: x,
                    mutable: xm,
                },
                T::Set {
                    item: y,
                    mutable: ym,
                },
            ) => self.component_narrows(x, y, *xm, *ym),

            (
                T::Map {
                    key: xk,
                    value: xv,
                    mutable: xm,
                },
                T::Map {
                    key: yk,
                    value: yv,
                    mutable: ym,
                },
            ) => self.component_narrows(xk, yk, *xm, *ym) && self.component_narrows(xv, yv, *xm, *ym),

            _ => false,
        }
    }

    /// Covariant for immutable targets, invariant for mutable ones
    fn component_narrows(&mut self, x: &SolidType, y: &SolidType, x_mut: bool, y_mut: bool) -> bool {
        if y_mut {
            x_mut && self.equals(x, y)
        } else {
            self.is_subtype(x, y)
        }
    }

    /// Width rule for one tuple item / record field of the supertype
    fn entry_narrows(&mut self, sub: Option<&TypeEntry>, sup: &TypeEntry) -> bool {
        match sub {
            Some(x) => (sup.optional || !x.optional) && self.is_subtype(&x.ty, &sup.ty),
            None => sup.optional,
        }
    }

    fn entries_equal(&mut self, x: &TypeEntry, y: &TypeEntry) -> bool {
        x.optional == y.optional && self.equals(&x.ty, &y.ty)
    }

    // ==================== Inclusion ====================

    /// Check whether `value` is one of the values `ty` denotes.
    ///
    /// Compile-time values are never mutable references, so mutable
    /// collection types include none of them.
    pub fn includes(&self, ty: &SolidType, value: &Value) -> bool {
        self.includes_guarded(ty, value, &mut Vec::new())
    }

    /// `expanding` holds the aliases opened at this value level; descending
    /// into a component value starts a fresh level.
    fn includes_guarded(&self, ty: &SolidType, value: &Value, expanding: &mut Vec<AliasId>) -> bool {
        use SolidType as T;

        match (ty, value) {
            (T::Never | T::Void, _) => false,
            (T::Unknown | T::Object, _) => true,
            (T::Alias { id, .. }, _) => {
                if expanding.contains(id) {
                    return false;
                }
                let Some(definition) = self.alias_definition(*id) else {
                    return false;
                };
                expanding.push(*id);
                let result = self.includes_guarded(definition, value, expanding);
                expanding.pop();
                result
            }
            (T::Union(members), _) => members
                .iter()
                .any(|m| self.includes_guarded(m, value, expanding)),
            (T::Intersection(members), _) => members
                .iter()
                .all(|m| self.includes_guarded(m, value, expanding)),

            (T::Boolean, Value::Boolean(_))
            | (T::Integer, Value::Integer(_))
            | (T::Float, Value::Float(_))
            | (T::String, Value::String(_)) => true,
            (T::Unit(scalar), _) => unit_holds(scalar, value),

            (T::Tuple { mutable: true, .. }, _)
            | (T::Record { mutable: true, .. }, _)
            | (T::List { mutable: true, .. }, _)
            | (T::Dict { mutable: true, .. }, _)
            | (T::Set { mutable: true, .. }, _)
            | (T::Map { mutable: true, .. }, _) => false,

            (T::Tuple { items, .. }, Value::Tuple(values)) => {
                items.iter().enumerate().all(|(i, entry)| match values.get(i) {
                    Some(v) => self.includes(&entry.ty, v),
                    None => entry.optional,
                })
            }
            (T::Record { fields, .. }, Value::Record(values)) => {
                fields.iter().all(|(key, entry)| match values.get(key) {
                    Some(v) => self.includes(&entry.ty, v),
                    None => entry.optional,
                })
            }
            (T::List { item, .. }, Value::List(values))
            | (T::Set { item, .. }, Value::Set(values)) => {
                values.iter().all(|v| self.includes(item, v))
            }
            (T::Dict { item, .. }, Value::Dict(values)) => {
                values.values().all(|v| self.includes(item, v))
            }
            (T::Map { key, value: val, .. }, Value::Map(entries)) => entries
                .iter()
                .all(|(k, v)| self.includes(key, k) && self.includes(val, v)),

            _ => false,
        }
    }
}

/// A unit type holds exactly the value of its own kind that is identical
/// to its scalar
fn unit_holds(scalar: &Scalar, value: &Value) -> bool {
    match (scalar, value) {
        (Scalar::Null, Value::Null) => true,
        (Scalar::Boolean(a), Value::Boolean(b)) => a == b,
        (Scalar::Integer(a), Value::Integer(b)) => a == b,
        (Scalar::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
        (Scalar::String(a), Value::String(b)) => a.as_str() == &**b,
        _ => false,
    }
}
