//! Loose equality (`==`).
//!
//! Numbers compare numerically across int and float, floats follow IEEE
//! (`-0.0 == 0.0`, `NaN != NaN`), and collections compare structurally.
//! Sets, records, dicts and maps ignore order.

use std::collections::HashMap;
use std::rc::Rc;

use super::Value;

/// Pairwise results of collection comparisons, keyed by the addresses of
/// the two shared payloads.
///
/// Compared collections are pinned for the memo's lifetime so that their
/// addresses cannot be reused by later allocations.
#[derive(Debug, Default)]
pub struct EqualityMemo {
    results: HashMap<(usize, usize), bool>,
    pinned: Vec<Value>,
}

fn payload_address(value: &Value) -> Option<usize> {
    Some(match value {
        Value::Tuple(rc) | Value::List(rc) | Value::Set(rc) => Rc::as_ptr(rc) as usize,
        Value::Record(rc) | Value::Dict(rc) => Rc::as_ptr(rc) as usize,
        Value::Map(rc) => Rc::as_ptr(rc) as usize,
        _ => return None,
    })
}

impl EqualityMemo {
    pub fn equal(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Integer(x), Value::Integer(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::Integer(i), Value::Float(x)) | (Value::Float(x), Value::Integer(i)) => {
                f64::from(*i) == *x
            }
            _ => match (payload_address(a), payload_address(b)) {
                (Some(pa), Some(pb)) => self.equal_collections(a, b, (pa, pb)),
                _ => a.identical(b),
            },
        }
    }

    fn equal_collections(&mut self, a: &Value, b: &Value, key: (usize, usize)) -> bool {
        if let Some(known) = self.results.get(&key) {
            return *known;
        }
        let result = self.compare_structure(a, b);
        self.pinned.push(a.clone());
        self.pinned.push(b.clone());
        self.results.insert(key, result);
        result
    }

    fn compare_structure(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Tuple(x), Value::Tuple(y)) | (Value::List(x), Value::List(y)) => {
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| self.equal(l, r))
            }
            (Value::Record(x), Value::Record(y)) | (Value::Dict(x), Value::Dict(y)) => {
                x.len() == y.len()
                    && x
                        .iter()
                        .all(|(key, l)| y.get(key).is_some_and(|r| self.equal(l, r)))
            }
            (Value::Set(x), Value::Set(y)) => {
                x.len() == y.len()
                    && x.iter().all(|l| y.iter().any(|r| self.equal(l, r)))
                    && y.iter().all(|r| x.iter().any(|l| self.equal(l, r)))
            }
            (Value::Map(x), Value::Map(y)) => {
                x.len() == y.len()
                    && x.iter().all(|(lk, lv)| {
                        y.iter()
                            .any(|(rk, rv)| self.equal(lk, rk) && self.equal(lv, rv))
                    })
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_numbers() {
        assert!(Value::Integer(0).equal(&Value::Float(-0.0)));
        assert!(Value::Float(0.0).equal(&Value::Float(-0.0)));
        assert!(!Value::Float(f64::NAN).equal(&Value::Float(f64::NAN)));
        assert!(!Value::Integer(1).equal(&Value::Boolean(true)));
    }

    #[test]
    fn test_structural_collections() {
        let a = Value::tuple(vec![Value::Integer(1), Value::string("x")]);
        let b = Value::tuple(vec![Value::Float(1.0), Value::string("x")]);
        assert!(a.equal(&b));
        assert!(!a.equal(&Value::list(vec![Value::Integer(1), Value::string("x")])));

        let s1 = Value::set(vec![Value::Integer(1), Value::Integer(2)]);
        let s2 = Value::set(vec![Value::Integer(2), Value::Integer(1)]);
        assert!(s1.equal(&s2));

        let mut f1 = IndexMap::new();
        f1.insert("a".to_string(), Value::Integer(1));
        f1.insert("b".to_string(), Value::Null);
        let mut f2 = IndexMap::new();
        f2.insert("b".to_string(), Value::Null);
        f2.insert("a".to_string(), Value::Integer(1));
        assert!(Value::record(f1).equal(&Value::record(f2)));
    }

    #[test]
    fn test_memo_reuses_shared_pairs() {
        let inner = Value::tuple(vec![Value::Integer(1)]);
        let a = Value::tuple(vec![inner.clone(), inner.clone()]);
        let b = Value::tuple(vec![inner.clone(), inner]);

        let mut memo = EqualityMemo::default();
        assert!(memo.equal(&a, &b));
        // the outer pair and the shared inner pair
        assert_eq!(memo.results.len(), 2);
    }
}
