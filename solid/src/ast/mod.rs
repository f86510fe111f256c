//! Semantic tree.
//!
//! The decorator turns the CST into these nodes. Each node runs four passes,
//! driven from [`Goal`]:
//!
//! 1. `var_check`: resolve names, detect dead-zone reads
//! 2. `type_check`: compute and check types
//! 3. `assess`: compute the compile-time value, if any
//! 4. `build`: lower to an [`crate::builder::Instruction`]
//!
//! Results are memoized per node in a [`Memo`], so a node shared by several
//! consumers is checked once. Re-entering a pass on a node that is still
//! computing is an internal error.

mod expr;
mod ops;
mod stmt;
mod types;

pub use expr::{AccessMode, Accessor, Collection, Expression, ExpressionKind};
pub use ops::{BinaryOperator, OperatorCategory, UnaryOperator};
pub use stmt::{Assignment, DeclarationType, DeclarationVariable, Goal, Statement};
pub use types::{TypeEntryExpression, TypeExpression, TypeExpressionKind, TypeOperator};

use std::cell::RefCell;

use solid_parser::Span;

use crate::error::SolidError;

#[derive(Debug)]
enum MemoState<T> {
    Empty,
    Computing,
    Ready(Result<T, SolidError>),
}

/// A pass result cached on its node
#[derive(Debug)]
pub struct Memo<T> {
    state: RefCell<MemoState<T>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            state: RefCell::new(MemoState::Empty),
        }
    }
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result or run `compute` once and cache it, errors
    /// included
    pub fn get_or_compute(
        &self,
        pass: &str,
        span: Span,
        compute: impl FnOnce() -> Result<T, SolidError>,
    ) -> Result<T, SolidError> {
        match &*self.state.borrow() {
            MemoState::Ready(result) => return result.clone(),
            MemoState::Computing => {
                return Err(SolidError::internal(format!("{pass} re-entered"), span));
            }
            MemoState::Empty => {}
        }
        *self.state.borrow_mut() = MemoState::Computing;
        let result = compute();
        *self.state.borrow_mut() = MemoState::Ready(result.clone());
        result
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.borrow(), MemoState::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_computes_once() {
        let memo: Memo<i32> = Memo::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = memo.get_or_compute("assess", Span::empty(), || {
                calls += 1;
                Ok(7)
            });
            assert_eq!(value.unwrap(), 7);
        }
        assert_eq!(calls, 1);
        assert!(memo.is_ready());
    }

    #[test]
    fn test_memo_reentry_is_internal_error() {
        let memo: Memo<i32> = Memo::new();
        let result = memo.get_or_compute("type_check", Span::empty(), || {
            memo.get_or_compute("type_check", Span::empty(), || Ok(1))
        });
        assert_eq!(result.unwrap_err().code(), 9900);
    }

    #[test]
    fn test_memo_caches_errors() {
        let memo: Memo<()> = Memo::new();
        let first = memo.get_or_compute("var_check", Span::empty(), || {
            Err(SolidError::validation("boom"))
        });
        let second = memo.get_or_compute("var_check", Span::empty(), || Ok(()));
        assert_eq!(first, second);
    }
}
