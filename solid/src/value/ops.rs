//! Operator evaluation on compile-time values.
//!
//! `None` means the operator does not apply to the operands; the type
//! checker rejects those programs before folding is attempted.

use super::Value;
use crate::ast::{BinaryOperator, OperatorCategory, UnaryOperator};
use crate::error::NanErrorKind;

type Folded = Result<Option<Value>, NanErrorKind>;

enum Numbers {
    Ints(i32, i32),
    Floats(f64, f64),
}

fn numbers(left: &Value, right: &Value) -> Option<Numbers> {
    Some(match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Numbers::Ints(*a, *b),
        (Value::Integer(a), Value::Float(b)) => Numbers::Floats(f64::from(*a), *b),
        (Value::Float(a), Value::Integer(b)) => Numbers::Floats(*a, f64::from(*b)),
        (Value::Float(a), Value::Float(b)) => Numbers::Floats(*a, *b),
        _ => return None,
    })
}

/// Integer power; a negative exponent gives `1 / b^|e|` truncated
fn int_pow(base: i32, exponent: i32) -> Result<i32, NanErrorKind> {
    if exponent >= 0 {
        return Ok(base.wrapping_pow(exponent.unsigned_abs()));
    }
    match base.wrapping_pow(exponent.unsigned_abs()) {
        0 => Err(NanErrorKind::DivideByZero),
        power => Ok(1 / power),
    }
}

fn float_result(x: f64) -> Folded {
    if x.is_nan() {
        Err(NanErrorKind::NotANumber)
    } else {
        Ok(Some(Value::Float(x)))
    }
}

impl Value {
    pub fn apply_unary(&self, op: UnaryOperator) -> Option<Value> {
        match (op, self) {
            (UnaryOperator::Not, v) => Some(Value::Boolean(v.is_falsy())),
            (UnaryOperator::Emptiness, v) => Some(Value::Boolean(v.is_empty())),
            (UnaryOperator::Plus, Value::Integer(_) | Value::Float(_)) => Some(self.clone()),
            (UnaryOperator::Minus, Value::Integer(i)) => Some(Value::Integer(i.wrapping_neg())),
            (UnaryOperator::Minus, Value::Float(x)) => Some(Value::Float(-x)),
            _ => None,
        }
    }

    pub fn apply_binary(&self, op: BinaryOperator, right: &Value) -> Folded {
        match op.category() {
            OperatorCategory::Arithmetic => arithmetic(op, self, right),
            OperatorCategory::Comparative => Ok(comparison(op, self, right)),
            OperatorCategory::Equality => Ok(Some(Value::Boolean(match op {
                BinaryOperator::Is => self.identical(right),
                BinaryOperator::Isnt => !self.identical(right),
                BinaryOperator::Eq => self.equal(right),
                _ => !self.equal(right),
            }))),
            OperatorCategory::Logical => Ok(Some(logical(op, self, right))),
        }
    }
}

fn arithmetic(op: BinaryOperator, left: &Value, right: &Value) -> Folded {
    match numbers(left, right) {
        Some(Numbers::Ints(a, b)) => Ok(Some(Value::Integer(match op {
            BinaryOperator::Add => a.wrapping_add(b),
            BinaryOperator::Sub => a.wrapping_sub(b),
            BinaryOperator::Mul => a.wrapping_mul(b),
            BinaryOperator::Div if b == 0 => return Err(NanErrorKind::DivideByZero),
            // `i32.div_s` traps on the one quotient that overflows
            BinaryOperator::Div => a.checked_div(b).ok_or(NanErrorKind::NotANumber)?,
            BinaryOperator::Exp => int_pow(a, b)?,
            _ => return Ok(None),
        }))),
        Some(Numbers::Floats(a, b)) => float_result(match op {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            BinaryOperator::Mul => a * b,
            BinaryOperator::Div => a / b,
            BinaryOperator::Exp => a.powf(b),
            _ => return Ok(None),
        }),
        None => Ok(None),
    }
}

fn comparison(op: BinaryOperator, left: &Value, right: &Value) -> Option<Value> {
    let (lt, gt, le, ge) = match numbers(left, right)? {
        Numbers::Ints(a, b) => (a < b, a > b, a <= b, a >= b),
        Numbers::Floats(a, b) => (a < b, a > b, a <= b, a >= b),
    };
    Some(Value::Boolean(match op {
        BinaryOperator::Lt => lt,
        BinaryOperator::Gt => gt,
        BinaryOperator::Le => le,
        BinaryOperator::Ge => ge,
        BinaryOperator::Nlt => !lt,
        BinaryOperator::Ngt => !gt,
        _ => return None,
    }))
}

/// `&&` and `||` yield one of their operands; `!&` and `!|` negate that
fn logical(op: BinaryOperator, left: &Value, right: &Value) -> Value {
    let pick = |conjunctive: bool| {
        if left.is_falsy() == conjunctive {
            left.clone()
        } else {
            right.clone()
        }
    };
    match op {
        BinaryOperator::And => pick(true),
        BinaryOperator::Or => pick(false),
        BinaryOperator::Nand => Value::Boolean(pick(true).is_falsy()),
        _ => Value::Boolean(pick(false).is_falsy()),
    }
}
