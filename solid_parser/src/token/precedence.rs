//! Operator precedence and associativity definitions

use super::Token;

/// Operator precedence levels, loosest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i8)]
pub enum Precedence {
    /// Entry level for a full expression
    Lowest = 0,
    /// `||`, `!|`
    Disjunctive = 1,
    /// `&&`, `!&`
    Conjunctive = 2,
    /// `===`, `!==`, `==`, `!=`
    Equality = 3,
    /// `<`, `>`, `<=`, `>=`, `!<`, `!>`
    Comparative = 4,
    /// `+`, `-`
    Additive = 5,
    /// `*`, `/`
    Multiplicative = 6,
    /// `^`
    Exponential = 7,
    /// Prefix `!`, `?`, `+`, `-`
    Unary = 8,
    /// Access and call
    Postfix = 9,
}

impl TryFrom<i8> for Precedence {
    type Error = ();

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Precedence::Lowest),
            1 => Ok(Precedence::Disjunctive),
            2 => Ok(Precedence::Conjunctive),
            3 => Ok(Precedence::Equality),
            4 => Ok(Precedence::Comparative),
            5 => Ok(Precedence::Additive),
            6 => Ok(Precedence::Multiplicative),
            7 => Ok(Precedence::Exponential),
            8 => Ok(Precedence::Unary),
            9 => Ok(Precedence::Postfix),
            _ => Err(()),
        }
    }
}

impl Precedence {
    /// The next tighter level (saturating at [`Precedence::Postfix`])
    pub fn tighter(self) -> Precedence {
        Precedence::try_from(self as i8 + 1).unwrap_or(Precedence::Postfix)
    }
}

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

impl Token {
    /// Get the precedence and associativity of a binary operator
    pub fn binary_precedence(&self) -> Option<(Precedence, Associativity)> {
        use Associativity::{Left, Right};
        use Precedence::*;

        Some(match self {
            Token::OrOr | Token::Nor => (Disjunctive, Left),
            Token::AndAnd | Token::Nand => (Conjunctive, Left),
            Token::EqEqEq | Token::NotEqEq | Token::EqEq | Token::NotEq => (Equality, Left),
            Token::Lt | Token::Gt | Token::LtEq | Token::GtEq | Token::NotLt | Token::NotGt => {
                (Comparative, Left)
            }
            Token::Plus | Token::Minus => (Additive, Left),
            Token::Star | Token::Slash => (Multiplicative, Left),
            Token::Caret => (Exponential, Right),
            _ => return None,
        })
    }

    /// Check if this token is a binary operator
    pub fn is_binary_operator(&self) -> bool {
        self.binary_precedence().is_some()
    }
}
