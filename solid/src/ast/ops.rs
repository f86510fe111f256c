//! Operator vocabulary shared by the decorator, the passes and the builder

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// `!`
    Not,
    /// `?`
    Emptiness,
    Plus,
    Minus,
}

impl UnaryOperator {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "!" => Self::Not,
            "?" => Self::Emptiness,
            "+" => Self::Plus,
            "-" => Self::Minus,
            _ => return None,
        })
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Emptiness => "?",
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCategory {
    Arithmetic,
    Comparative,
    Equality,
    Logical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Exp,
    Mul,
    Div,
    Add,
    Sub,
    Lt,
    Gt,
    Le,
    Ge,
    /// `!<`
    Nlt,
    /// `!>`
    Ngt,
    /// `===`
    Is,
    /// `!==`
    Isnt,
    Eq,
    Neq,
    And,
    /// `!&`
    Nand,
    Or,
    /// `!|`
    Nor,
}

impl BinaryOperator {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "^" => Self::Exp,
            "*" => Self::Mul,
            "/" => Self::Div,
            "+" => Self::Add,
            "-" => Self::Sub,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "!<" => Self::Nlt,
            "!>" => Self::Ngt,
            "===" => Self::Is,
            "!==" => Self::Isnt,
            "==" => Self::Eq,
            "!=" => Self::Neq,
            "&&" => Self::And,
            "!&" => Self::Nand,
            "||" => Self::Or,
            "!|" => Self::Nor,
            _ => return None,
        })
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Exp => "^",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Nlt => "!<",
            Self::Ngt => "!>",
            Self::Is => "===",
            Self::Isnt => "!==",
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::And => "&&",
            Self::Nand => "!&",
            Self::Or => "||",
            Self::Nor => "!|",
        }
    }

    pub fn category(self) -> OperatorCategory {
        match self {
            Self::Exp | Self::Mul | Self::Div | Self::Add | Self::Sub => {
                OperatorCategory::Arithmetic
            }
            Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::Nlt | Self::Ngt => {
                OperatorCategory::Comparative
            }
            Self::Is | Self::Isnt | Self::Eq | Self::Neq => OperatorCategory::Equality,
            Self::And | Self::Nand | Self::Or | Self::Nor => OperatorCategory::Logical,
        }
    }
}
