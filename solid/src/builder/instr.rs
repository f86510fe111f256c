//! Instruction tree.
//!
//! Every expression instruction knows its representation: `is_float()` is
//! true for f64 results and false for i32 results (ints, booleans, null).
//! The same tree is rendered as WebAssembly-style text here and encoded as
//! a binary image in [`super::binary`].

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::display::format_float;

/// Operands of a numeric instruction disagree on i32 vs f64
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operand representations disagree in {0}")]
pub struct RepresentationMismatch(pub &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    /// Logical negation through `$inot` / `$fnot`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Exp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Lt,
    Gt,
    Le,
    Ge,
    /// `!<`
    Nlt,
    /// `!>`
    Ngt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

/// Runtime support functions emitted into the module on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Helper {
    /// `Math.pow`, imported
    Fexp,
    Inot,
    Fnot,
    Fid,
    IFId,
    FIId,
    IFEq,
    FIEq,
    Exp,
}

impl Helper {
    /// Helpers this one calls
    pub fn dependencies(self) -> &'static [Helper] {
        match self {
            Helper::FIId => &[Helper::IFId],
            Helper::FIEq => &[Helper::IFEq],
            _ => &[],
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Helper::Fexp => r#"(import "Math" "pow" (func $fexp (param f64 f64) (result f64)))"#,
            Helper::Inot => "(func $inot (param $x i32) (result i32) (i32.eqz (local.get $x)))",
            Helper::Fnot => {
                "(func $fnot (param $x f64) (result i32) (f64.eq (local.get $x) (f64.const 0)))"
            }
            Helper::Fid => {
                "(func $fid (param $a f64) (param $b f64) (result i32) \
                 (i64.eq (i64.reinterpret_f64 (local.get $a)) (i64.reinterpret_f64 (local.get $b))))"
            }
            Helper::IFId => {
                "(func $i_f_id (param $a i32) (param $b f64) (result i32) \
                 (i64.eq (i64.reinterpret_f64 (f64.convert_i32_s (local.get $a))) (i64.reinterpret_f64 (local.get $b))))"
            }
            Helper::FIId => {
                "(func $f_i_id (param $a f64) (param $b i32) (result i32) \
                 (call $i_f_id (local.get $b) (local.get $a)))"
            }
            Helper::IFEq => {
                "(func $i_f_eq (param $a i32) (param $b f64) (result i32) \
                 (f64.eq (f64.convert_i32_s (local.get $a)) (local.get $b)))"
            }
            Helper::FIEq => {
                "(func $f_i_eq (param $a f64) (param $b i32) (result i32) \
                 (call $i_f_eq (local.get $b) (local.get $a)))"
            }
            Helper::Exp => {
                "(func $exp (param $b i32) (param $e i32) (result i32) (local $r i32) (local $n i32) \
                 (local.set $r (i32.const 1)) \
                 (local.set $n (select (i32.sub (i32.const 0) (local.get $e)) (local.get $e) (i32.lt_s (local.get $e) (i32.const 0)))) \
                 (block $done (loop $next (br_if $done (i32.eqz (local.get $n))) \
                 (local.set $r (i32.mul (local.get $r) (local.get $b))) \
                 (local.set $n (i32.sub (local.get $n) (i32.const 1))) (br $next))) \
                 (if (result i32) (i32.lt_s (local.get $e) (i32.const 0)) \
                 (then (i32.div_s (i32.const 1) (local.get $r))) (else (local.get $r))))"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Nop,
    ConstInt(i32),
    ConstFloat(f64),
    LocalGet {
        name: String,
        float: bool,
    },
    LocalSet {
        name: String,
        value: Box<Instruction>,
    },
    GlobalGet {
        name: String,
        float: bool,
    },
    GlobalSet {
        name: String,
        value: Box<Instruction>,
    },
    /// i32 → f64
    Convert(Box<Instruction>),
    Unop {
        op: UnaryOp,
        float: bool,
        operand: Box<Instruction>,
    },
    Binop {
        op: ArithmeticOp,
        float: bool,
        left: Box<Instruction>,
        right: Box<Instruction>,
    },
    Comparison {
        op: ComparisonOp,
        float: bool,
        left: Box<Instruction>,
        right: Box<Instruction>,
    },
    /// `===` when `identity`, `==` otherwise; operands may differ in
    /// representation
    Equality {
        identity: bool,
        negate: bool,
        left: Box<Instruction>,
        right: Box<Instruction>,
    },
    /// Short-circuit `&&` / `||`; `temp` holds the left operand
    Logical {
        op: LogicalOp,
        temp: String,
        float: bool,
        left: Box<Instruction>,
        right: Box<Instruction>,
    },
    Cond {
        float: bool,
        condition: Box<Instruction>,
        consequence: Box<Instruction>,
        alternative: Box<Instruction>,
    },
    Drop(Box<Instruction>),
    TupleMake(Vec<Instruction>),
    Statement {
        index: usize,
        body: Box<Instruction>,
    },
    DeclareGlobal {
        name: String,
        float: bool,
        mutable: bool,
        init: Box<Instruction>,
    },
    DeclareLocal {
        name: String,
        float: bool,
    },
    Module {
        helpers: Vec<Helper>,
        globals: Vec<Instruction>,
        locals: Vec<Instruction>,
        statements: Vec<Instruction>,
    },
}

impl Instruction {
    pub fn unop(op: UnaryOp, operand: Instruction) -> Self {
        Instruction::Unop {
            op,
            float: operand.is_float(),
            operand: Box::new(operand),
        }
    }

    pub fn binop(
        op: ArithmeticOp,
        left: Instruction,
        right: Instruction,
    ) -> Result<Self, RepresentationMismatch> {
        let float = same_representation("arithmetic", &left, &right)?;
        Ok(Instruction::Binop {
            op,
            float,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn comparison(
        op: ComparisonOp,
        left: Instruction,
        right: Instruction,
    ) -> Result<Self, RepresentationMismatch> {
        let float = same_representation("comparison", &left, &right)?;
        Ok(Instruction::Comparison {
            op,
            float,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn equality(identity: bool, negate: bool, left: Instruction, right: Instruction) -> Self {
        Instruction::Equality {
            identity,
            negate,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(
        op: LogicalOp,
        temp: String,
        left: Instruction,
        right: Instruction,
    ) -> Result<Self, RepresentationMismatch> {
        let float = same_representation("logical operation", &left, &right)?;
        Ok(Instruction::Logical {
            op,
            temp,
            float,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn cond(
        condition: Instruction,
        consequence: Instruction,
        alternative: Instruction,
    ) -> Result<Self, RepresentationMismatch> {
        let float = same_representation("conditional", &consequence, &alternative)?;
        if condition.is_float() {
            return Err(RepresentationMismatch("conditional test"));
        }
        Ok(Instruction::Cond {
            float,
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative: Box::new(alternative),
        })
    }

    /// Widen an i32 value to f64 when `float` is wanted
    pub fn coerce(self, float: bool) -> Self {
        if float && !self.is_float() {
            Instruction::Convert(Box::new(self))
        } else {
            self
        }
    }

    pub fn is_float(&self) -> bool {
        match self {
            Instruction::ConstFloat(_) | Instruction::Convert(_) => true,
            Instruction::LocalGet { float, .. }
            | Instruction::GlobalGet { float, .. }
            | Instruction::Binop { float, .. }
            | Instruction::Logical { float, .. }
            | Instruction::Cond { float, .. } => *float,
            Instruction::Unop { op, float, .. } => *op == UnaryOp::Neg && *float,
            _ => false,
        }
    }

    /// Direct sub-instructions
    pub fn children(&self) -> Vec<&Instruction> {
        match self {
            Instruction::LocalSet { value, .. }
            | Instruction::GlobalSet { value, .. }
            | Instruction::Convert(value)
            | Instruction::Unop { operand: value, .. }
            | Instruction::Drop(value)
            | Instruction::Statement { body: value, .. }
            | Instruction::DeclareGlobal { init: value, .. } => vec![value.as_ref()],
            Instruction::Binop { left, right, .. }
            | Instruction::Comparison { left, right, .. }
            | Instruction::Equality { left, right, .. }
            | Instruction::Logical { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Instruction::Cond {
                condition,
                consequence,
                alternative,
                ..
            } => vec![condition.as_ref(), consequence.as_ref(), alternative.as_ref()],
            Instruction::TupleMake(items) => items.iter().collect(),
            Instruction::Module {
                globals,
                locals,
                statements,
                ..
            } => globals.iter().chain(locals).chain(statements).collect(),
            _ => Vec::new(),
        }
    }

    /// Helpers this instruction calls directly
    fn own_helpers(&self) -> Vec<Helper> {
        match self {
            Instruction::Unop {
                op: UnaryOp::Not,
                float,
                ..
            } => vec![if *float { Helper::Fnot } else { Helper::Inot }],
            Instruction::Binop {
                op: ArithmeticOp::Exp,
                float,
                ..
            } => vec![if *float { Helper::Fexp } else { Helper::Exp }],
            Instruction::Logical { float, .. } => {
                vec![if *float { Helper::Fnot } else { Helper::Inot }]
            }
            Instruction::Equality {
                identity,
                left,
                right,
                ..
            } => match (*identity, left.is_float(), right.is_float()) {
                (true, true, true) => vec![Helper::Fid],
                (true, false, true) => vec![Helper::IFId],
                (true, true, false) => vec![Helper::FIId],
                (false, false, true) => vec![Helper::IFEq],
                (false, true, false) => vec![Helper::FIEq],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Every helper reachable from this tree, dependencies included
    pub fn collect_helpers(&self, into: &mut BTreeSet<Helper>) {
        for helper in self.own_helpers() {
            let mut pending = vec![helper];
            while let Some(h) = pending.pop() {
                if into.insert(h) {
                    pending.extend_from_slice(h.dependencies());
                }
            }
        }
        for child in self.children() {
            child.collect_helpers(into);
        }
    }

    // ==================== Text ====================

    fn write_expr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = |float: bool| if float { "f64" } else { "i32" };

        match self {
            Instruction::Nop => write!(f, "(nop)"),
            Instruction::ConstInt(i) => write!(f, "(i32.const {i})"),
            Instruction::ConstFloat(x) => write!(f, "(f64.const {})", float_literal(*x)),
            Instruction::LocalGet { name, .. } => write!(f, "(local.get {name})"),
            Instruction::LocalSet { name, value } => write!(f, "(local.set {name} {value})"),
            Instruction::GlobalGet { name, .. } => write!(f, "(global.get {name})"),
            Instruction::GlobalSet { name, value } => write!(f, "(global.set {name} {value})"),
            Instruction::Convert(value) => write!(f, "(f64.convert_i32_s {value})"),
            Instruction::Unop {
                op: UnaryOp::Neg,
                float: false,
                operand,
            } => write!(f, "(i32.sub (i32.const 0) {operand})"),
            Instruction::Unop {
                op: UnaryOp::Neg,
                float: true,
                operand,
            } => write!(f, "(f64.neg {operand})"),
            Instruction::Unop {
                op: UnaryOp::Not,
                float,
                operand,
            } => write!(f, "(call {} {operand})", not_helper(*float)),
            Instruction::Binop {
                op,
                float,
                left,
                right,
            } => {
                let opcode = match (op, float) {
                    (ArithmeticOp::Add, _) => format!("{}.add", ty(*float)),
                    (ArithmeticOp::Sub, _) => format!("{}.sub", ty(*float)),
                    (ArithmeticOp::Mul, _) => format!("{}.mul", ty(*float)),
                    (ArithmeticOp::Div, false) => "i32.div_s".to_string(),
                    (ArithmeticOp::Div, true) => "f64.div".to_string(),
                    (ArithmeticOp::Exp, false) => "call $exp".to_string(),
                    (ArithmeticOp::Exp, true) => "call $fexp".to_string(),
                };
                write!(f, "({opcode} {left} {right})")
            }
            Instruction::Comparison {
                op,
                float: false,
                left,
                right,
            } => {
                let opcode = match op {
                    ComparisonOp::Lt => "lt_s",
                    ComparisonOp::Gt => "gt_s",
                    ComparisonOp::Le => "le_s",
                    ComparisonOp::Ge | ComparisonOp::Nlt => "ge_s",
                    ComparisonOp::Ngt => "le_s",
                };
                write!(f, "(i32.{opcode} {left} {right})")
            }
            Instruction::Comparison {
                op,
                float: true,
                left,
                right,
            } => match op {
                ComparisonOp::Lt => write!(f, "(f64.lt {left} {right})"),
                ComparisonOp::Gt => write!(f, "(f64.gt {left} {right})"),
                ComparisonOp::Le => write!(f, "(f64.le {left} {right})"),
                ComparisonOp::Ge => write!(f, "(f64.ge {left} {right})"),
                // NaN makes `!<` differ from `>=`
                ComparisonOp::Nlt => write!(f, "(i32.eqz (f64.lt {left} {right}))"),
                ComparisonOp::Ngt => write!(f, "(i32.eqz (f64.gt {left} {right}))"),
            },
            Instruction::Equality {
                identity,
                negate,
                left,
                right,
            } => {
                let opcode = match (*identity, left.is_float(), right.is_float()) {
                    (_, false, false) => "i32.eq",
                    (true, true, true) => "call $fid",
                    (true, false, true) => "call $i_f_id",
                    (true, true, false) => "call $f_i_id",
                    (false, true, true) => "f64.eq",
                    (false, false, true) => "call $i_f_eq",
                    (false, true, false) => "call $f_i_eq",
                };
                if *negate {
                    write!(f, "(i32.eqz ({opcode} {left} {right}))")
                } else {
                    write!(f, "({opcode} {left} {right})")
                }
            }
            Instruction::Logical {
                op,
                temp,
                float,
                left,
                right,
            } => {
                let keep = format!("(local.get {temp})");
                let other = right.to_string();
                let (then, otherwise) = match op {
                    LogicalOp::And => (keep, other),
                    LogicalOp::Or => (other, keep),
                };
                write!(
                    f,
                    "(if (result {}) (call {} (local.tee {temp} {left})) (then {then}) (else {otherwise}))",
                    ty(*float),
                    not_helper(*float)
                )
            }
            Instruction::Cond {
                float,
                condition,
                consequence,
                alternative,
            } => write!(
                f,
                "(if (result {}) {condition} (then {consequence}) (else {alternative}))",
                ty(*float)
            ),
            Instruction::Drop(value) => write!(f, "(drop {value})"),
            Instruction::TupleMake(items) => {
                write!(f, "(tuple.make")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                write!(f, ")")
            }
            Instruction::Statement { index, body } => write!(f, ";; statement {index}\n{body}"),
            Instruction::DeclareGlobal {
                name,
                float,
                mutable,
                init,
            } => {
                if *mutable {
                    write!(f, "(global {name} (mut {}) {init})", ty(*float))
                } else {
                    write!(f, "(global {name} {} {init})", ty(*float))
                }
            }
            Instruction::DeclareLocal { name, float } => write!(f, "(local {name} {})", ty(*float)),
            Instruction::Module { .. } => self.write_module(f),
        }
    }

    fn write_module(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Instruction::Module {
            helpers,
            globals,
            locals,
            statements,
        } = self
        else {
            return Ok(());
        };

        writeln!(f, "(module")?;
        for helper in helpers {
            writeln!(f, "\t{}", helper.text())?;
        }
        for global in globals {
            writeln!(f, "\t{global}")?;
        }
        writeln!(f, "\t(func (export \"main\")")?;
        for local in locals {
            writeln!(f, "\t\t{local}")?;
        }
        for statement in statements {
            for line in statement.to_string().lines() {
                writeln!(f, "\t\t{line}")?;
            }
        }
        writeln!(f, "\t)")?;
        write!(f, ")")
    }
}

fn same_representation(
    what: &'static str,
    left: &Instruction,
    right: &Instruction,
) -> Result<bool, RepresentationMismatch> {
    if left.is_float() == right.is_float() {
        Ok(left.is_float())
    } else {
        Err(RepresentationMismatch(what))
    }
}

fn not_helper(float: bool) -> &'static str {
    if float {
        "$fnot"
    } else {
        "$inot"
    }
}

fn float_literal(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format_float(x)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_expr(f)
    }
}
