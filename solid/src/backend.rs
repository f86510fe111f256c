//! Module post-processing.
//!
//! - `optimize`: drop empty statements and collect the runtime helpers the
//!   module calls
//! - `validate`: check storage declarations and operand representations;
//!   any failure aborts the compilation

use std::collections::{BTreeSet, HashMap};

use crate::builder::{Instruction, UnaryOp};
use crate::error::SolidError;

pub fn optimize(module: Instruction) -> Result<Instruction, SolidError> {
    let Instruction::Module {
        globals,
        locals,
        statements,
        ..
    } = module
    else {
        return Err(SolidError::validation("optimize expects a module"));
    };

    let statements: Vec<Instruction> = statements
        .into_iter()
        .filter(|s| !matches!(s, Instruction::Statement { body, .. } if **body == Instruction::Nop))
        .enumerate()
        .map(|(index, statement)| match statement {
            Instruction::Statement { body, .. } => Instruction::Statement { index, body },
            other => other,
        })
        .collect();

    let mut helpers = BTreeSet::new();
    for instruction in globals.iter().chain(&statements) {
        instruction.collect_helpers(&mut helpers);
    }

    Ok(Instruction::Module {
        helpers: helpers.into_iter().collect(),
        globals,
        locals,
        statements,
    })
}

#[derive(Debug, Default)]
struct Storage {
    locals: HashMap<String, bool>,
    /// name → (float, mutable)
    globals: HashMap<String, (bool, bool)>,
}

pub fn validate(module: &Instruction) -> Result<(), SolidError> {
    let Instruction::Module {
        globals,
        locals,
        statements,
        ..
    } = module
    else {
        return Err(SolidError::validation("validate expects a module"));
    };

    let mut storage = Storage::default();
    for local in locals {
        let Instruction::DeclareLocal { name, float } = local else {
            return Err(SolidError::validation(format!("`{local}` is not a local declaration")));
        };
        if storage.locals.insert(name.clone(), *float).is_some() {
            return Err(SolidError::validation(format!("local {name} declared twice")));
        }
    }
    for global in globals {
        let Instruction::DeclareGlobal {
            name,
            float,
            mutable,
            init,
        } = global
        else {
            return Err(SolidError::validation(format!("`{global}` is not a global declaration")));
        };
        if init.is_float() != *float {
            return Err(SolidError::validation(format!(
                "initializer of {name} does not match its type"
            )));
        }
        if storage
            .globals
            .insert(name.clone(), (*float, *mutable))
            .is_some()
        {
            return Err(SolidError::validation(format!("global {name} declared twice")));
        }
    }

    statements.iter().try_for_each(|s| check(s, &storage))
}

fn check(instruction: &Instruction, storage: &Storage) -> Result<(), SolidError> {
    let mismatch = || {
        SolidError::validation(format!(
            "operand representations disagree in `{instruction}`"
        ))
    };
    let local = |name: &str| {
        storage
            .locals
            .get(name)
            .copied()
            .ok_or_else(|| SolidError::validation(format!("undeclared local {name}")))
    };
    let global = |name: &str| {
        storage
            .globals
            .get(name)
            .copied()
            .ok_or_else(|| SolidError::validation(format!("undeclared global {name}")))
    };

    match instruction {
        Instruction::LocalGet { name, float } => {
            if local(name)? != *float {
                return Err(mismatch());
            }
        }
        Instruction::LocalSet { name, value } => {
            if local(name)? != value.is_float() {
                return Err(mismatch());
            }
        }
        Instruction::GlobalGet { name, float } => {
            if global(name)?.0 != *float {
                return Err(mismatch());
            }
        }
        Instruction::GlobalSet { name, value } => {
            let (float, mutable) = global(name)?;
            if !mutable {
                return Err(SolidError::validation(format!(
                    "assignment to immutable global {name}"
                )));
            }
            if float != value.is_float() {
                return Err(mismatch());
            }
        }
        Instruction::Convert(value) => {
            if value.is_float() {
                return Err(mismatch());
            }
        }
        Instruction::Unop {
            op: UnaryOp::Neg,
            float,
            operand,
        } if operand.is_float() != *float => return Err(mismatch()),
        Instruction::Binop {
            float, left, right, ..
        }
        | Instruction::Comparison {
            float, left, right, ..
        } => {
            if left.is_float() != *float || right.is_float() != *float {
                return Err(mismatch());
            }
        }
        Instruction::Logical {
            temp,
            float,
            left,
            right,
            ..
        } => {
            if local(temp)? != *float || left.is_float() != *float || right.is_float() != *float {
                return Err(mismatch());
            }
        }
        Instruction::Cond {
            float,
            condition,
            consequence,
            alternative,
        } => {
            if condition.is_float()
                || consequence.is_float() != *float
                || alternative.is_float() != *float
            {
                return Err(mismatch());
            }
        }
        _ => {}
    }

    instruction
        .children()
        .into_iter()
        .try_for_each(|child| check(child, storage))
}
