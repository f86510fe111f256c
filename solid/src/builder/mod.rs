//! Instruction building.
//!
//! The [`Builder`] carries the per-module counters while the semantic tree
//! is lowered: statement indices, temporary locals and global slots. Each
//! variable symbol is bound to one [`Slot`].

pub mod binary;
mod instr;

pub use instr::{
    ArithmeticOp, ComparisonOp, Helper, Instruction, LogicalOp, RepresentationMismatch, UnaryOp,
};

use std::collections::HashMap;

use solid_parser::Span;

use crate::error::SolidError;

/// Storage chosen for a variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Global { name: String, float: bool },
    Local { name: String, float: bool },
}

#[derive(Debug, Default)]
pub struct Builder {
    statement_count: usize,
    temp_count: usize,
    global_count: usize,
    slots: HashMap<usize, Slot>,
    globals: Vec<Instruction>,
    locals: Vec<Instruction>,
    statements: Vec<Instruction>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for the next statement comment
    pub fn next_statement(&mut self) -> usize {
        let index = self.statement_count;
        self.statement_count += 1;
        index
    }

    /// Declare a fresh scratch local and return its name
    pub fn temp_local(&mut self, float: bool) -> String {
        let name = format!("$tmp{}", self.temp_count);
        self.temp_count += 1;
        self.locals.push(Instruction::DeclareLocal {
            name: name.clone(),
            float,
        });
        name
    }

    /// Bind symbol `id` to a new immutable global initialized by `init`
    pub fn declare_global(&mut self, id: usize, init: Instruction) -> String {
        let name = format!("$glb{}", self.global_count);
        self.global_count += 1;
        let float = init.is_float();
        self.globals.push(Instruction::DeclareGlobal {
            name: name.clone(),
            float,
            mutable: false,
            init: Box::new(init),
        });
        self.slots.insert(
            id,
            Slot::Global {
                name: name.clone(),
                float,
            },
        );
        name
    }

    /// Bind symbol `id` to the function local `$var<id>`
    pub fn declare_local(&mut self, id: usize, float: bool) -> String {
        let name = format!("$var{id}");
        self.locals.push(Instruction::DeclareLocal {
            name: name.clone(),
            float,
        });
        self.slots.insert(
            id,
            Slot::Local {
                name: name.clone(),
                float,
            },
        );
        name
    }

    pub fn slot(&self, id: usize) -> Option<&Slot> {
        self.slots.get(&id)
    }

    /// Read instruction for symbol `id`
    pub fn read(&self, id: usize, span: Span) -> Result<Instruction, SolidError> {
        match self.slot(id) {
            Some(Slot::Global { name, float }) => Ok(Instruction::GlobalGet {
                name: name.clone(),
                float: *float,
            }),
            Some(Slot::Local { name, float }) => Ok(Instruction::LocalGet {
                name: name.clone(),
                float: *float,
            }),
            None => Err(SolidError::internal(
                format!("symbol #{id} read before it was given storage"),
                span,
            )),
        }
    }

    pub fn push_statement(&mut self, statement: Instruction) {
        self.statements.push(statement);
    }

    /// Assemble the module. Helpers are filled in by the backend.
    pub fn finish(self) -> Instruction {
        Instruction::Module {
            helpers: Vec::new(),
            globals: self.globals,
            locals: self.locals,
            statements: self.statements,
        }
    }
}
