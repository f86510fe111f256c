// Trace output goes through `diagnostics::solid_trace_log`, never eprintln!().
#![deny(clippy::print_stderr)]

// Values and the type lattice
pub mod types;
pub mod value;

// Semantic tree and the passes over it
pub mod ast;
pub mod validator;

// Decoration: CST -> semantic tree
pub mod decorate;

// Instruction tree, binary image and module checks
pub mod backend;
pub mod builder;

pub mod config;
pub mod diagnostics;
pub mod error;

// Rust API for programmatic use
pub mod api;
pub use api::{check, compile, decode, emit_ir_json, parse_type, print, print_with_diagnostics};

pub use builder::binary::{BinaryError, ModuleImage};
pub use config::SolidConfig;
pub use error::SolidError;
pub use types::SolidType;
pub use value::Value;
