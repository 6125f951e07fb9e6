//! # jstep Core
//!
//! Small-step interpreter for a bounded subset of JVM bytecode.
//!
//! ## Design Principles
//!
//! - **Small-step**: [`Interpreter::step`] executes one instruction and
//!   returns either the next [`ExecutionState`] or a terminal [`Outcome`]
//! - **Owned state**: Each run owns its heap, call stack, and static fields
//! - **Bounded**: Runs stop after a fixed number of steps
//! - **Two tiers**: Program outcomes are [`Outcome`] values, interpreter
//!   faults are [`VmError`]s

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod interpreter;
pub mod invocation;
pub mod method_table;
pub mod object;
pub mod outcome;
pub mod value;

pub use context::{CallFrame, ExecutionState, ProgramCounter};
pub use error::{VmError, VmResult};
pub use interpreter::{
    DEFAULT_MAX_ARRAY_LEN, DEFAULT_STEP_LIMIT, Interpreter, InterpreterConfig, RunReport, Step,
};
pub use invocation::{Invocation, parse_arguments};
pub use method_table::{DEFAULT_BUILTIN_PACKAGES, MethodBody, MethodTable};
pub use object::Heap;
pub use outcome::Outcome;
pub use value::{HeapRef, Value};
