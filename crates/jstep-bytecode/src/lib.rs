//! # jstep Bytecode
//!
//! This crate defines the instruction set executed by the jstep interpreter
//! and the ways of obtaining it.
//!
//! ## Design Principles
//!
//! - **Stack-based**: Instructions work on a per-frame operand stack
//! - **Closed**: [`Instruction`] is a closed enum, matched exhaustively
//! - **Keyed by descriptor**: Methods are identified by class, name, and [`Descriptor`]
//! - **Serializable**: Class files are JSON, one file per class

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod class;
pub mod constant;
pub mod descriptor;
pub mod error;
pub mod instruction;
pub mod method;
pub mod operand;
pub mod provider;

pub use class::{ClassFile, MethodDef};
pub use constant::Literal;
pub use descriptor::{Descriptor, TypeCode};
pub use error::BytecodeError;
pub use instruction::{BinaryOp, Condition, Instruction, InvokeKind};
pub use method::{FieldId, MethodId};
pub use operand::{JumpTarget, LocalIndex};
pub use provider::{BytecodeProvider, MemoryProvider, Suite};
