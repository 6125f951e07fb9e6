//! Interpreter faults
//!
//! A fault means the program or the interpreter left the modeled subset. It
//! is never a program outcome: outcomes are [`Outcome`](crate::Outcome)
//! values, faults are [`VmError`]s.

use jstep_bytecode::{BytecodeError, MethodId};
use thiserror::Error;

use crate::value::{HeapRef, Value};

/// VM execution faults
#[derive(Debug, Error)]
pub enum VmError {
    /// Pop or peek on an empty operand stack
    #[error("operand stack underflow")]
    StackUnderflow,

    /// An operand had the wrong tag
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected tag or kind
        expected: &'static str,
        /// What was found
        found: String,
    },

    /// Read of a local slot that was never written
    #[error("read of unset local {0}")]
    UnsetLocal(u16),

    /// Stepping with no active frame
    #[error("call stack is empty")]
    EmptyCallStack,

    /// The program counter left the method body
    #[error("program counter {method}:{offset} is outside the method body")]
    PcOutOfRange {
        /// Method being executed
        method: String,
        /// Offending offset
        offset: usize,
    },

    /// The bytecode provider could not resolve a method
    #[error("unresolved method {method}: {source}")]
    UnresolvedMethod {
        /// Method that failed to resolve
        method: String,
        /// Provider error
        #[source]
        source: BytecodeError,
    },

    /// A built-in method without a modeled behavior
    #[error("unmodeled built-in method {0}")]
    UnmodeledMethod(String),

    /// A reference to an id with no heap record
    #[error("reference {0} does not name a heap object")]
    MissingObject(HeapRef),

    /// `new_array` with a length above the configured maximum, or one whose
    /// storage could not be reserved
    #[error("array of {len} elements is too large to allocate")]
    ArrayTooLarge {
        /// Requested length
        len: usize,
    },

    /// Every heap id has been handed out
    #[error("heap exhausted: no fresh reference ids left")]
    HeapExhausted,

    /// Instance field read of a field the object does not have
    #[error("object of class {class} has no field {field}")]
    MissingField {
        /// Class of the receiver
        class: String,
        /// Field name
        field: String,
    },

    /// Static field read before any write, with strict statics enabled
    #[error("static field {0} read before initialization")]
    UninitializedStatic(String),

    /// Method descriptor or argument tuple does not describe a valid call
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),

    /// Bytecode error
    #[error("bytecode error: {0}")]
    Bytecode(#[from] BytecodeError),

    /// A fault raised while executing a particular instruction
    #[error("{source} (at {method}:{offset})")]
    AtInstruction {
        /// Method being executed
        method: String,
        /// Offset of the faulting instruction
        offset: usize,
        /// Underlying fault
        #[source]
        source: Box<VmError>,
    },
}

impl VmError {
    /// Create a type mismatch for an unexpected value
    pub fn type_mismatch(expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: format!("{} {}", found.tag(), found),
        }
    }

    /// Create a type mismatch with a free-form description of what was found
    pub fn kind_mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.into(),
        }
    }

    /// Create an invalid invocation error
    pub fn invalid_invocation(msg: impl Into<String>) -> Self {
        Self::InvalidInvocation(msg.into())
    }

    /// Attach the location of the faulting instruction
    pub fn at(self, method: &MethodId, offset: usize) -> Self {
        match self {
            located @ Self::AtInstruction { .. } => located,
            other => Self::AtInstruction {
                method: method.to_string(),
                offset,
                source: Box::new(other),
            },
        }
    }

    /// The fault with any location wrapper removed
    pub fn root(&self) -> &Self {
        match self {
            Self::AtInstruction { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for VM operations
pub type VmResult<T> = std::result::Result<T, VmError>;
