//! Bytecode instructions
//!
//! Stack-based instruction set. Operands are taken from the active frame's
//! operand stack; branch targets are absolute offsets into the owning
//! method's instruction sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constant::Literal;
use crate::descriptor::TypeCode;
use crate::method::{FieldId, MethodId};
use crate::operand::{JumpTarget, LocalIndex};

/// Integer arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    /// Addition: lhs + rhs
    Add,
    /// Subtraction: lhs - rhs
    Sub,
    /// Multiplication: lhs * rhs
    Mul,
    /// Truncating division: lhs / rhs
    Div,
    /// Remainder: lhs % rhs
    Rem,
}

impl BinaryOp {
    /// Whether a zero right operand must be rejected
    #[inline]
    pub const fn checks_zero_divisor(self) -> bool {
        matches!(self, Self::Div | Self::Rem)
    }

    /// Get opcode name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Rem => "rem",
        }
    }
}

/// Branch conditions
///
/// The six relational codes apply to ints, `Is`/`IsNot` to references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Same reference (or null, for the zero-comparison form)
    Is,
    /// Different reference (or non-null, for the zero-comparison form)
    IsNot,
}

impl Condition {
    /// Whether this condition compares references rather than ints
    #[inline]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Is | Self::IsNot)
    }

    /// Get condition name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Is => "is",
            Self::IsNot => "isnot",
        }
    }
}

/// How a method is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokeKind {
    /// No receiver
    Static,
    /// Constructors, private and super calls
    Special,
    /// Instance call, resolved against the named class only
    Virtual,
    /// Interface call, resolved against the named class only
    Interface,
}

impl InvokeKind {
    /// Whether the callee takes a receiver in local slot 0
    #[inline]
    pub const fn has_receiver(self) -> bool {
        !matches!(self, Self::Static)
    }

    /// Get invoke kind name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Special => "special",
            Self::Virtual => "virtual",
            Self::Interface => "interface",
        }
    }
}

/// A single bytecode instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "opr", rename_all = "snake_case")]
pub enum Instruction {
    // ==================== Stack ====================
    /// Push a literal
    Push {
        /// Value to push
        value: Literal,
    },
    /// Duplicate the top of the operand stack
    Dup,
    /// Discard the top of the operand stack
    Pop,

    // ==================== Locals ====================
    /// Push `locals[index]`
    Load {
        /// Declared slot type
        #[serde(rename = "type")]
        ty: TypeCode,
        /// Slot index
        index: LocalIndex,
    },
    /// Pop into `locals[index]`
    Store {
        /// Declared slot type
        #[serde(rename = "type")]
        ty: TypeCode,
        /// Slot index
        index: LocalIndex,
    },
    /// `locals[index] += amount` on an int slot
    Incr {
        /// Slot index
        index: LocalIndex,
        /// Signed increment
        amount: i32,
    },

    // ==================== Arithmetic ====================
    /// Pop rhs, pop lhs, push `lhs op rhs`
    Binary {
        /// Operator
        #[serde(rename = "operant")]
        op: BinaryOp,
    },
    /// Pop an int, push its negation
    Negate,

    // ==================== Control Flow ====================
    /// Pop one operand and compare it with zero (ints) or null (references)
    Ifz {
        /// Condition
        condition: Condition,
        /// Taken branch target
        target: JumpTarget,
    },
    /// Pop rhs, pop lhs, and compare them
    If {
        /// Condition
        condition: Condition,
        /// Taken branch target
        target: JumpTarget,
    },
    /// Unconditional branch
    Goto {
        /// Branch target
        target: JumpTarget,
    },

    // ==================== Fields ====================
    /// Read a static field, or pop a receiver and read an instance field
    Get {
        /// Static or instance access
        #[serde(rename = "static")]
        is_static: bool,
        /// Field reference
        field: FieldId,
    },
    /// Pop a value (and a receiver for instance fields) and write the field
    Put {
        /// Static or instance access
        #[serde(rename = "static")]
        is_static: bool,
        /// Field reference
        field: FieldId,
    },

    // ==================== Objects ====================
    /// Allocate an uninitialized object of `class`
    New {
        /// Dotted class name
        class: String,
    },
    /// Pop a length and allocate an array
    NewArray {
        /// Element type
        #[serde(rename = "type")]
        element: TypeCode,
    },
    /// Pop index, pop array reference, push element
    ArrayLoad {
        /// Element type
        #[serde(rename = "type")]
        element: TypeCode,
    },
    /// Pop value, pop index, pop array reference, store element
    ArrayStore {
        /// Element type
        #[serde(rename = "type")]
        element: TypeCode,
    },
    /// Pop array reference, push its length
    ArrayLength,

    // ==================== Calls ====================
    /// Invoke a method
    Invoke {
        /// Invocation kind
        #[serde(rename = "access")]
        kind: InvokeKind,
        /// Target method
        method: MethodId,
    },
    /// Return from the current method, with a value unless `ty` is `None`
    Return {
        /// Returned type, `None` for void returns
        #[serde(rename = "type", default)]
        ty: Option<TypeCode>,
    },
    /// Pop an exception reference and unwind the current frame
    Throw,
}

impl Instruction {
    /// Get opcode name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Push { .. } => "push",
            Self::Dup => "dup",
            Self::Pop => "pop",
            Self::Load { .. } => "load",
            Self::Store { .. } => "store",
            Self::Incr { .. } => "incr",
            Self::Binary { .. } => "binary",
            Self::Negate => "negate",
            Self::Ifz { .. } => "ifz",
            Self::If { .. } => "if",
            Self::Goto { .. } => "goto",
            Self::Get { .. } => "get",
            Self::Put { .. } => "put",
            Self::New { .. } => "new",
            Self::NewArray { .. } => "new_array",
            Self::ArrayLoad { .. } => "array_load",
            Self::ArrayStore { .. } => "array_store",
            Self::ArrayLength => "array_length",
            Self::Invoke { .. } => "invoke",
            Self::Return { .. } => "return",
            Self::Throw => "throw",
        }
    }

    /// Branch target, for instructions that may jump
    pub fn branch_target(&self) -> Option<JumpTarget> {
        match self {
            Self::Ifz { target, .. } | Self::If { target, .. } | Self::Goto { target } => {
                Some(*target)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::Push { value } => write!(f, "{name} {value}"),
            Self::Load { ty, index } | Self::Store { ty, index } => {
                write!(f, "{name}:{ty} {index}")
            }
            Self::Incr { index, amount } => write!(f, "{name} {index} {amount}"),
            Self::Binary { op } => write!(f, "{name}:I {}", op.name()),
            Self::Ifz { condition, target } | Self::If { condition, target } => {
                write!(f, "{name} {} {target}", condition.name())
            }
            Self::Goto { target } => write!(f, "{name} {target}"),
            Self::Get { is_static, field } | Self::Put { is_static, field } => {
                let access = if *is_static { "static" } else { "field" };
                write!(f, "{name}:{access} {field}")
            }
            Self::New { class } => write!(f, "{name} {class}"),
            Self::NewArray { element }
            | Self::ArrayLoad { element }
            | Self::ArrayStore { element } => write!(f, "{name}:{element}"),
            Self::Invoke { kind, method } => write!(f, "{name}:{} {method}", kind.name()),
            Self::Return { ty: Some(ty) } => write!(f, "{name}:{ty}"),
            Self::Return { ty: None } => write!(f, "{name}:V"),
            Self::Dup | Self::Pop | Self::Negate | Self::ArrayLength | Self::Throw => {
                f.write_str(name)
            }
        }
    }
}
