//! Literal operands of `push`

use std::fmt;

use serde::{Deserialize, Serialize};

/// A literal value pushed by the `push` instruction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// 32-bit signed integer
    Int(i32),
    /// Boolean (widened to an int when pushed)
    Boolean(bool),
    /// 32-bit float
    Float(f32),
    /// The null reference
    Null,
}

impl Literal {
    /// Create an int literal
    #[inline]
    pub fn int(n: i32) -> Self {
        Self::Int(n)
    }

    /// Create a boolean literal
    #[inline]
    pub fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Get as int, if this is an int literal
    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Check if this is the null literal
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Null => f.write_str("null"),
        }
    }
}
