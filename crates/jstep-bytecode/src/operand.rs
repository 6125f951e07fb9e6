//! Bytecode operands

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index into a frame's local slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalIndex(pub u16);

impl LocalIndex {
    /// Create a new local index
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Get index value
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl From<u16> for LocalIndex {
    fn from(index: u16) -> Self {
        Self(index)
    }
}

impl fmt::Display for LocalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute branch target: an offset into the owning method's instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JumpTarget(pub u32);

impl JumpTarget {
    /// Create a new jump target
    #[inline]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Target offset as an instruction index
    #[inline]
    pub const fn offset(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
