//! Interpreter values
//!
//! Values are a small tagged union. Objects and arrays live in the
//! [`Heap`](crate::object::Heap); a value refers to them only through a
//! nullable [`HeapRef`].
//!
//! ## Stack form
//!
//! Booleans are kept as booleans in locals and fields, but the operand stack
//! only ever holds the JVM computational types: any value placed on the stack
//! goes through [`Value::widen`], which turns `false`/`true` into `0`/`1`.

use std::fmt;

use jstep_bytecode::{BinaryOp, Condition, Literal, TypeCode};

/// Identity of a heap record, assigned once at allocation and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapRef(u32);

impl HeapRef {
    /// Create a heap reference from a raw id
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw id
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for HeapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Value tags, used in type mismatch diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// 32-bit signed integer
    Int,
    /// Boolean
    Boolean,
    /// 32-bit float
    Float,
    /// Nullable reference
    Reference,
}

impl ValueTag {
    /// Tag name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A runtime value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// 32-bit signed integer (also bytes and chars)
    Int(i32),
    /// Boolean, as stored in locals and fields
    Boolean(bool),
    /// 32-bit float
    Float(f32),
    /// Reference to a heap record, `None` for null
    Reference(Option<HeapRef>),
}

impl Value {
    /// The null reference
    pub const NULL: Self = Self::Reference(None);

    /// Create an int value
    #[inline]
    pub const fn int(n: i32) -> Self {
        Self::Int(n)
    }

    /// Create a boolean value
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Create a float value
    #[inline]
    pub const fn float(x: f32) -> Self {
        Self::Float(x)
    }

    /// Create a non-null reference
    #[inline]
    pub const fn reference(r: HeapRef) -> Self {
        Self::Reference(Some(r))
    }

    /// The null reference
    #[inline]
    pub const fn null() -> Self {
        Self::NULL
    }

    /// Tag of this value
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Int(_) => ValueTag::Int,
            Self::Boolean(_) => ValueTag::Boolean,
            Self::Float(_) => ValueTag::Float,
            Self::Reference(_) => ValueTag::Reference,
        }
    }

    /// Get as int
    #[inline]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as reference; the outer `None` means "not a reference"
    #[inline]
    pub const fn as_reference(&self) -> Option<Option<HeapRef>> {
        match self {
            Self::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Check if this is the null reference
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Reference(None))
    }

    /// Convert to the form held on the operand stack
    #[inline]
    pub const fn widen(self) -> Self {
        match self {
            Self::Boolean(b) => Self::Int(b as i32),
            other => other,
        }
    }

    /// Zero value of a declared type: `0`, `false`, `0.0`, or null
    pub fn default_for(ty: &TypeCode) -> Self {
        match ty {
            TypeCode::Boolean => Self::Boolean(false),
            TypeCode::Int | TypeCode::Byte | TypeCode::Char => Self::Int(0),
            TypeCode::Float => Self::Float(0.0),
            TypeCode::Reference(_) | TypeCode::Array(_) => Self::NULL,
        }
    }

    /// Convert a `push` literal
    pub const fn from_literal(literal: Literal) -> Self {
        match literal {
            Literal::Int(n) => Self::Int(n),
            Literal::Boolean(b) => Self::Boolean(b),
            Literal::Float(x) => Self::Float(x),
            Literal::Null => Self::NULL,
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        Self::from_literal(literal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Reference(Some(r)) => write!(f, "{r}"),
            Self::Reference(None) => f.write_str("null"),
        }
    }
}

/// Apply an integer arithmetic operator with JVM wrapping semantics
///
/// Division truncates toward zero.
///
/// # Panics
///
/// Panics if `op` is `Div` or `Rem` and `rhs` is zero. Callers must check
/// [`BinaryOp::checks_zero_divisor`] and reject a zero divisor first.
pub fn int_binary(op: BinaryOp, lhs: i32, rhs: i32) -> i32 {
    match op {
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
        BinaryOp::Div => lhs.wrapping_div(rhs),
        BinaryOp::Rem => lhs.wrapping_rem(rhs),
    }
}

/// Evaluate a relational condition on two ints
///
/// Returns `None` for the reference conditions `is`/`isnot`.
pub fn int_condition(condition: Condition, lhs: i32, rhs: i32) -> Option<bool> {
    match condition {
        Condition::Eq => Some(lhs == rhs),
        Condition::Ne => Some(lhs != rhs),
        Condition::Lt => Some(lhs < rhs),
        Condition::Le => Some(lhs <= rhs),
        Condition::Gt => Some(lhs > rhs),
        Condition::Ge => Some(lhs >= rhs),
        Condition::Is | Condition::IsNot => None,
    }
}

/// Evaluate an identity condition on two nullable references
///
/// Returns `None` for the relational conditions.
pub fn reference_condition(
    condition: Condition,
    lhs: Option<HeapRef>,
    rhs: Option<HeapRef>,
) -> Option<bool> {
    match condition {
        Condition::Is => Some(lhs == rhs),
        Condition::IsNot => Some(lhs != rhs),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_only_touches_booleans() {
        assert_eq!(Value::boolean(true).widen(), Value::int(1));
        assert_eq!(Value::boolean(false).widen(), Value::int(0));
        assert_eq!(Value::int(7).widen(), Value::int(7));
        assert_eq!(Value::NULL.widen(), Value::NULL);
    }

    #[test]
    fn test_defaults_follow_declared_type() {
        assert_eq!(Value::default_for(&TypeCode::Boolean), Value::boolean(false));
        assert_eq!(Value::default_for(&TypeCode::Char), Value::int(0));
        assert_eq!(Value::default_for(&TypeCode::Float), Value::float(0.0));
        assert!(Value::default_for(&TypeCode::Reference("java.lang.Object".into())).is_null());
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(int_binary(BinaryOp::Div, 7, 2), 3);
        assert_eq!(int_binary(BinaryOp::Div, -7, 2), -3);
        assert_eq!(int_binary(BinaryOp::Rem, -7, 2), -1);
        assert_eq!(int_binary(BinaryOp::Rem, 7, -2), 1);
    }

    #[test]
    fn test_arithmetic_wraps() {
        assert_eq!(int_binary(BinaryOp::Add, i32::MAX, 1), i32::MIN);
        assert_eq!(int_binary(BinaryOp::Mul, i32::MIN, -1), i32::MIN);
        assert_eq!(int_binary(BinaryOp::Div, i32::MIN, -1), i32::MIN);
        assert_eq!(int_binary(BinaryOp::Rem, i32::MIN, -1), 0);
    }

    #[test]
    fn test_conditions() {
        assert_eq!(int_condition(Condition::Le, 3, 3), Some(true));
        assert_eq!(int_condition(Condition::Gt, 3, 3), Some(false));
        assert_eq!(int_condition(Condition::Is, 0, 0), None);

        let a = Some(HeapRef::new(0));
        let b = Some(HeapRef::new(1));
        assert_eq!(reference_condition(Condition::Is, a, a), Some(true));
        assert_eq!(reference_condition(Condition::IsNot, a, b), Some(true));
        assert_eq!(reference_condition(Condition::Is, None, None), Some(true));
        assert_eq!(reference_condition(Condition::Lt, a, b), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::reference(HeapRef::new(3)).to_string(), "@3");
        assert_eq!(Value::NULL.to_string(), "null");
        assert_eq!(Value::int(-1).to_string(), "-1");
    }
}
