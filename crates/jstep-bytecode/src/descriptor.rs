//! Type codes and method descriptors
//!
//! Descriptors use the JVM's compact notation: `(II)I` takes two ints and
//! returns an int, `(Z)V` takes a boolean and returns nothing. Class names
//! are stored dotted (`java.lang.String`) and written with slashes inside
//! reference codes (`Ljava/lang/String;`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BytecodeError, Result};

/// A value type as written in a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeCode {
    /// `Z`
    Boolean,
    /// `I`
    Int,
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `F`
    Float,
    /// `L<class>;` with the class name stored dotted
    Reference(String),
    /// `[<element>`
    Array(Box<TypeCode>),
}

impl TypeCode {
    /// Whether values of this type are ints on the operand stack
    pub fn is_int_like(&self) -> bool {
        matches!(self, Self::Boolean | Self::Int | Self::Byte | Self::Char)
    }

    /// Whether this is a reference or array type
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_) | Self::Array(_))
    }

    /// Parse one type code from the front of `input`, returning the rest
    pub fn parse_prefix(input: &str) -> Result<(Self, &str)> {
        let invalid = || BytecodeError::InvalidDescriptor(input.to_string());
        let mut chars = input.chars();
        let code = match chars.next().ok_or_else(invalid)? {
            'Z' => Self::Boolean,
            'I' => Self::Int,
            'B' => Self::Byte,
            'C' => Self::Char,
            'F' => Self::Float,
            'L' => {
                let body = chars.as_str();
                let end = body.find(';').ok_or_else(invalid)?;
                if end == 0 {
                    return Err(invalid());
                }
                let class = body[..end].replace('/', ".");
                return Ok((Self::Reference(class), &body[end + 1..]));
            }
            '[' => {
                let (element, rest) = Self::parse_prefix(chars.as_str())?;
                return Ok((Self::Array(Box::new(element)), rest));
            }
            _ => return Err(invalid()),
        };
        Ok((code, chars.as_str()))
    }
}

impl FromStr for TypeCode {
    type Err = BytecodeError;

    fn from_str(s: &str) -> Result<Self> {
        match Self::parse_prefix(s)? {
            (code, "") => Ok(code),
            _ => Err(BytecodeError::InvalidDescriptor(s.to_string())),
        }
    }
}

impl TryFrom<String> for TypeCode {
    type Error = BytecodeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TypeCode> for String {
    fn from(code: TypeCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("Z"),
            Self::Int => f.write_str("I"),
            Self::Byte => f.write_str("B"),
            Self::Char => f.write_str("C"),
            Self::Float => f.write_str("F"),
            Self::Reference(class) => write!(f, "L{};", class.replace('.', "/")),
            Self::Array(element) => write!(f, "[{element}"),
        }
    }
}

/// Ordered parameter types plus a return type (`None` for void)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Descriptor {
    /// Parameter types in declaration order
    pub params: Vec<TypeCode>,
    /// Return type, `None` for `V`
    pub returns: Option<TypeCode>,
}

impl Descriptor {
    /// Create a descriptor
    pub fn new(params: Vec<TypeCode>, returns: Option<TypeCode>) -> Self {
        Self { params, returns }
    }

    /// Number of declared parameters (excluding any receiver)
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the method returns nothing
    pub fn is_void(&self) -> bool {
        self.returns.is_none()
    }
}

impl FromStr for Descriptor {
    type Err = BytecodeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BytecodeError::InvalidDescriptor(s.to_string());
        let mut rest = s.strip_prefix('(').ok_or_else(invalid)?;
        let mut params = Vec::new();
        while !rest.starts_with(')') {
            if rest.is_empty() {
                return Err(invalid());
            }
            let (param, tail) = TypeCode::parse_prefix(rest).map_err(|_| invalid())?;
            params.push(param);
            rest = tail;
        }
        let ret = &rest[1..];
        let returns = match ret {
            "V" => None,
            other => Some(other.parse::<TypeCode>().map_err(|_| invalid())?),
        };
        Ok(Self { params, returns })
    }
}

impl TryFrom<String> for Descriptor {
    type Error = BytecodeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Descriptor> for String {
    fn from(descriptor: Descriptor) -> Self {
        descriptor.to_string()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        match &self.returns {
            Some(ret) => write!(f, "{ret}"),
            None => f.write_str("V"),
        }
    }
}
