//! Method and field identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::descriptor::{Descriptor, TypeCode};
use crate::error::{BytecodeError, Result};

/// Name of instance initializers
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Fully qualified method key: `<package>.<Class>.<method>:<descriptor>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MethodId {
    /// Dotted class name, e.g. `jpamb.cases.Simple`
    pub class: String,
    /// Method name
    pub name: String,
    /// Parameter and return types
    pub descriptor: Descriptor,
}

impl MethodId {
    /// Create a method id from its parts
    pub fn new(class: impl Into<String>, name: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            descriptor,
        }
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.descriptor.arity()
    }

    /// Whether this names an instance initializer
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Unqualified class name (the part after the last dot)
    pub fn simple_class_name(&self) -> &str {
        self.class.rsplit('.').next().unwrap_or(&self.class)
    }
}

impl FromStr for MethodId {
    type Err = BytecodeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BytecodeError::InvalidMethodId(s.to_string());
        let (path, descriptor) = s.split_once(':').ok_or_else(invalid)?;
        let (class, name) = path.rsplit_once('.').ok_or_else(invalid)?;
        if class.is_empty() || name.is_empty() || class.split('.').any(str::is_empty) {
            return Err(invalid());
        }
        Ok(Self {
            class: class.to_string(),
            name: name.to_string(),
            descriptor: descriptor.parse()?,
        })
    }
}

impl TryFrom<String> for MethodId {
    type Error = BytecodeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MethodId> for String {
    fn from(id: MethodId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.class, self.name, self.descriptor)
    }
}

/// A field reference as it appears in field access instructions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId {
    /// Dotted name of the declaring class
    pub class: String,
    /// Field name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeCode,
}

impl FieldId {
    /// Create a field id
    pub fn new(class: impl Into<String>, name: impl Into<String>, ty: TypeCode) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.class, self.name, self.ty)
    }
}
