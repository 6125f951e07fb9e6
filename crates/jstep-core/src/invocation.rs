//! Argument tuples
//!
//! An invocation is a method id plus a tuple literal such as `(10, 0)`,
//! `(true)`, `('a', -3)` or `()`. Each element must match the declared
//! parameter type at its position.

use jstep_bytecode::{Descriptor, MethodId, TypeCode};

use crate::error::{VmError, VmResult};
use crate::value::Value;

/// A method together with its bound arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Entry method
    pub method: MethodId,
    /// Arguments, bound to locals `0..n`
    pub args: Vec<Value>,
}

impl Invocation {
    /// Parse a method id and an argument tuple
    pub fn parse(method: &str, args: &str) -> VmResult<Self> {
        let method: MethodId = method.parse()?;
        let args = parse_arguments(&method.descriptor, args)?;
        Ok(Self { method, args })
    }
}

/// Parse an argument tuple against a descriptor's parameter list
pub fn parse_arguments(descriptor: &Descriptor, input: &str) -> VmResult<Vec<Value>> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    let elements = split_elements(inner)?;
    if elements.len() != descriptor.arity() {
        return Err(VmError::invalid_invocation(format!(
            "expected {} argument(s) for {descriptor}, got {} in `{input}`",
            descriptor.arity(),
            elements.len()
        )));
    }

    descriptor
        .params
        .iter()
        .zip(elements)
        .map(|(ty, text)| parse_value(ty, text))
        .collect()
}

fn split_elements(inner: &str) -> VmResult<Vec<&str>> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut elements = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quote => escaped = true,
            '\'' => in_quote = !in_quote,
            ',' if !in_quote => {
                elements.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quote {
        return Err(VmError::invalid_invocation(format!(
            "unterminated char literal in `{inner}`"
        )));
    }
    elements.push(inner[start..].trim());
    Ok(elements)
}

fn parse_value(ty: &TypeCode, text: &str) -> VmResult<Value> {
    let invalid = || VmError::invalid_invocation(format!("`{text}` is not a valid {ty} argument"));

    match ty {
        TypeCode::Int => text.parse::<i32>().map(Value::int).map_err(|_| invalid()),
        TypeCode::Byte => text
            .parse::<i8>()
            .map(|b| Value::int(i32::from(b)))
            .map_err(|_| invalid()),
        TypeCode::Char => parse_char(text).map(Value::int).ok_or_else(invalid),
        TypeCode::Boolean => match text {
            "true" => Ok(Value::boolean(true)),
            "false" => Ok(Value::boolean(false)),
            _ => Err(invalid()),
        },
        TypeCode::Float => text.parse::<f32>().map(Value::float).map_err(|_| invalid()),
        TypeCode::Reference(_) | TypeCode::Array(_) => match text {
            "null" => Ok(Value::NULL),
            _ => Err(invalid()),
        },
    }
}

/// A quoted char (`'a'`, `'\''`, `'\\'`) or a UTF-16 code unit as an int
fn parse_char(text: &str) -> Option<i32> {
    if let Some(body) = text.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        let c = match body {
            "\\'" => '\'',
            "\\\\" => '\\',
            "\\n" => '\n',
            "\\t" => '\t',
            _ => {
                let mut chars = body.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                c
            }
        };
        return u16::try_from(u32::from(c)).ok().map(i32::from);
    }
    text.parse::<u16>().ok().map(i32::from)
}
