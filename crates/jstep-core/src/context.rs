//! Execution state
//!
//! [`ExecutionState`] owns everything a run mutates: the heap, the call
//! stack of [`CallFrame`]s, and the static-field store. It is created fresh
//! for every run and moved through each step.

use std::fmt;
use std::sync::Arc;

use jstep_bytecode::{FieldId, MethodId, TypeCode};
use rustc_hash::FxHashMap;

use crate::error::{VmError, VmResult};
use crate::object::Heap;
use crate::value::{HeapRef, Value};

/// Method and offset of the next instruction to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCounter {
    /// Method being executed
    pub method: Arc<MethodId>,
    /// Index into the method's instruction sequence
    pub offset: usize,
}

impl ProgramCounter {
    /// Program counter at the first instruction of `method`
    pub fn entry(method: Arc<MethodId>) -> Self {
        Self { method, offset: 0 }
    }
}

impl fmt::Display for ProgramCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.offset)
    }
}

/// A call frame
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Local slots that have been written
    pub locals: FxHashMap<u16, Value>,
    /// Operand stack, top is last
    pub stack: Vec<Value>,
    /// Program counter
    pub pc: ProgramCounter,
}

impl CallFrame {
    /// Create a frame with no locals bound
    pub fn new(method: Arc<MethodId>) -> Self {
        Self {
            locals: FxHashMap::default(),
            stack: Vec::new(),
            pc: ProgramCounter::entry(method),
        }
    }

    /// Create a frame with `args` bound to locals `0..args.len()`
    pub fn with_locals(method: Arc<MethodId>, args: impl IntoIterator<Item = Value>) -> Self {
        let mut frame = Self::new(method);
        for (slot, value) in (0u16..).zip(args) {
            frame.locals.insert(slot, value);
        }
        frame
    }

    /// Read a local slot
    #[inline]
    pub fn local(&self, index: u16) -> VmResult<Value> {
        self.locals
            .get(&index)
            .copied()
            .ok_or(VmError::UnsetLocal(index))
    }

    /// Write a local slot
    #[inline]
    pub fn set_local(&mut self, index: u16, value: Value) {
        self.locals.insert(index, value);
    }

    /// Push onto the operand stack in stack form
    #[inline]
    pub fn push(&mut self, value: Value) {
        self.stack.push(value.widen());
    }

    /// Pop the top of the operand stack
    #[inline]
    pub fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    /// Top of the operand stack, without popping
    #[inline]
    pub fn peek(&self) -> VmResult<Value> {
        self.stack.last().copied().ok_or(VmError::StackUnderflow)
    }

    /// Pop an int operand
    pub fn pop_int(&mut self) -> VmResult<i32> {
        let value = self.pop()?;
        value
            .as_int()
            .ok_or_else(|| VmError::type_mismatch("int", &value))
    }

    /// Pop a nullable reference operand
    pub fn pop_reference(&mut self) -> VmResult<Option<HeapRef>> {
        let value = self.pop()?;
        value
            .as_reference()
            .ok_or_else(|| VmError::type_mismatch("reference", &value))
    }

    /// Pop `n` operands, returned in push order
    pub fn pop_n(&mut self, n: usize) -> VmResult<Vec<Value>> {
        let len = self.stack.len();
        if n > len {
            return Err(VmError::StackUnderflow);
        }
        Ok(self.stack.split_off(len - n))
    }

    /// Move to the next instruction
    #[inline]
    pub fn advance(&mut self) {
        self.pc.offset += 1;
    }

    /// Move to an absolute offset
    #[inline]
    pub fn jump(&mut self, offset: usize) {
        self.pc.offset = offset;
    }
}

impl fmt::Display for CallFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.pc)?;
        for (i, value) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

/// Key of a static field: declaring class and field name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticKey {
    /// Dotted class name
    pub class: String,
    /// Field name
    pub name: String,
}

impl From<&FieldId> for StaticKey {
    fn from(field: &FieldId) -> Self {
        Self {
            class: field.class.clone(),
            name: field.name.clone(),
        }
    }
}

/// Heap, call stack, and static fields of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionState {
    /// Heap records
    pub heap: Heap,
    /// Call frames, top is last
    pub call_stack: Vec<CallFrame>,
    /// Static field store
    pub statics: FxHashMap<StaticKey, Value>,
}

impl ExecutionState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state whose only frame is `frame`
    pub fn with_entry(frame: CallFrame) -> Self {
        let mut state = Self::new();
        state.push_frame(frame);
        state
    }

    /// Active frame
    #[inline]
    pub fn current_frame(&self) -> VmResult<&CallFrame> {
        self.call_stack.last().ok_or(VmError::EmptyCallStack)
    }

    /// Active frame, mutably
    #[inline]
    pub fn current_frame_mut(&mut self) -> VmResult<&mut CallFrame> {
        self.call_stack.last_mut().ok_or(VmError::EmptyCallStack)
    }

    /// Push a new active frame
    #[inline]
    pub fn push_frame(&mut self, frame: CallFrame) {
        self.call_stack.push(frame);
    }

    /// Pop the active frame
    #[inline]
    pub fn pop_frame(&mut self) -> VmResult<CallFrame> {
        self.call_stack.pop().ok_or(VmError::EmptyCallStack)
    }

    /// Number of frames on the call stack
    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Allocate an empty object of `class`
    pub fn allocate(&mut self, class: impl Into<String>) -> VmResult<HeapRef> {
        self.heap.allocate_object(class)
    }

    /// Allocate an array of `len` default elements
    pub fn allocate_array(&mut self, element: TypeCode, len: usize) -> VmResult<HeapRef> {
        self.heap.allocate_array(element, len)
    }

    /// Read an instance field
    pub fn read_field(&self, receiver: HeapRef, field: &str) -> VmResult<Value> {
        let object = self.heap.object(receiver)?;
        object
            .fields
            .get(field)
            .copied()
            .ok_or_else(|| VmError::MissingField {
                class: object.class.clone(),
                field: field.to_string(),
            })
    }

    /// Write an instance field
    pub fn write_field(&mut self, receiver: HeapRef, field: &str, value: Value) -> VmResult<()> {
        let object = self.heap.object_mut(receiver)?;
        object.fields.insert(field.to_string(), value);
        Ok(())
    }

    /// Read a static field
    ///
    /// A field never written before is initialized to its type's default,
    /// unless `strict` is set, in which case the read is a fault.
    pub fn read_static(&mut self, field: &FieldId, strict: bool) -> VmResult<Value> {
        let key = StaticKey::from(field);
        if let Some(value) = self.statics.get(&key) {
            return Ok(*value);
        }
        if strict {
            return Err(VmError::UninitializedStatic(field.to_string()));
        }
        let value = Value::default_for(&field.ty);
        tracing::warn!(field = %field, default = %value, "static field read before initialization");
        self.statics.insert(key, value);
        Ok(value)
    }

    /// Write a static field
    pub fn write_static(&mut self, field: &FieldId, value: Value) {
        self.statics.insert(StaticKey::from(field), value);
    }

    /// Whether a static field has a value
    pub fn has_static(&self, field: &FieldId) -> bool {
        self.statics.contains_key(&StaticKey::from(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method() -> Arc<MethodId> {
        Arc::new("pkg.C.m:(IZ)V".parse().unwrap())
    }

    #[test]
    fn test_locals_are_bound_in_order() {
        let frame = CallFrame::with_locals(method(), [Value::int(3), Value::boolean(true)]);
        assert_eq!(frame.local(0).unwrap(), Value::int(3));
        assert_eq!(frame.local(1).unwrap(), Value::boolean(true));
        assert!(matches!(frame.local(2), Err(VmError::UnsetLocal(2))));
    }

    #[test]
    fn test_push_widens_booleans() {
        let mut frame = CallFrame::new(method());
        frame.push(Value::boolean(true));
        assert_eq!(frame.pop_int().unwrap(), 1);
        assert!(matches!(frame.pop(), Err(VmError::StackUnderflow)));
    }

    #[test]
    fn test_pop_n_keeps_push_order() {
        let mut frame = CallFrame::new(method());
        for n in 1..=3 {
            frame.push(Value::int(n));
        }
        assert_eq!(frame.pop_n(2).unwrap(), vec![Value::int(2), Value::int(3)]);
        assert_eq!(frame.stack, vec![Value::int(1)]);
        assert!(matches!(frame.pop_n(2), Err(VmError::StackUnderflow)));
    }

    #[test]
    fn test_pop_reference_rejects_ints() {
        let mut frame = CallFrame::new(method());
        frame.push(Value::int(0));
        assert!(matches!(
            frame.pop_reference(),
            Err(VmError::TypeMismatch { expected: "reference", .. })
        ));
    }

    #[test]
    fn test_empty_call_stack() {
        let mut state = ExecutionState::new();
        assert!(matches!(state.current_frame(), Err(VmError::EmptyCallStack)));
        assert!(matches!(state.pop_frame(), Err(VmError::EmptyCallStack)));
    }

    #[test]
    fn test_static_defaults() {
        let field = FieldId::new("pkg.C", "$assertionsDisabled", TypeCode::Boolean);
        let mut state = ExecutionState::new();
        assert!(!state.has_static(&field));
        assert_eq!(state.read_static(&field, false).unwrap(), Value::boolean(false));
        assert!(state.has_static(&field));

        let counter = FieldId::new("pkg.C", "counter", TypeCode::Int);
        assert!(matches!(
            state.read_static(&counter, true),
            Err(VmError::UninitializedStatic(_))
        ));
        state.write_static(&counter, Value::int(4));
        assert_eq!(state.read_static(&counter, true).unwrap(), Value::int(4));
    }

    #[test]
    fn test_instance_fields() {
        let mut state = ExecutionState::new();
        let obj = state.allocate("pkg.Point").unwrap();
        assert!(matches!(
            state.read_field(obj, "x"),
            Err(VmError::MissingField { .. })
        ));
        state.write_field(obj, "x", Value::int(2)).unwrap();
        assert_eq!(state.read_field(obj, "x").unwrap(), Value::int(2));
    }
}
