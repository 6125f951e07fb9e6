//! Heap records
//!
//! The heap maps [`HeapRef`] ids to objects and arrays. It only grows: ids
//! come from a counter and are never reused, and nothing is reclaimed.

use jstep_bytecode::TypeCode;
use rustc_hash::FxHashMap;

use crate::error::{VmError, VmResult};
use crate::value::{HeapRef, Value};

/// An object instance: class name plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    /// Dotted class name given at allocation
    pub class: String,
    /// Field values by name
    pub fields: FxHashMap<String, Value>,
}

impl ObjectRecord {
    /// Create an object with no fields set
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: FxHashMap::default(),
        }
    }
}

/// A fixed-length array
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRecord {
    /// Element type
    pub element: TypeCode,
    /// Elements, initialized to the element type's default
    pub elements: Vec<Value>,
}

impl ArrayRecord {
    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the array has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Convert a JVM index, `None` when outside `0..len`
    pub fn checked_index(&self, index: i32) -> Option<usize> {
        usize::try_from(index).ok().filter(|&i| i < self.len())
    }
}

/// A heap record
#[derive(Debug, Clone, PartialEq)]
pub enum HeapEntry {
    /// Object instance
    Object(ObjectRecord),
    /// Array
    Array(ArrayRecord),
}

impl HeapEntry {
    fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }
}

/// Reference id → record map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heap {
    entries: FxHashMap<HeapRef, HeapEntry>,
    next_id: u32,
}

impl Heap {
    /// Create an empty heap
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, entry: HeapEntry) -> VmResult<HeapRef> {
        let r = HeapRef::new(self.next_id);
        // Ids are never reused, so the heap is full once the counter runs out
        self.next_id = self.next_id.checked_add(1).ok_or(VmError::HeapExhausted)?;
        self.entries.insert(r, entry);
        Ok(r)
    }

    /// Allocate an object with no fields
    pub fn allocate_object(&mut self, class: impl Into<String>) -> VmResult<HeapRef> {
        self.insert(HeapEntry::Object(ObjectRecord::new(class)))
    }

    /// Allocate an array of `len` default elements
    ///
    /// Fails with [`VmError::ArrayTooLarge`] instead of aborting when the
    /// element storage cannot be reserved.
    pub fn allocate_array(&mut self, element: TypeCode, len: usize) -> VmResult<HeapRef> {
        let mut elements = Vec::new();
        elements
            .try_reserve_exact(len)
            .map_err(|_| VmError::ArrayTooLarge { len })?;
        elements.resize(len, Value::default_for(&element));
        self.insert(HeapEntry::Array(ArrayRecord { element, elements }))
    }

    /// Look up a record
    pub fn get(&self, r: HeapRef) -> Option<&HeapEntry> {
        self.entries.get(&r)
    }

    /// Look up an object record
    pub fn object(&self, r: HeapRef) -> VmResult<&ObjectRecord> {
        match self.entries.get(&r) {
            Some(HeapEntry::Object(obj)) => Ok(obj),
            Some(other) => Err(VmError::kind_mismatch("object", other.kind())),
            None => Err(VmError::MissingObject(r)),
        }
    }

    /// Look up an object record mutably
    pub fn object_mut(&mut self, r: HeapRef) -> VmResult<&mut ObjectRecord> {
        match self.entries.get_mut(&r) {
            Some(HeapEntry::Object(obj)) => Ok(obj),
            Some(other) => Err(VmError::kind_mismatch("object", other.kind())),
            None => Err(VmError::MissingObject(r)),
        }
    }

    /// Look up an array record
    pub fn array(&self, r: HeapRef) -> VmResult<&ArrayRecord> {
        match self.entries.get(&r) {
            Some(HeapEntry::Array(arr)) => Ok(arr),
            Some(other) => Err(VmError::kind_mismatch("array", other.kind())),
            None => Err(VmError::MissingObject(r)),
        }
    }

    /// Look up an array record mutably
    pub fn array_mut(&mut self, r: HeapRef) -> VmResult<&mut ArrayRecord> {
        match self.entries.get_mut(&r) {
            Some(HeapEntry::Array(arr)) => Ok(arr),
            Some(other) => Err(VmError::kind_mismatch("array", other.kind())),
            None => Err(VmError::MissingObject(r)),
        }
    }

    /// Number of records ever allocated
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been allocated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
