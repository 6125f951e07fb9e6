//! Bytecode interpreter
//!
//! [`Interpreter::step`] executes exactly one instruction of the active
//! frame and either hands back the updated [`ExecutionState`] or a terminal
//! [`Outcome`]. [`Interpreter::run`] repeats it up to the configured step
//! limit.

use std::sync::Arc;

use jstep_bytecode::{BytecodeProvider, Condition, Instruction, MethodId};

use crate::context::{CallFrame, ExecutionState};
use crate::error::{VmError, VmResult};
use crate::method_table::{MethodBody, MethodTable};
use crate::outcome::Outcome;
use crate::value::{HeapRef, Value, int_binary, int_condition, reference_condition};

/// Default step ceiling
pub const DEFAULT_STEP_LIMIT: usize = 1000;

/// Default cap on the length of arrays created by `new_array`
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 20;

/// Class whose constructor reports [`Outcome::AssertionError`]
const ASSERTION_ERROR_CLASS: &str = "java.lang.AssertionError";

/// Interpreter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Maximum number of steps before reporting [`Outcome::StepLimitExceeded`]
    pub step_limit: usize,
    /// Fault on reads of static fields that were never written
    pub strict_statics: bool,
    /// Longest array `new_array` may create; longer requests fault
    pub max_array_len: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            strict_statics: false,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}

/// Result of a single step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Execution continues from this state
    Continue(ExecutionState),
    /// The run is over
    Done(Outcome),
}

/// Outcome of a run and the number of steps it took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Terminal outcome
    pub outcome: Outcome,
    /// Steps executed, including the terminating one
    pub steps: usize,
}

/// The bytecode interpreter
pub struct Interpreter<P> {
    methods: MethodTable<P>,
    config: InterpreterConfig,
}

impl<P: BytecodeProvider> Interpreter<P> {
    /// Create an interpreter with default settings
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, InterpreterConfig::default())
    }

    /// Create an interpreter with explicit settings
    pub fn with_config(provider: P, config: InterpreterConfig) -> Self {
        Self::from_table(MethodTable::new(provider), config)
    }

    /// Create an interpreter over a prepared method table
    pub fn from_table(methods: MethodTable<P>, config: InterpreterConfig) -> Self {
        Self { methods, config }
    }

    /// Interpreter settings
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Method table
    pub fn methods(&self) -> &MethodTable<P> {
        &self.methods
    }

    /// Build the state for calling `method` with `args` bound to locals `0..n`
    pub fn initial_state(&mut self, method: &MethodId, args: Vec<Value>) -> VmResult<ExecutionState> {
        if args.len() != method.arity() {
            return Err(VmError::invalid_invocation(format!(
                "{method} takes {} argument(s), got {}",
                method.arity(),
                args.len()
            )));
        }
        self.methods.code(method)?;
        let frame = CallFrame::with_locals(Arc::new(method.clone()), args);
        Ok(ExecutionState::with_entry(frame))
    }

    /// Run `method` with `args` from a fresh state
    pub fn invoke(&mut self, method: &MethodId, args: Vec<Value>) -> VmResult<RunReport> {
        let state = self.initial_state(method, args)?;
        self.run(state)
    }

    /// Step `state` until an outcome or the step limit
    pub fn run(&mut self, mut state: ExecutionState) -> VmResult<RunReport> {
        for steps in 1..=self.config.step_limit {
            match self.step(state)? {
                Step::Continue(next) => state = next,
                Step::Done(outcome) => {
                    tracing::debug!(%outcome, steps, "run finished");
                    return Ok(RunReport { outcome, steps });
                }
            }
        }
        tracing::debug!(limit = self.config.step_limit, "step limit reached");
        Ok(RunReport {
            outcome: Outcome::StepLimitExceeded,
            steps: self.config.step_limit,
        })
    }

    /// Execute one instruction
    pub fn step(&mut self, mut state: ExecutionState) -> VmResult<Step> {
        let (method, offset) = {
            let frame = state.current_frame()?;
            (frame.pc.method.clone(), frame.pc.offset)
        };
        let code = self.methods.code(&method)?;
        let instruction = code.get(offset).ok_or_else(|| VmError::PcOutOfRange {
            method: method.to_string(),
            offset,
        })?;

        tracing::debug!(method = %method, offset, %instruction, "step");

        let result = self
            .execute_instruction(instruction, &mut state)
            .map_err(|e| e.at(&method, offset))?;

        match result {
            InstructionResult::Continue => {
                state.current_frame_mut()?.advance();
            }
            InstructionResult::Jump(target) => {
                state.current_frame_mut()?.jump(target);
            }
            InstructionResult::Call { method, locals } => {
                // Advance before pushing new frame
                state.current_frame_mut()?.advance();
                state.push_frame(CallFrame::with_locals(method, locals));
            }
            InstructionResult::Return(value) => {
                state.pop_frame()?;
                if state.call_stack.is_empty() {
                    return Ok(Step::Done(Outcome::Ok));
                }
                if let Some(value) = value {
                    state.current_frame_mut()?.push(value);
                }
            }
            InstructionResult::Throw(exception) => {
                state.pop_frame()?;
                if state.call_stack.is_empty() {
                    return Ok(Step::Done(Outcome::UncaughtException));
                }
                state.current_frame_mut()?.push(Value::reference(exception));
            }
            InstructionResult::Halt(outcome) => return Ok(Step::Done(outcome)),
        }

        if let Ok(frame) = state.current_frame() {
            tracing::trace!(%frame, "stack");
        }
        Ok(Step::Continue(state))
    }

    fn execute_instruction(
        &mut self,
        instruction: &Instruction,
        state: &mut ExecutionState,
    ) -> VmResult<InstructionResult> {
        match instruction {
            // ==================== Stack ====================
            Instruction::Push { value } => {
                state.current_frame_mut()?.push(Value::from(*value));
                Ok(InstructionResult::Continue)
            }

            Instruction::Dup => {
                let frame = state.current_frame_mut()?;
                let top = frame.peek()?;
                frame.push(top);
                Ok(InstructionResult::Continue)
            }

            Instruction::Pop => {
                state.current_frame_mut()?.pop()?;
                Ok(InstructionResult::Continue)
            }

            // ==================== Locals ====================
            Instruction::Load { index, .. } => {
                let frame = state.current_frame_mut()?;
                let value = frame.local(index.index())?;
                frame.push(value);
                Ok(InstructionResult::Continue)
            }

            Instruction::Store { index, .. } => {
                let frame = state.current_frame_mut()?;
                let value = frame.pop()?;
                frame.set_local(index.index(), value);
                Ok(InstructionResult::Continue)
            }

            Instruction::Incr { index, amount } => {
                let frame = state.current_frame_mut()?;
                let slot = index.index();
                let current = frame.local(slot)?;
                let n = current
                    .as_int()
                    .ok_or_else(|| VmError::type_mismatch("int", &current))?;
                frame.set_local(slot, Value::int(n.wrapping_add(*amount)));
                Ok(InstructionResult::Continue)
            }

            // ==================== Arithmetic ====================
            Instruction::Binary { op } => {
                let frame = state.current_frame_mut()?;
                let rhs = frame.pop_int()?;
                let lhs = frame.pop_int()?;
                if op.checks_zero_divisor() && rhs == 0 {
                    return Ok(InstructionResult::Halt(Outcome::DivideByZero));
                }
                frame.push(Value::int(int_binary(*op, lhs, rhs)));
                Ok(InstructionResult::Continue)
            }

            Instruction::Negate => {
                let frame = state.current_frame_mut()?;
                let n = frame.pop_int()?;
                frame.push(Value::int(n.wrapping_neg()));
                Ok(InstructionResult::Continue)
            }

            // ==================== Control Flow ====================
            Instruction::Ifz { condition, target } => {
                let frame = state.current_frame_mut()?;
                let taken = if condition.is_reference() {
                    let value = frame.pop_reference()?;
                    reference_condition(*condition, value, None)
                } else {
                    let value = frame.pop_int()?;
                    int_condition(*condition, value, 0)
                };
                branch(taken, *condition, target.offset())
            }

            Instruction::If { condition, target } => {
                let frame = state.current_frame_mut()?;
                let taken = if condition.is_reference() {
                    let rhs = frame.pop_reference()?;
                    let lhs = frame.pop_reference()?;
                    reference_condition(*condition, lhs, rhs)
                } else {
                    let rhs = frame.pop_int()?;
                    let lhs = frame.pop_int()?;
                    int_condition(*condition, lhs, rhs)
                };
                branch(taken, *condition, target.offset())
            }

            Instruction::Goto { target } => Ok(InstructionResult::Jump(target.offset())),

            // ==================== Fields ====================
            Instruction::Get { is_static, field } => {
                let value = if *is_static {
                    state.read_static(field, self.config.strict_statics)?
                } else {
                    let Some(receiver) = state.current_frame_mut()?.pop_reference()? else {
                        return Ok(InstructionResult::Halt(Outcome::NullPointer));
                    };
                    state.read_field(receiver, &field.name)?
                };
                state.current_frame_mut()?.push(value);
                Ok(InstructionResult::Continue)
            }

            Instruction::Put { is_static, field } => {
                let frame = state.current_frame_mut()?;
                let value = frame.pop()?;
                if *is_static {
                    state.write_static(field, value);
                } else {
                    let Some(receiver) = frame.pop_reference()? else {
                        return Ok(InstructionResult::Halt(Outcome::NullPointer));
                    };
                    state.write_field(receiver, &field.name, value)?;
                }
                Ok(InstructionResult::Continue)
            }

            // ==================== Objects ====================
            Instruction::New { class } => {
                let object = state.allocate(class.as_str())?;
                state.current_frame_mut()?.push(Value::reference(object));
                Ok(InstructionResult::Continue)
            }

            Instruction::NewArray { element } => {
                let len = state.current_frame_mut()?.pop_int()?;
                let Ok(len) = usize::try_from(len) else {
                    // NegativeArraySizeException, never handled
                    return Ok(InstructionResult::Halt(Outcome::UncaughtException));
                };
                if len > self.config.max_array_len {
                    return Err(VmError::ArrayTooLarge { len });
                }
                let array = state.allocate_array(element.clone(), len)?;
                state.current_frame_mut()?.push(Value::reference(array));
                Ok(InstructionResult::Continue)
            }

            Instruction::ArrayLoad { .. } => {
                let frame = state.current_frame_mut()?;
                let index = frame.pop_int()?;
                let Some(array) = frame.pop_reference()? else {
                    return Ok(InstructionResult::Halt(Outcome::NullPointer));
                };
                let record = state.heap.array(array)?;
                let Some(i) = record.checked_index(index) else {
                    return Ok(InstructionResult::Halt(Outcome::IndexOutOfBounds));
                };
                let value = record.elements[i];
                state.current_frame_mut()?.push(value);
                Ok(InstructionResult::Continue)
            }

            Instruction::ArrayStore { .. } => {
                let frame = state.current_frame_mut()?;
                let value = frame.pop()?;
                let index = frame.pop_int()?;
                let Some(array) = frame.pop_reference()? else {
                    return Ok(InstructionResult::Halt(Outcome::NullPointer));
                };
                let record = state.heap.array_mut(array)?;
                let Some(i) = record.checked_index(index) else {
                    return Ok(InstructionResult::Halt(Outcome::IndexOutOfBounds));
                };
                record.elements[i] = value;
                Ok(InstructionResult::Continue)
            }

            Instruction::ArrayLength => {
                let Some(array) = state.current_frame_mut()?.pop_reference()? else {
                    return Ok(InstructionResult::Halt(Outcome::NullPointer));
                };
                let len = state.heap.array(array)?.len();
                let len = i32::try_from(len)
                    .map_err(|_| VmError::kind_mismatch("int length", len.to_string()))?;
                state.current_frame_mut()?.push(Value::int(len));
                Ok(InstructionResult::Continue)
            }

            // ==================== Calls ====================
            Instruction::Invoke { kind, method } => {
                let body = self.methods.lookup(method)?;
                let frame = state.current_frame_mut()?;
                let args = frame.pop_n(method.arity())?;
                let receiver = if kind.has_receiver() {
                    match frame.pop_reference()? {
                        Some(r) => Some(r),
                        None => return Ok(InstructionResult::Halt(Outcome::NullPointer)),
                    }
                } else {
                    None
                };

                match body {
                    MethodBody::Bytecode(_) => {
                        let locals = receiver
                            .map(Value::reference)
                            .into_iter()
                            .chain(args)
                            .collect();
                        Ok(InstructionResult::Call {
                            method: Arc::new(method.clone()),
                            locals,
                        })
                    }
                    MethodBody::Builtin => invoke_builtin(method),
                }
            }

            Instruction::Return { ty } => {
                let value = match ty {
                    Some(_) => Some(state.current_frame_mut()?.pop()?),
                    None => None,
                };
                Ok(InstructionResult::Return(value))
            }

            Instruction::Throw => match state.current_frame_mut()?.pop_reference()? {
                Some(exception) => Ok(InstructionResult::Throw(exception)),
                None => Ok(InstructionResult::Halt(Outcome::NullPointer)),
            },
        }
    }
}

fn branch(taken: Option<bool>, condition: Condition, target: usize) -> VmResult<InstructionResult> {
    match taken {
        Some(true) => Ok(InstructionResult::Jump(target)),
        Some(false) => Ok(InstructionResult::Continue),
        None => Err(VmError::kind_mismatch(
            "comparable operands",
            format!("condition {}", condition.name()),
        )),
    }
}

/// Behavior of platform methods that have no bytecode
///
/// Constructing an `AssertionError` ends the run. Other constructors only
/// consume their receiver and arguments. Anything else is a fault.
fn invoke_builtin(method: &MethodId) -> VmResult<InstructionResult> {
    if !method.is_constructor() {
        return Err(VmError::UnmodeledMethod(method.to_string()));
    }
    if method.class == ASSERTION_ERROR_CLASS {
        return Ok(InstructionResult::Halt(Outcome::AssertionError));
    }
    tracing::warn!(method = %method, "built-in constructor treated as a no-op");
    Ok(InstructionResult::Continue)
}

/// Result of executing an instruction
enum InstructionResult {
    /// Continue to next instruction
    Continue,
    /// Jump to an absolute offset
    Jump(usize),
    /// Call a method
    Call {
        method: Arc<MethodId>,
        locals: Vec<Value>,
    },
    /// Return from the active method
    Return(Option<Value>),
    /// Unwind the active frame with an exception
    Throw(HeapRef),
    /// The run ends with an outcome
    Halt(Outcome),
}
