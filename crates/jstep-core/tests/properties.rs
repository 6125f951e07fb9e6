//! Property tests for the stepper

use jstep_bytecode::{
    BinaryOp, ClassFile, Condition, Instruction, InvokeKind, JumpTarget, Literal, LocalIndex,
    MemoryProvider, MethodDef, MethodId, TypeCode,
};
use jstep_core::{Interpreter, Outcome, Step, Value, value::int_binary};
use proptest::prelude::*;

fn load(index: u16) -> Instruction {
    Instruction::Load {
        ty: TypeCode::Int,
        index: LocalIndex(index),
    }
}

fn single_method(descriptor: &str, code: Vec<Instruction>) -> (MemoryProvider, MethodId) {
    let class = ClassFile::builder("prop.P")
        .method(
            MethodDef::builder("m", descriptor.parse().unwrap())
                .instructions(code)
                .build(),
        )
        .build();
    let id = format!("prop.P.m:{descriptor}").parse().unwrap();
    (MemoryProvider::new().with_class(class), id)
}

fn arithmetic(op: BinaryOp) -> (MemoryProvider, MethodId) {
    single_method(
        "(II)I",
        vec![
            load(0),
            load(1),
            Instruction::Binary { op },
            Instruction::Return {
                ty: Some(TypeCode::Int),
            },
        ],
    )
}

/// A chain `m -> f0 -> f1 -> ... -> f{depth-1}` of void calls
fn call_chain(depth: usize) -> (MemoryProvider, MethodId) {
    let ret = Instruction::Return { ty: None };
    let call = |i: usize| Instruction::Invoke {
        kind: InvokeKind::Static,
        method: format!("prop.Chain.f{i}:()V").parse().unwrap(),
    };

    let mut class = ClassFile::builder("prop.Chain").method(
        MethodDef::builder("m", "()V".parse().unwrap())
            .instruction(call(0))
            .instruction(ret.clone())
            .build(),
    );
    for i in 0..depth {
        let mut method = MethodDef::builder(format!("f{i}"), "()V".parse().unwrap());
        if i + 1 < depth {
            method = method.instruction(call(i + 1));
        }
        class = class.method(method.instruction(ret.clone()).build());
    }
    let provider = MemoryProvider::new().with_class(class.build());
    (provider, "prop.Chain.m:()V".parse().unwrap())
}

proptest! {
    #[test]
    fn prop_division_by_zero(a in any::<i32>(), rem in any::<bool>()) {
        let op = if rem { BinaryOp::Rem } else { BinaryOp::Div };
        let (provider, id) = arithmetic(op);
        let report = Interpreter::new(provider)
            .invoke(&id, vec![Value::int(a), Value::int(0)])
            .unwrap();
        prop_assert_eq!(report.outcome, Outcome::DivideByZero);
        prop_assert_eq!(report.steps, 3);
    }

    #[test]
    fn prop_arithmetic_result(
        a in any::<i32>(),
        b in any::<i32>().prop_filter("non-zero", |b| *b != 0),
        op in prop_oneof![
            Just(BinaryOp::Add),
            Just(BinaryOp::Sub),
            Just(BinaryOp::Mul),
            Just(BinaryOp::Div),
            Just(BinaryOp::Rem),
        ],
    ) {
        let (provider, id) = arithmetic(op);
        let mut interp = Interpreter::new(provider);
        let mut state = interp.initial_state(&id, vec![Value::int(a), Value::int(b)]).unwrap();
        for _ in 0..3 {
            state = match interp.step(state).unwrap() {
                Step::Continue(next) => next,
                Step::Done(outcome) => return Err(TestCaseError::fail(format!("stopped with {outcome}"))),
            };
        }
        let frame = state.current_frame().unwrap();
        prop_assert_eq!(&frame.stack, &vec![Value::int(int_binary(op, a, b))]);
    }

    #[test]
    fn prop_step_is_deterministic(x in any::<i32>(), y in any::<i32>()) {
        // return x < y ? y - x : x - y
        let (provider, id) = single_method(
            "(II)I",
            vec![
                load(0),
                load(1),
                Instruction::If { condition: Condition::Ge, target: JumpTarget(6) },
                load(1),
                load(0),
                Instruction::Goto { target: JumpTarget(8) },
                load(0),
                load(1),
                Instruction::Binary { op: BinaryOp::Sub },
                Instruction::Return { ty: Some(TypeCode::Int) },
            ],
        );
        let mut interp = Interpreter::new(provider);
        let mut state = interp.initial_state(&id, vec![Value::int(x), Value::int(y)]).unwrap();
        loop {
            let first = interp.step(state.clone()).unwrap();
            let second = interp.step(state).unwrap();
            prop_assert_eq!(&first, &second);
            match first {
                Step::Continue(next) => state = next,
                Step::Done(outcome) => {
                    prop_assert_eq!(outcome, Outcome::Ok);
                    break;
                }
            }
        }
    }

    #[test]
    fn prop_throw_null_is_null_pointer(padding in 0usize..8) {
        let mut code: Vec<Instruction> = (0..padding)
            .map(|n| Instruction::Push { value: Literal::int(n as i32) })
            .collect();
        code.push(Instruction::Push { value: Literal::Null });
        code.push(Instruction::Throw);
        let (provider, id) = single_method("()V", code);
        let report = Interpreter::new(provider).invoke(&id, vec![]).unwrap();
        prop_assert_eq!(report.outcome, Outcome::NullPointer);
    }

    #[test]
    fn prop_nested_calls_restore_depth(depth in 1usize..40) {
        let (provider, id) = call_chain(depth);
        let mut interp = Interpreter::new(provider);
        let mut state = interp.initial_state(&id, vec![]).unwrap();
        let mut max_depth = state.stack_depth();
        let mut steps = 0;
        loop {
            let depth_before = state.stack_depth();
            steps += 1;
            match interp.step(state).unwrap() {
                Step::Continue(next) => {
                    max_depth = max_depth.max(next.stack_depth());
                    state = next;
                }
                Step::Done(outcome) => {
                    prop_assert_eq!(outcome, Outcome::Ok);
                    prop_assert_eq!(depth_before, 1);
                    break;
                }
            }
        }
        prop_assert_eq!(max_depth, depth + 1);
        prop_assert_eq!(steps, 2 * depth + 1);
    }
}
