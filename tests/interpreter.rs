//! Abstract interpreter integration tests.
//!
//! These tests drive the public API end to end:
//! 1. Build scripts with `ScriptBuilder`
//! 2. Interpret them against an in-memory loader
//! 3. Inspect the instruction listings, resolved types and call graph

use std::sync::Arc;

use cs2scope::{
    interpreter::opcodes,
    prelude::*,
    script::ScriptBuilder,
};

/// Interprets every script and returns the finished set.
fn decompile(config: InterpreterConfig, scripts: Vec<(i32, Script)>) -> FunctionSet {
    decompile_with(config, scripts, &PrototypeMap::new())
}

fn decompile_with(
    config: InterpreterConfig,
    scripts: Vec<(i32, Script)>,
    prototypes: &PrototypeMap,
) -> FunctionSet {
    let scripts: ScriptMap = scripts.into_iter().collect();
    let mut interpreter = Interpreter::new(&scripts, prototypes, config);
    interpreter.interpret_all();
    interpreter.finish()
}

fn listing(set: &FunctionSet, id: i32) -> String {
    set.get(id)
        .map(|function| function.instructions.to_string())
        .unwrap_or_default()
}

fn return_five() -> Script {
    ScriptBuilder::new()
        .returns(&[StackType::Int])
        .push_int(5)
        .op(opcodes::RETURN, 0)
        .build()
}

#[test]
fn test_push_and_return() {
    let set = decompile(InterpreterConfig::default(), vec![(1, return_five())]);

    assert_eq!(listing(&set, 1), "stack0 = 5;\nreturn(stack0);\n");
    assert!(set.failures.is_empty());
    assert!(set.get(1).is_some_and(|f| f.labels().is_empty()));
}

#[test]
fn test_interpretation_is_memoised() -> Result<()> {
    let caller = ScriptBuilder::new()
        .returns(&[StackType::Int])
        .op(opcodes::GOSUB_WITH_PARAMS, 2)
        .op(opcodes::RETURN, 0)
        .build();
    let scripts: ScriptMap = [(1, caller), (2, return_five())].into_iter().collect();
    let prototypes = PrototypeMap::new();
    let mut interpreter = Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());

    let first = interpreter.interpret(1)?;
    let second = interpreter.interpret(1)?;
    assert!(Arc::ptr_eq(&first, &second));

    interpreter.interpret_all();
    let set = interpreter.finish();
    assert!(Arc::ptr_eq(&first, set.get(1).unwrap()));
    assert_eq!(set.call_graph.edges_from(1).len(), 1);
    assert_eq!(set.call_graph.stats().edge_count, 1);
    Ok(())
}

#[test]
fn test_labels_precede_jump_targets() {
    // if (arg0 < 3) goto 4; varp1 = 0; return; @4: varp1 = 1; return
    let script = ScriptBuilder::new()
        .arguments(1, 0)
        .op(opcodes::PUSH_INT_LOCAL, 0)
        .push_int(3)
        .jump(opcodes::BRANCH_LESS_THAN, 6)
        .push_int(0)
        .op(opcodes::SET_VAR, 1)
        .op(opcodes::RETURN, 0)
        .push_int(1)
        .op(opcodes::SET_VAR, 1)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::default(), vec![(1, script)]);

    let function = set.get(1).unwrap();
    assert_eq!(function.labels(), vec![Label(6)]);
    assert_eq!(function.opcode_count(), 9);
    assert_eq!(
        listing(&set, 1),
        "stack0 = $int0;\n\
         stack1 = 3;\n\
         if (op9(stack0, stack1)) goto @6;\n\
         stack2 = 0;\n\
         %var1 = stack2;\n\
         return();\n\
         @6:\n\
         stack3 = 1;\n\
         %var1 = stack3;\n\
         return();\n"
    );
}

#[test]
fn test_return_mismatch_is_stack_imbalance() {
    let script = ScriptBuilder::new()
        .returns(&[StackType::String])
        .push_int(5)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::default(), vec![(3, script)]);

    assert!(set.get(3).is_none());
    assert!(matches!(
        set.failures.get(&3),
        Some(Error::StackImbalance { script: 3, pc: 1, .. })
    ));
}

#[test]
fn test_pop_from_empty_stack_is_stack_imbalance() {
    let script = ScriptBuilder::new()
        .op(opcodes::POP_INT_DISCARD, 0)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::default(), vec![(3, script)]);

    assert!(matches!(
        set.failures.get(&3),
        Some(Error::StackImbalance { pc: 0, .. })
    ));
}

#[test]
fn test_unknown_opcode_fails_only_its_script() {
    let broken = ScriptBuilder::new().op(9999, 0).op(opcodes::RETURN, 0).build();
    let set = decompile(
        InterpreterConfig::default(),
        vec![(1, return_five()), (2, broken)],
    );

    assert_eq!(set.len(), 1);
    assert!(matches!(
        set.failures.get(&2),
        Some(Error::UnknownOpcode {
            script: 2,
            pc: 0,
            opcode: 9999
        })
    ));
}

#[test]
fn test_missing_callee() {
    let caller = ScriptBuilder::new()
        .op(opcodes::GOSUB_WITH_PARAMS, 99)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::default(), vec![(1, caller)]);

    assert!(matches!(
        set.failures.get(&1),
        Some(Error::MissingCallee {
            caller: 1,
            callee: 99
        })
    ));
    assert!(set.call_graph.edges_from(1).is_empty());
}

#[test]
fn test_callee_failure_propagates_to_caller() {
    let caller = ScriptBuilder::new()
        .op(opcodes::GOSUB_WITH_PARAMS, 2)
        .op(opcodes::RETURN, 0)
        .build();
    let broken = ScriptBuilder::new().op(9999, 0).op(opcodes::RETURN, 0).build();
    let set = decompile(InterpreterConfig::default(), vec![(1, caller), (2, broken)]);

    match set.failures.get(&1) {
        Some(Error::CalleeFailed {
            caller: 1,
            callee: 2,
            source,
        }) => assert!(matches!(**source, Error::UnknownOpcode { script: 2, .. })),
        other => panic!("expected a callee failure, got {other:?}"),
    }
    assert!(set.failures.contains_key(&2));
    assert!(set.is_empty());
    assert!(set.call_graph.edges_from(1).is_empty());
}

#[test]
fn test_recursion_uses_declared_shape() {
    // 1 calls 2, 2 calls 1 back; neither interpretation waits on the other.
    let one = ScriptBuilder::new()
        .arguments(1, 0)
        .returns(&[StackType::Int])
        .op(opcodes::PUSH_INT_LOCAL, 0)
        .op(opcodes::GOSUB_WITH_PARAMS, 2)
        .op(opcodes::RETURN, 0)
        .build();
    let two = ScriptBuilder::new()
        .arguments(1, 0)
        .returns(&[StackType::Int])
        .op(opcodes::PUSH_INT_LOCAL, 0)
        .op(opcodes::GOSUB_WITH_PARAMS, 1)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::default(), vec![(1, one), (2, two)]);

    assert!(set.failures.is_empty());
    assert_eq!(
        listing(&set, 1),
        "stack0 = $int0;\nstack1 = ~script2(stack0);\nreturn(stack1);\n"
    );
    assert!(set.call_graph.is_recursive(1));
    assert!(set.call_graph.is_recursive(2));
}

#[test]
fn test_legacy_self_invoke_pushes_declared_returns() {
    let script = ScriptBuilder::new()
        .arguments(1, 0)
        .returns(&[StackType::Int])
        .push_int(1)
        .op(opcodes::GOSUB_WITH_PARAMS, 7)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::legacy(), vec![(7, script)]);

    assert!(set.failures.is_empty(), "{:?}", set.failures);
    let text = listing(&set, 7);
    assert!(text.contains("stack1 = ~script7(7, stack0);"), "{text}");
    assert!(text.ends_with("return(stack1);\n"), "{text}");
    assert!(set
        .call_graph
        .edges_from(7)
        .iter()
        .any(|edge| edge.callee == 7 && edge.trigger == Trigger::ClientScript));
}

#[test]
fn test_call_types_flow_both_ways() {
    // script 2: return stat_base(arg0)
    let callee = ScriptBuilder::new()
        .arguments(1, 0)
        .returns(&[StackType::Int])
        .op(opcodes::PUSH_INT_LOCAL, 0)
        .op(opcodes::STAT_BASE, 0)
        .op(opcodes::RETURN, 0)
        .build();
    // script 1: return script2(arg0)
    let caller = ScriptBuilder::new()
        .arguments(1, 0)
        .returns(&[StackType::Int])
        .op(opcodes::PUSH_INT_LOCAL, 0)
        .op(opcodes::GOSUB_WITH_PARAMS, 2)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::default(), vec![(1, caller), (2, callee)]);

    assert_eq!(set.argument_types(2), Some(vec![Type::Stat]));
    assert_eq!(set.argument_types(1), Some(vec![Type::Stat]));
}

#[test]
fn test_enum_lookup_types_key_and_value() {
    let script = ScriptBuilder::new()
        .arguments(1, 0)
        .push_int('S' as i32)
        .push_int('o' as i32)
        .push_int(812)
        .op(opcodes::PUSH_INT_LOCAL, 0)
        .op(opcodes::ENUM, 0)
        .op(opcodes::OC_NAME, 0)
        .op(opcodes::POP_STRING_DISCARD, 0)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::default(), vec![(1, script)]);

    assert!(set.failures.is_empty(), "{:?}", set.failures);
    assert_eq!(set.argument_types(1), Some(vec![Type::Stat]));
    assert!(listing(&set, 1).contains("stack4 = op3408(stack0, stack1, stack2, stack3);"));
}

#[test]
fn test_param_lookup_uses_declared_prototype() {
    let script = ScriptBuilder::new()
        .arguments(1, 0)
        .op(opcodes::PUSH_INT_LOCAL, 0)
        .push_int(12)
        .op(opcodes::OC_PARAM, 0)
        .op(opcodes::STAT, 0)
        .op(opcodes::POP_INT_DISCARD, 0)
        .op(opcodes::RETURN, 0)
        .build();

    let declared = PrototypeMap::new().with_param(12, prototype::STAT);
    let set = decompile_with(
        InterpreterConfig::default(),
        vec![(1, script.clone())],
        &declared,
    );
    assert!(set.failures.is_empty(), "{:?}", set.failures);
    assert_eq!(set.argument_types(1), Some(vec![Type::Obj]));

    let set = decompile(InterpreterConfig::default(), vec![(1, script)]);
    assert!(matches!(
        set.failures.get(&1),
        Some(Error::MissingPrototype { key: 12 })
    ));
}

#[test]
fn test_hook_without_handler_records_no_edge() {
    let script = ScriptBuilder::new()
        .push_int(-1)
        .push_string("")
        .push_int(0x0001_0002)
        .op(opcodes::IF_SETONCLICK, 0)
        .op(opcodes::RETURN, 0)
        .build();
    let set = decompile(InterpreterConfig::default(), vec![(1, script)]);

    assert!(set.failures.is_empty(), "{:?}", set.failures);
    assert!(listing(&set, 1).contains("op2400(script-1(), stack2);"));
    assert!(set.call_graph.edges_from(1).is_empty());
}

#[test]
fn test_legacy_format_uses_operand_variables() {
    let script = ScriptBuilder::new()
        .op(opcodes::GET_VAR, 0)
        .op(opcodes::POP_INT_DISCARD, 0)
        .op(opcodes::RETURN, 0)
        .build();

    let legacy = decompile(InterpreterConfig::legacy(), vec![(1, script.clone())]);
    assert!(legacy.failures.is_empty(), "{:?}", legacy.failures);

    let current = decompile(InterpreterConfig::current(), vec![(1, script)]);
    assert!(listing(&current, 1).starts_with("stack0 = %var0;\n"));
}
