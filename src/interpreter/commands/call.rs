//! Procedure calls and legacy invokes.
//!
//! A callee's argument and return shape comes from its interpreted [`Function`],
//! which is produced on demand. Scripts already on the interpretation stack use
//! their declared shape instead, so that recursion terminates.
//!
//! [`Function`]: crate::ir::Function

use crate::{
    analysis::callgraph::Trigger,
    interpreter::{frame::Frame, Interpreter},
    ir::{Expr, Instruction},
    script::{StackType, Value},
    Error, Result,
};

/// Argument and return stack types of a script.
struct Shape {
    arguments: Vec<StackType>,
    returns: Vec<StackType>,
}

fn shape(interpreter: &mut Interpreter<'_>, frame: &Frame, callee: i32) -> Result<Shape> {
    let missing = || Error::MissingCallee {
        caller: frame.id,
        callee,
    };

    if callee == frame.id || interpreter.active.contains(&callee) {
        let script = if callee == frame.id {
            frame.script.clone()
        } else {
            interpreter.scripts.script(callee).ok_or_else(missing)?
        };
        return Ok(Shape {
            arguments: script.argument_types(),
            returns: script.return_types.clone(),
        });
    }

    if interpreter.scripts.script(callee).is_none() {
        return Err(missing());
    }
    let function = interpreter
        .interpret(callee)
        .map_err(|source| Error::CalleeFailed {
            caller: frame.id,
            callee,
            source: Box::new(source),
        })?;
    Ok(Shape {
        arguments: function.arguments.iter().map(|v| v.stack_type()).collect(),
        returns: function.return_types.clone(),
    })
}

fn count(stack_types: &[StackType], stack_type: StackType) -> usize {
    stack_types.iter().filter(|&&st| st == stack_type).count()
}

/// Pops the arguments of `callee` and pushes its results.
///
/// The stack is shared by both value kinds, so arguments are popped by total
/// count and must agree with the callee's per-kind counts.
fn call(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    callee: i32,
    shape: &Shape,
    mut arguments: Vec<Expr>,
) -> Result<Instruction> {
    let popped = frame.pop_count(shape.arguments.len())?;
    let popped_types: Vec<StackType> = popped.iter().map(|e| e.stack_type()).collect();
    for stack_type in [StackType::Int, StackType::String] {
        if count(&popped_types, stack_type) != count(&shape.arguments, stack_type) {
            return Err(frame.imbalance(format!(
                "script {callee} takes {:?}, stack holds {popped_types:?}",
                shape.arguments
            )));
        }
    }

    let typings = &mut interpreter.typings;
    let parameters = typings.args(callee, &popped_types);
    let values: Vec<_> = popped.iter().map(|e| e.typing).collect();
    typings.assign(&parameters, &values)?;
    arguments.extend(popped.iter().map(|e| e.expr()));

    let returns = typings.returns(callee, &shape.returns)?;
    let definitions = frame.push_all(typings, &shape.returns)?;
    let definition_typings: Vec<_> = definitions.iter().map(|d| d.typing).collect();
    typings.assign(&definition_typings, &returns)?;

    Ok(Instruction::Assignment {
        definitions: definitions.iter().map(|d| d.expr()).collect(),
        expression: Expr::Call {
            opcode: frame.opcode()?,
            script: callee,
            arguments,
            results: shape.returns.clone(),
            typings: returns,
        },
    })
}

/// `gosub_with_params`: calls the procedure named by the operand.
pub(super) fn proc(interpreter: &mut Interpreter<'_>, frame: &mut Frame) -> Result<Instruction> {
    let callee = frame.int_operand()?;
    let shape = shape(interpreter, frame, callee)?;
    interpreter.call_graph.call(frame.id, callee, Trigger::Proc)?;
    call(interpreter, frame, callee, &shape, Vec::new())
}

/// Legacy `invoke`: like a procedure call, with the callee id as first argument.
///
/// A script invoking itself takes its own declared argument and return shape
/// and is not interpreted again.
pub(super) fn invoke(interpreter: &mut Interpreter<'_>, frame: &mut Frame) -> Result<Instruction> {
    let callee = frame.int_operand()?;
    // TODO: self-invocation re-runs the script with the invoke's arguments; confirm
    // against recorded scripts that the declared returns are what lands on the stack.
    let shape = shape(interpreter, frame, callee)?;
    interpreter
        .call_graph
        .call(frame.id, callee, Trigger::ClientScript)?;

    let id = Expr::Cst {
        value: Value::Int(callee),
        typing: interpreter.typings.fresh(StackType::Int),
    };
    call(interpreter, frame, callee, &shape, vec![id])
}
