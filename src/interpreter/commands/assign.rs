//! Constants, variables, discards and string joins.

use crate::{
    interpreter::{
        commands::{opcodes, Access},
        frame::Frame,
        Interpreter,
    },
    ir::{Expr, Instruction},
    script::StackType,
    Result,
};

pub(super) fn access(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    access: Access,
) -> Result<Instruction> {
    let typings = &mut interpreter.typings;

    let (definition, expression) = match access {
        Access::Constant(stack_type) => {
            let value = frame.operand()?.clone();
            if value.stack_type() != stack_type {
                return Err(malformed_error!(
                    "Script {} pc {}: constant {} is not a {}",
                    frame.id,
                    frame.pc,
                    value,
                    stack_type
                ));
            }
            let constant = Expr::Cst {
                value: value.clone(),
                typing: typings.fresh(stack_type),
            };
            let slot = frame.push(typings, stack_type, Some(value))?;
            (slot.expr(), constant)
        }
        Access::Load(storage) => {
            let variable = storage
                .variable(frame.id, frame.int_operand()?)
                .ok_or_else(|| malformed_error!("Script {}: negative local index", frame.id))?;
            let source = Expr::Var {
                variable,
                typing: typings.of_variable(variable),
            };
            let slot = frame.push(typings, storage.stack_type(), None)?;
            (slot.expr(), source)
        }
        Access::Store(storage) => {
            let variable = storage
                .variable(frame.id, frame.int_operand()?)
                .ok_or_else(|| malformed_error!("Script {}: negative local index", frame.id))?;
            let slot = frame.pop(storage.stack_type())?;
            let target = Expr::Var {
                variable,
                typing: typings.of_variable(variable),
            };
            (target, slot.expr())
        }
    };

    typings.assign(&definition.typings(), &expression.typings())?;
    Ok(Instruction::Assignment {
        definitions: vec![definition],
        expression,
    })
}

pub(super) fn discard(frame: &mut Frame, stack_type: StackType) -> Result<Instruction> {
    Ok(Instruction::Assignment {
        definitions: Vec::new(),
        expression: frame.pop(stack_type)?.expr(),
    })
}

pub(super) fn join_string(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
) -> Result<Instruction> {
    let count = usize::try_from(frame.int_operand()?)
        .map_err(|_| malformed_error!("Script {}: negative join count", frame.id))?;
    let parts = frame.pop_types(&vec![StackType::String; count])?;

    let typing = interpreter.typings.fresh(StackType::String);
    let slot = frame.push(&mut interpreter.typings, StackType::String, None)?;
    interpreter.typings.merge(slot.typing, typing)?;

    Ok(Instruction::Assignment {
        definitions: vec![slot.expr()],
        expression: Expr::Operation {
            opcode: opcodes::JOIN_STRING,
            arguments: parts.iter().map(|p| p.expr()).collect(),
            results: vec![StackType::String],
            typings: vec![typing],
            dot: false,
        },
    })
}
