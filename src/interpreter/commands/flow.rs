//! Jumps and returns.

use std::collections::BTreeMap;

use crate::{
    interpreter::{frame::Frame, Interpreter},
    ir::{Expr, Instruction},
    script::StackType,
    Result,
};

pub(super) fn switch(frame: &mut Frame) -> Result<Instruction> {
    let expression = frame.pop(StackType::Int)?.expr();
    let mut cases = BTreeMap::new();
    for (&value, &offset) in frame.switch_table()? {
        cases.insert(value, frame.jump(offset)?);
    }
    Ok(Instruction::Switch { expression, cases })
}

pub(super) fn goto(frame: &mut Frame) -> Result<Instruction> {
    Ok(Instruction::Goto(frame.jump(frame.int_operand()?)?))
}

/// `if (left op right) goto target`
pub(super) fn branch_compare(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
) -> Result<Instruction> {
    let target = frame.jump(frame.int_operand()?)?;
    let right = frame.pop(StackType::Int)?;
    let left = frame.pop(StackType::Int)?;
    interpreter.typings.compare(left.typing, right.typing)?;

    Ok(Instruction::Branch {
        condition: Expr::Operation {
            opcode: frame.opcode()?,
            arguments: vec![left.expr(), right.expr()],
            results: Vec::new(),
            typings: Vec::new(),
            dot: false,
        },
        target,
    })
}

/// Returns whatever is left on the stack, which must match the declared returns.
pub(super) fn ret(interpreter: &mut Interpreter<'_>, frame: &mut Frame) -> Result<Instruction> {
    let values = frame.pop_all();
    let stack_types: Vec<StackType> = values.iter().map(|v| v.stack_type()).collect();
    if stack_types != frame.script.return_types {
        return Err(frame.imbalance(format!(
            "returns {stack_types:?}, declared {:?}",
            frame.script.return_types
        )));
    }

    let returns = interpreter.typings.returns(frame.id, &stack_types)?;
    let typings: Vec<_> = values.iter().map(|v| v.typing).collect();
    interpreter.typings.assign(&returns, &typings)?;

    Ok(Instruction::Return(values.iter().map(|v| v.expr()).collect()))
}
