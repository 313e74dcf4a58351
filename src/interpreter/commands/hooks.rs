//! UI event hook registration.
//!
//! A hook setter binds a handler script to a component event. Its arguments are
//! laid out as
//!
//! ```text
//! script_id, arg..., [trigger..., trigger_count], descriptor, [component]
//! ```
//!
//! where `descriptor` is a string constant with one type character per handler
//! argument, followed by `Y` when a transmit list is present. Interface-level
//! setters (`IF_`) take the target component last; component-relative ones use
//! the operand as the dot flag.

use crate::{
    analysis::callgraph::Trigger,
    interpreter::{
        commands::{opcodes, Transmit},
        frame::Frame,
        Interpreter,
    },
    ir::{EventProperty, Expr, Instruction, Variable},
    script::{prototype, StackType, Type},
    Result,
};

/// Hook setter opcodes from `CC_SETONCLICK` to `last`, with their `IF_` counterparts.
pub(super) fn setters(last: u16) -> Vec<u16> {
    // 1413 was never assigned.
    let skipped = 13;
    let base = opcodes::CC_SETONCLICK;
    (base..=last)
        .filter(|&opcode| opcode - base != skipped)
        .flat_map(|opcode| [opcode, opcode + opcodes::IF_OFFSET])
        .collect()
}

/// Returns how the transmit list of a current-revision hook setter is typed.
pub(super) fn transmit(opcode: u16) -> Transmit {
    let cc = opcode % opcodes::IF_OFFSET + opcodes::IF_OFFSET;
    match cc {
        opcodes::CC_SETONVARTRANSMIT => Transmit::Varp,
        opcodes::CC_SETONINVTRANSMIT => Transmit::Inv,
        opcodes::CC_SETONSTATTRANSMIT => Transmit::Stat,
        opcodes::CC_SETONVARCTRANSMIT => Transmit::VarcInt,
        opcodes::CC_SETONVARCSTRTRANSMIT => Transmit::VarcString,
        _ => Transmit::None,
    }
}

fn pointer(interpreter: &mut Interpreter<'_>, variable: Variable) -> Expr {
    interpreter.typings.of_variable(variable);
    Expr::Pointer(variable)
}

/// Pops one entry of a transmit list.
fn trigger(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    transmit: Transmit,
) -> Result<Expr> {
    let expected = match transmit {
        Transmit::Untyped => return Ok(frame.pop(StackType::Int)?.expr()),
        Transmit::Stat => prototype::STAT,
        Transmit::Inv => prototype::INV,
        Transmit::Varp => return Ok(pointer(interpreter, Variable::Varp(frame.pop_int()?))),
        Transmit::VarcInt => return Ok(pointer(interpreter, Variable::VarcInt(frame.pop_int()?))),
        Transmit::VarcString => {
            return Ok(pointer(interpreter, Variable::VarcString(frame.pop_int()?)))
        }
        Transmit::None => {
            return Err(malformed_error!(
                "Script {} pc {}: hook takes no transmit list",
                frame.id,
                frame.pc
            ))
        }
    };
    let element = frame.pop(StackType::Int)?;
    let typing = interpreter.typings.prototype(expected);
    interpreter.typings.merge(element.typing, typing)?;
    Ok(element.expr())
}

pub(super) fn translate(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    transmit: Transmit,
) -> Result<Instruction> {
    let opcode = frame.opcode()?;
    let (component, dot) = if opcode >= opcodes::CC_SETONCLICK + opcodes::IF_OFFSET {
        let element = frame.pop(StackType::Int)?;
        let expected = interpreter.typings.prototype(prototype::COMPONENT);
        interpreter.typings.merge(element.typing, expected)?;
        (Some(Box::new(element.expr())), false)
    } else {
        (None, frame.int_operand()? != 0)
    };

    let descriptor = frame.pop_value(StackType::String)?;
    let mut descriptor = descriptor
        .as_str()
        .ok_or_else(|| malformed_error!("Script {}: hook descriptor is not a string", frame.id))?
        .to_string();

    let mut triggers = Vec::new();
    if descriptor.ends_with('Y') {
        descriptor.pop();
        let count = frame.pop_int()?;
        for _ in 0..count {
            triggers.push(trigger(interpreter, frame, transmit)?);
        }
        triggers.reverse();
    }

    let types = descriptor
        .chars()
        .map(|c| {
            Type::from_desc(c).ok_or_else(|| {
                malformed_error!(
                    "Script {} pc {}: unknown type descriptor {:?}",
                    frame.id,
                    frame.pc,
                    c
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut arguments = Vec::with_capacity(types.len());
    for ty in types.iter().rev() {
        let property = frame.peek_value().and_then(EventProperty::from_value);
        let element = frame.pop(ty.stack_type())?;
        arguments.push(match property {
            Some(property) => Expr::EventProperty(property),
            None => element.expr(),
        });
    }
    arguments.reverse();

    let script = frame.pop_int()?;
    if script >= 0 {
        let typings = &mut interpreter.typings;
        let stack_types: Vec<StackType> = types.iter().map(|t| t.stack_type()).collect();
        let parameters = typings.args(script, &stack_types);
        for ((&parameter, &ty), argument) in parameters.iter().zip(&types).zip(&arguments) {
            typings.freeze(parameter, ty)?;
            if let Expr::Var { typing, .. } = argument {
                typings.merge(*typing, parameter)?;
            }
        }
        // A hook registers its handler without running it, so the edge does not
        // depend on the handler having been interpreted.
        interpreter
            .call_graph
            .call(frame.id, script, Trigger::ClientScript)?;
    }

    Ok(Instruction::Assignment {
        definitions: Vec::new(),
        expression: Expr::Hook {
            opcode,
            script,
            arguments,
            triggers,
            dot,
            component,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::commands::opcodes::*;

    #[test]
    fn test_opcode_ranges() {
        let current = setters(CC_SETONVARCSTRTRANSMIT);
        assert!(current.contains(&CC_SETONCLICK));
        assert!(current.contains(&IF_SETONCLICK));
        assert!(current.contains(&CC_SETONVARCSTRTRANSMIT));
        assert!(!current.contains(&1413));
        assert!(!current.contains(&2413));
        assert_eq!(current.len(), 2 * 29);

        let legacy = setters(CC_SETONRESIZE);
        assert!(legacy.contains(&(CC_SETONRESIZE + IF_OFFSET)));
        assert!(!legacy.contains(&CC_SETONVARCTRANSMIT));
    }

    #[test]
    fn test_transmit_kinds() {
        assert_eq!(transmit(CC_SETONVARTRANSMIT), Transmit::Varp);
        assert_eq!(transmit(CC_SETONVARTRANSMIT + IF_OFFSET), Transmit::Varp);
        assert_eq!(transmit(CC_SETONSTATTRANSMIT), Transmit::Stat);
        assert_eq!(transmit(CC_SETONVARCSTRTRANSMIT + IF_OFFSET), Transmit::VarcString);
        assert_eq!(transmit(CC_SETONCLICK), Transmit::None);
        assert_eq!(transmit(CC_SETONKEY + IF_OFFSET), Transmit::None);
    }
}
