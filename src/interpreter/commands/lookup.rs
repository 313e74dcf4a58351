//! Lookups whose types depend on stack constants or external declarations.

use crate::{
    interpreter::{frame::Frame, Interpreter},
    ir::{Expr, Instruction, TypingId, Variable},
    script::{prototype, Prototype, StackType, Type},
    Error, Result,
};

/// Reads the type tag constant `depth` slots below the top.
fn type_tag(frame: &Frame, depth: usize) -> Result<Type> {
    let tag = frame.peek_int_at(depth)?;
    u8::try_from(tag)
        .ok()
        .and_then(Type::from_desc_byte)
        .ok_or_else(|| {
            malformed_error!(
                "Script {} pc {}: {} is not a type tag",
                frame.id,
                frame.pc,
                tag
            )
        })
}

/// Pops a slot and pins it to `prototype`.
fn pop_as(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    prototype: Prototype,
) -> Result<Expr> {
    let element = frame.pop(prototype.stack_type())?;
    let typing = interpreter.typings.prototype(prototype);
    interpreter.typings.merge(element.typing, typing)?;
    Ok(element.expr())
}

/// Pushes the single result of `operation`, whose typing is `typing`.
fn define(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    opcode: u16,
    arguments: Vec<Expr>,
    typing: TypingId,
) -> Result<Instruction> {
    let stack_type = interpreter.typings.stack_type(typing);
    let slot = frame.push(&mut interpreter.typings, stack_type, None)?;
    interpreter.typings.merge(slot.typing, typing)?;
    Ok(Instruction::Assignment {
        definitions: vec![slot.expr()],
        expression: Expr::Operation {
            opcode,
            arguments,
            results: vec![stack_type],
            typings: vec![typing],
            dot: false,
        },
    })
}

/// `enum(key_type, value_type, enum, key)` and `enum_hasoutput(key_type, enum, key)`.
///
/// The key and value types are constants pushed ahead of the lookup; they
/// type the key and the result.
pub(super) fn enumerated(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    value_tag: bool,
) -> Result<Instruction> {
    let opcode = frame.opcode()?;
    let key = frame.pop(StackType::Int)?;
    let enum_id = pop_as(interpreter, frame, prototype::ENUM)?;

    let value = if value_tag {
        let ty = type_tag(frame, 0)?;
        Some((ty, pop_as(interpreter, frame, prototype::TYPE)?))
    } else {
        None
    };

    let key_type = type_tag(frame, 0)?;
    let key_typing = interpreter.typings.prototype(Prototype::of(key_type));
    interpreter.typings.merge(key.typing, key_typing)?;
    let key_tag = pop_as(interpreter, frame, prototype::TYPE)?;

    let mut arguments = vec![key_tag];
    let result = match value {
        Some((ty, tag)) => {
            arguments.push(tag);
            Prototype::of(ty)
        }
        None => prototype::BOOLEAN,
    };
    arguments.extend([enum_id, key.expr()]);

    let typing = interpreter.typings.prototype(result);
    define(interpreter, frame, opcode, arguments, typing)
}

/// `*_param(receiver, param)`: typed by the declared prototype of the param.
pub(super) fn param(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    receiver: Prototype,
) -> Result<Instruction> {
    let opcode = frame.opcode()?;
    let id = frame.peek_int_at(0)?;
    let declared = interpreter
        .prototypes
        .param(id)
        .ok_or(Error::MissingPrototype { key: id })?;

    let param = pop_as(interpreter, frame, prototype::PARAM)?;
    let receiver = pop_as(interpreter, frame, receiver)?;
    let typing = interpreter.typings.prototype(declared);
    define(interpreter, frame, opcode, vec![receiver, param], typing)
}

/// `db_getfield(row, column, tuple)`: pushes one value per declared column field.
pub(super) fn db_get_field(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
) -> Result<Instruction> {
    let opcode = frame.opcode()?;
    let column_id = frame.peek_int_at(1)?;
    let fields = interpreter
        .prototypes
        .db_column(column_id)
        .ok_or(Error::MissingPrototype { key: column_id })?;

    let tuple = pop_as(interpreter, frame, prototype::INT)?;
    let column = pop_as(interpreter, frame, prototype::DBCOLUMN)?;
    let row = pop_as(interpreter, frame, prototype::DBROW)?;

    let results: Vec<StackType> = fields.iter().map(Prototype::stack_type).collect();
    let typings: Vec<TypingId> = fields
        .iter()
        .map(|&field| interpreter.typings.prototype(field))
        .collect();
    let slots = frame.push_all(&mut interpreter.typings, &results)?;
    let slot_typings: Vec<TypingId> = slots.iter().map(|s| s.typing).collect();
    interpreter.typings.assign(&slot_typings, &typings)?;

    Ok(Instruction::Assignment {
        definitions: slots.iter().map(|s| s.expr()).collect(),
        expression: Expr::Operation {
            opcode,
            arguments: vec![row, column, tuple],
            results,
            typings,
            dot: false,
        },
    })
}

/// The local array the operand's low bits (or high bits, for a definition) name.
fn array(interpreter: &mut Interpreter<'_>, frame: &Frame, index: i32) -> Result<Expr> {
    let index = u32::try_from(index)
        .map_err(|_| malformed_error!("Script {}: negative array index {}", frame.id, index))?;
    let variable = Variable::Array {
        script: frame.id,
        index,
    };
    Ok(Expr::Var {
        variable,
        typing: interpreter.typings.of_variable(variable),
    })
}

/// `define_array(length)`: the operand packs the array index above the
/// element type tag.
pub(super) fn define_array(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
) -> Result<Instruction> {
    let operand = frame.int_operand()?;
    let length = pop_as(interpreter, frame, prototype::LENGTH)?;
    let array = array(interpreter, frame, operand >> 16)?;
    let element = Type::from_desc_byte(operand as u8).ok_or_else(|| {
        malformed_error!(
            "Script {} pc {}: unknown array element type {}",
            frame.id,
            frame.pc,
            operand & 0xff
        )
    })?;
    if let Some(&typing) = array.typings().first() {
        interpreter.typings.freeze(typing, element)?;
    }

    Ok(Instruction::Assignment {
        definitions: Vec::new(),
        expression: Expr::Operation {
            opcode: frame.opcode()?,
            arguments: vec![array, length],
            results: Vec::new(),
            typings: Vec::new(),
            dot: false,
        },
    })
}

/// `push_array_int(index)`: loads an element.
pub(super) fn push_array(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
) -> Result<Instruction> {
    let opcode = frame.opcode()?;
    let index = pop_as(interpreter, frame, prototype::INDEX)?;
    let array = array(interpreter, frame, frame.int_operand()?)?;
    let typing = interpreter.typings.fresh(StackType::Int);
    for &element in &array.typings() {
        interpreter.typings.merge(element, typing)?;
    }
    define(interpreter, frame, opcode, vec![array, index], typing)
}

/// `pop_array_int(index, value)`: stores an element.
pub(super) fn pop_array(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
) -> Result<Instruction> {
    let value = frame.pop(StackType::Int)?;
    let index = pop_as(interpreter, frame, prototype::INDEX)?;
    let array = array(interpreter, frame, frame.int_operand()?)?;
    for &element in &array.typings() {
        interpreter.typings.merge(value.typing, element)?;
    }

    Ok(Instruction::Assignment {
        definitions: Vec::new(),
        expression: Expr::Operation {
            opcode: frame.opcode()?,
            arguments: vec![array, index, value.expr()],
            results: Vec::new(),
            typings: Vec::new(),
            dot: false,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        interpreter::{commands::opcodes, InterpreterConfig},
        script::{PrototypeMap, Script, ScriptMap, Value},
    };

    fn frame(opcode: u16, operand: i32) -> Frame {
        let script = Script::new(vec![opcode], vec![Value::Int(operand)], 0, 0, vec![]);
        Frame::new(1, Arc::new(script))
    }

    fn push(interpreter: &mut Interpreter<'_>, frame: &mut Frame, value: Option<i32>) -> TypingId {
        frame
            .push(&mut interpreter.typings, StackType::Int, value.map(Value::Int))
            .unwrap()
            .typing
    }

    #[test]
    fn test_enum_types_key_and_result() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
        let mut frame = frame(opcodes::ENUM, 0);

        push(&mut interpreter, &mut frame, Some(i32::from(b'i')));
        push(&mut interpreter, &mut frame, Some(i32::from(b'o')));
        push(&mut interpreter, &mut frame, Some(345));
        let key = push(&mut interpreter, &mut frame, None);

        let insn = enumerated(&mut interpreter, &mut frame, true).unwrap();
        assert_eq!(insn.to_string(), "stack4 = op3408(stack0, stack1, stack2, stack3);");
        assert_eq!(interpreter.typings.resolve(key), Type::Int);
        match insn {
            Instruction::Assignment { definitions, .. } => {
                let typing = definitions[0].typings()[0];
                assert_eq!(interpreter.typings.resolve(typing), Type::Obj);
            }
            other => panic!("unexpected {other}"),
        }
        assert_eq!(frame.depth(), 1);
    }

    #[test]
    fn test_enum_hasoutput_is_boolean() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
        let mut frame = frame(opcodes::ENUM_HASOUTPUT, 0);

        push(&mut interpreter, &mut frame, Some(i32::from(b'S')));
        push(&mut interpreter, &mut frame, Some(12));
        let key = push(&mut interpreter, &mut frame, None);

        let insn = enumerated(&mut interpreter, &mut frame, false).unwrap();
        assert_eq!(interpreter.typings.resolve(key), Type::Stat);
        match insn {
            Instruction::Assignment { definitions, .. } => {
                let typing = definitions[0].typings()[0];
                assert_eq!(interpreter.typings.resolve(typing), Type::Boolean);
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_enum_requires_constant_tag() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
        let mut frame = frame(opcodes::ENUM, 0);
        for _ in 0..4 {
            push(&mut interpreter, &mut frame, None);
        }
        let err = enumerated(&mut interpreter, &mut frame, true).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_param_uses_declared_prototype() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new().with_param(77, prototype::GRAPHIC);
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());

        let mut known = frame(opcodes::OC_PARAM, 0);
        let obj = push(&mut interpreter, &mut known, None);
        push(&mut interpreter, &mut known, Some(77));
        let insn = param(&mut interpreter, &mut known, prototype::OBJ).unwrap();
        assert_eq!(interpreter.typings.resolve(obj), Type::Obj);
        assert_eq!(insn.to_string(), "stack2 = op6515(stack0, stack1);");

        let mut unknown = frame(opcodes::OC_PARAM, 0);
        push(&mut interpreter, &mut unknown, None);
        push(&mut interpreter, &mut unknown, Some(78));
        let err = param(&mut interpreter, &mut unknown, prototype::OBJ).unwrap_err();
        assert!(matches!(err, Error::MissingPrototype { key: 78 }));
    }

    #[test]
    fn test_db_get_field_pushes_declared_fields() {
        let scripts = ScriptMap::new();
        let prototypes =
            PrototypeMap::new().with_db_column(9, vec![prototype::OBJ, prototype::TEXT]);
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
        let mut frame = frame(opcodes::DB_GETFIELD, 0);

        let row = push(&mut interpreter, &mut frame, None);
        push(&mut interpreter, &mut frame, Some(9));
        push(&mut interpreter, &mut frame, Some(0));

        let insn = db_get_field(&mut interpreter, &mut frame).unwrap();
        assert_eq!(interpreter.typings.resolve(row), Type::Dbrow);
        assert_eq!(frame.depth(), 2);
        assert_eq!(insn.to_string(), "stack3, stack4 = op7502(stack0, stack1, stack2);");
    }

    #[test]
    fn test_db_get_field_unknown_column() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
        let mut frame = frame(opcodes::DB_GETFIELD, 0);

        push(&mut interpreter, &mut frame, None);
        push(&mut interpreter, &mut frame, Some(11));
        push(&mut interpreter, &mut frame, Some(0));

        let err = db_get_field(&mut interpreter, &mut frame).unwrap_err();
        assert!(matches!(err, Error::MissingPrototype { key: 11 }));
    }

    #[test]
    fn test_array_elements_share_typing() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());

        let mut define = frame(opcodes::DEFINE_ARRAY, (2 << 16) | i32::from(b'o'));
        push(&mut interpreter, &mut define, None);
        define_array(&mut interpreter, &mut define).unwrap();

        let mut store = frame(opcodes::POP_ARRAY_INT, 2);
        push(&mut interpreter, &mut store, None);
        let value = push(&mut interpreter, &mut store, None);
        let insn = pop_array(&mut interpreter, &mut store).unwrap();

        assert_eq!(interpreter.typings.resolve(value), Type::Obj);
        assert_eq!(insn.to_string(), "op46($array2, stack0, stack1);");
    }
}
