//! Declarative rules.
//!
//! Each [`Signature`] lists the arguments a command pops and the results it
//! pushes, in push order, as prototypes. Translating one pops the stack
//! arguments, pins every argument and result to its prototype's type and emits
//! a single assignment of an [`Expr::Operation`].
//!
//! Catalogue entries are written as
//!
//! ```text
//! OPCODE[.dot](ARG[@source], ...) [-> (DEF[@destination], ...)]
//! ```
//!
//! where sources are `stack` (the default), `operand` or `local`, and
//! destinations are `stack` (the default) or `local`.

use crate::{
    interpreter::{
        commands::{opcodes, Arg, Def, Destination, Signature, Source},
        frame::Frame,
        Interpreter,
    },
    ir::{Expr, Instruction, Variable},
    script::{prototype, StackType, Value},
    Result,
};

macro_rules! signature {
    (@src) => { Source::Stack };
    (@src stack) => { Source::Stack };
    (@src operand) => { Source::Operand };
    (@src local) => { Source::Local };
    (@dst) => { Destination::Stack };
    (@dst stack) => { Destination::Stack };
    (@dst local) => { Destination::Local };
    (@dot) => { false };
    (@dot dot) => { true };
    (
        $op:ident $(. $flag:ident)? ($($arg:ident $(@ $src:ident)?),* $(,)?)
        $(-> ($($def:ident $(@ $dst:ident)?),* $(,)?))?
    ) => {
        Signature {
            opcode: opcodes::$op,
            args: &[$(Arg {
                prototype: prototype::$arg,
                source: signature!(@src $($src)?),
            }),*],
            defs: &[$($(Def {
                prototype: prototype::$def,
                destination: signature!(@dst $($dst)?),
            }),*)?],
            dot: signature!(@dot $($flag)?),
        }
    };
}

/// Rules shared by both revisions.
pub(super) static COMMON: &[Signature] = &[
    // Component creation and lookup
    signature!(CC_CREATE.dot(COMPONENT, IFTYPE, COMSUBID)),
    signature!(CC_DELETE.dot()),
    signature!(CC_DELETEALL(COMPONENT)),
    signature!(CC_FIND.dot(COMPONENT, COMSUBID) -> (BOOLEAN)),
    signature!(IF_FIND.dot(COMPONENT) -> (BOOLEAN)),
    // Component setters
    signature!(CC_SETPOSITION.dot(X, Y, SETPOSH, SETPOSV)),
    signature!(CC_SETSIZE.dot(WIDTH, HEIGHT, SETSIZE, SETSIZE)),
    signature!(CC_SETHIDE.dot(BOOLEAN)),
    signature!(CC_SETSCROLLPOS.dot(X, Y)),
    signature!(CC_SETCOLOUR.dot(COLOUR)),
    signature!(CC_SETFILL.dot(BOOLEAN)),
    signature!(CC_SETTRANS.dot(TRANS)),
    signature!(CC_SETGRAPHIC.dot(GRAPHIC)),
    signature!(CC_SET2DANGLE.dot(ANGLE)),
    signature!(CC_SETMODEL.dot(MODEL)),
    signature!(CC_SETMODELANIM.dot(SEQ)),
    signature!(CC_SETTEXT.dot(TEXT)),
    signature!(CC_SETTEXTFONT.dot(FONTMETRICS)),
    signature!(CC_SETTEXTALIGN.dot(SETTEXTALIGNH, SETTEXTALIGNV, INT)),
    signature!(CC_SETTEXTSHADOW.dot(BOOLEAN)),
    signature!(CC_SETOBJECT.dot(OBJ, NUM)),
    signature!(CC_SETNPCHEAD.dot(NPC)),
    signature!(CC_SETOP.dot(OPINDEX, OP)),
    signature!(CC_SETDRAGGABLE.dot(COMPONENT, COMSUBID)),
    signature!(CC_SETOPBASE.dot(OPBASE)),
    signature!(CC_CLEAROPS.dot()),
    signature!(IF_SETPOSITION(X, Y, SETPOSH, SETPOSV, COMPONENT)),
    signature!(IF_SETSIZE(WIDTH, HEIGHT, SETSIZE, SETSIZE, COMPONENT)),
    signature!(IF_SETHIDE(BOOLEAN, COMPONENT)),
    signature!(IF_SETCOLOUR(COLOUR, COMPONENT)),
    signature!(IF_SETGRAPHIC(GRAPHIC, COMPONENT)),
    signature!(IF_SETTEXT(TEXT, COMPONENT)),
    signature!(IF_SETOBJECT(OBJ, NUM, COMPONENT)),
    signature!(IF_SETOP(OPINDEX, OP, COMPONENT)),
    // Component getters
    signature!(CC_GETX.dot() -> (X)),
    signature!(CC_GETY.dot() -> (Y)),
    signature!(CC_GETWIDTH.dot() -> (WIDTH)),
    signature!(CC_GETHEIGHT.dot() -> (HEIGHT)),
    signature!(CC_GETHIDE.dot() -> (BOOLEAN)),
    signature!(CC_GETTEXT.dot() -> (TEXT)),
    signature!(CC_GETTRANS.dot() -> (TRANS)),
    signature!(CC_GETINVOBJECT.dot() -> (OBJ)),
    signature!(CC_GETINVCOUNT.dot() -> (NUM)),
    signature!(CC_GETID.dot() -> (COMSUBID)),
    signature!(CC_GETOP.dot(OPINDEX) -> (OP)),
    signature!(IF_GETX(COMPONENT) -> (X)),
    signature!(IF_GETY(COMPONENT) -> (Y)),
    signature!(IF_GETWIDTH(COMPONENT) -> (WIDTH)),
    signature!(IF_GETHEIGHT(COMPONENT) -> (HEIGHT)),
    signature!(IF_GETHIDE(COMPONENT) -> (BOOLEAN)),
    signature!(IF_GETTEXT(COMPONENT) -> (TEXT)),
    signature!(IF_HASSUB(COMPONENT) -> (BOOLEAN)),
    signature!(IF_GETTOP() -> (INTERFACE)),
    // Client
    signature!(MES(TEXT)),
    signature!(ANIM(SEQ, INT)),
    signature!(IF_CLOSE()),
    signature!(OPENURL(STRING, BOOLEAN)),
    signature!(SOUND_SYNTH(SYNTH, COUNT, INT)),
    signature!(CLIENTCLOCK() -> (CLOCK)),
    signature!(INV_GETOBJ(INV, INDEX) -> (OBJ)),
    signature!(INV_GETNUM(INV, INDEX) -> (NUM)),
    signature!(INV_TOTAL(INV, OBJ) -> (NUM)),
    signature!(INV_SIZE(INV) -> (LENGTH)),
    signature!(STAT(STAT) -> (LEVEL)),
    signature!(STAT_BASE(STAT) -> (LEVEL)),
    signature!(STAT_XP(STAT) -> (XP)),
    signature!(COORD() -> (COORD)),
    signature!(COORDX(COORD) -> (X)),
    signature!(COORDY(COORD) -> (Y)),
    signature!(COORDZ(COORD) -> (LEVEL)),
    signature!(MAP_MEMBERS() -> (BOOLEAN)),
    signature!(MOVECOORD(COORD, X, LEVEL, Y) -> (COORD)),
    signature!(ENUM_STRING(ENUM, INT) -> (STRING)),
    signature!(ENUM_GETOUTPUTCOUNT(ENUM) -> (COUNT)),
    signature!(FRIEND_COUNT() -> (COUNT)),
    signature!(FRIEND_GETNAME(INDEX) -> (USERNAME, USERNAME)),
    // Arithmetic
    signature!(ADD(INT, INT) -> (INT)),
    signature!(SUB(INT, INT) -> (INT)),
    signature!(MULTIPLY(INT, INT) -> (INT)),
    signature!(DIV(INT, INT) -> (INT)),
    signature!(RANDOM(INT) -> (INT)),
    signature!(RANDOMINC(INT) -> (INT)),
    signature!(INTERPOLATE(INT, INT, INT, INT, INT) -> (INT)),
    signature!(ADDPERCENT(INT, INT) -> (INT)),
    signature!(SETBIT(FLAGS, INDEX) -> (FLAGS)),
    signature!(CLEARBIT(FLAGS, INDEX) -> (FLAGS)),
    signature!(TESTBIT(FLAGS, INDEX) -> (BOOLEAN)),
    signature!(MOD(INT, INT) -> (INT)),
    signature!(POW(INT, INT) -> (INT)),
    signature!(AND(INT, INT) -> (INT)),
    signature!(OR(INT, INT) -> (INT)),
    signature!(MIN(INT, INT) -> (INT)),
    signature!(MAX(INT, INT) -> (INT)),
    // Strings
    signature!(APPEND_NUM(STRING, INT) -> (STRING)),
    signature!(APPEND(STRING, STRING) -> (STRING)),
    signature!(APPEND_SIGNNUM(STRING, INT) -> (STRING)),
    signature!(LOWERCASE(STRING) -> (STRING)),
    signature!(TOSTRING(INT) -> (STRING)),
    signature!(COMPARE(STRING, STRING) -> (INT)),
    signature!(PARAHEIGHT(STRING, WIDTH, FONTMETRICS) -> (HEIGHT)),
    signature!(PARAWIDTH(STRING, WIDTH, FONTMETRICS) -> (WIDTH)),
    signature!(TEXT_SWITCH(BOOLEAN, STRING, STRING) -> (STRING)),
    signature!(APPEND_CHAR(STRING, CHAR) -> (STRING)),
    signature!(STRING_LENGTH(STRING) -> (LENGTH)),
    signature!(SUBSTRING(STRING, INDEX, INDEX) -> (STRING)),
    signature!(STRING_INDEXOF_STRING(STRING, STRING, INDEX) -> (INDEX)),
    // Object config
    signature!(OC_NAME(OBJ) -> (STRING)),
    signature!(OC_OP(OBJ, OPINDEX) -> (OP)),
    signature!(OC_IOP(OBJ, OPINDEX) -> (OP)),
    signature!(OC_COST(OBJ) -> (INT)),
    signature!(OC_STACKABLE(OBJ) -> (BOOLEAN)),
];

/// Rules only the current revision has.
pub(super) static CURRENT: &[Signature] = &[signature!(MEC_TEXT(MAPELEMENT) -> (TEXT))];

/// Legacy variable and local access, written against the operand.
pub(super) static LEGACY: &[Signature] = &[
    signature!(GET_VAR(INT@operand) -> (INT)),
    signature!(SET_VAR(INT@operand, INT)),
    signature!(GET_VARBIT(INT@operand) -> (INT)),
    signature!(SET_VARBIT(INT@operand, INT)),
    signature!(PUSH_INT_LOCAL(INT@local) -> (INT)),
    signature!(POP_INT_LOCAL(INT) -> (INT@local)),
    signature!(PUSH_STRING_LOCAL(STRING@local) -> (STRING)),
    signature!(POP_STRING_LOCAL(STRING) -> (STRING@local)),
    signature!(GET_VARC_INT(INT@operand) -> (INT)),
    signature!(SET_VARC_INT(INT@operand, INT)),
    signature!(GET_VARC_STRING(INT@operand) -> (STRING)),
    signature!(SET_VARC_STRING(INT@operand, STRING)),
    signature!(DEFINE_ARRAY(LENGTH, INT@operand)),
    signature!(PUSH_ARRAY_INT(INDEX, INT@operand) -> (INT)),
    signature!(POP_ARRAY_INT(INDEX, INT, INT@operand)),
    signature!(POP_INT_DISCARD(INT)),
    signature!(POP_STRING_DISCARD(STRING)),
];

/// Returns the local a `local`-sourced argument or result addresses.
fn local(frame: &Frame, stack_type: StackType) -> Result<Variable> {
    let index = u32::try_from(frame.int_operand()?)
        .map_err(|_| malformed_error!("Script {} pc {}: negative local", frame.id, frame.pc))?;
    Ok(Variable::Local {
        script: frame.id,
        index,
        stack_type,
    })
}

pub(super) fn translate(
    interpreter: &mut Interpreter<'_>,
    frame: &mut Frame,
    signature: &'static Signature,
) -> Result<Instruction> {
    let operand = frame.operand()?.clone();
    if !signature.uses_operand()
        && interpreter.config.check_operands
        && operand != Value::Int(0)
    {
        return Err(malformed_error!(
            "Script {} pc {}: opcode {} takes no operand, found {}",
            frame.id,
            frame.pc,
            signature.opcode,
            operand
        ));
    }
    let dot = signature.dot && operand != Value::Int(0);

    let mut popped = frame
        .pop_types(&signature.stack_arguments())?
        .into_iter();
    let typings = &mut interpreter.typings;

    let mut arguments = Vec::with_capacity(signature.args.len());
    for arg in signature.args {
        let expected = typings.prototype(arg.prototype);
        let expr = match arg.source {
            Source::Stack => {
                let element = popped
                    .next()
                    .ok_or_else(|| frame.imbalance("signature arguments exhausted"))?;
                typings.merge(element.typing, expected)?;
                element.expr()
            }
            Source::Operand => {
                if operand.stack_type() != arg.prototype.stack_type() {
                    return Err(malformed_error!(
                        "Script {} pc {}: operand {} is not a {}",
                        frame.id,
                        frame.pc,
                        operand,
                        arg.prototype
                    ));
                }
                Expr::Cst {
                    value: operand.clone(),
                    typing: expected,
                }
            }
            Source::Local => {
                let variable = local(frame, arg.prototype.stack_type())?;
                let typing = typings.of_variable(variable);
                typings.merge(typing, expected)?;
                Expr::Var { variable, typing }
            }
        };
        arguments.push(expr);
    }

    let results: Vec<StackType> = signature
        .defs
        .iter()
        .map(|d| d.prototype.stack_type())
        .collect();
    let result_typings: Vec<_> = signature
        .defs
        .iter()
        .map(|d| typings.prototype(d.prototype))
        .collect();

    let mut definitions = Vec::with_capacity(signature.defs.len());
    for def in signature.defs {
        let stack_type = def.prototype.stack_type();
        definitions.push(match def.destination {
            Destination::Stack => frame.push(typings, stack_type, None)?.expr(),
            Destination::Local => {
                let variable = local(frame, stack_type)?;
                Expr::Var {
                    variable,
                    typing: typings.of_variable(variable),
                }
            }
        });
    }

    let definition_typings: Vec<_> = definitions.iter().flat_map(Expr::typings).collect();
    typings.assign(&definition_typings, &result_typings)?;

    Ok(Instruction::Assignment {
        definitions,
        expression: Expr::Operation {
            opcode: signature.opcode,
            arguments,
            results,
            typings: result_typings,
            dot,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        interpreter::InterpreterConfig,
        script::{PrototypeMap, Script, ScriptFormat, ScriptMap, Type},
    };

    fn find(catalogue: &'static [Signature], opcode: u16) -> &'static Signature {
        catalogue
            .iter()
            .find(|s| s.opcode == opcode)
            .unwrap_or_else(|| panic!("no signature for {opcode}"))
    }

    #[test]
    fn test_macro_shapes() {
        let getx = find(COMMON, opcodes::CC_GETX);
        assert!(getx.dot);
        assert!(getx.args.is_empty());
        assert_eq!(getx.defs[0].prototype, prototype::X);

        let pop_local = find(LEGACY, opcodes::POP_INT_LOCAL);
        assert_eq!(pop_local.args[0].source, Source::Stack);
        assert_eq!(pop_local.defs[0].destination, Destination::Local);
        assert!(pop_local.uses_operand());

        let add = find(COMMON, opcodes::ADD);
        assert!(!add.uses_operand());
        assert_eq!(add.stack_arguments(), vec![StackType::Int, StackType::Int]);
    }

    #[test]
    fn test_dot_follows_operand() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
        let script = Script::new(
            vec![opcodes::CC_GETX, opcodes::CC_GETX],
            vec![Value::Int(1), Value::Int(0)],
            0,
            0,
            vec![],
        );
        let mut frame = Frame::new(3, Arc::new(script));
        let signature = find(COMMON, opcodes::CC_GETX);

        let dotted = translate(&mut interpreter, &mut frame, signature).unwrap();
        frame.pc = 1;
        let plain = translate(&mut interpreter, &mut frame, signature).unwrap();

        assert_eq!(dotted.to_string(), "stack0 = .op1500();");
        assert_eq!(plain.to_string(), "stack1 = op1500();");
    }

    #[test]
    fn test_stack_arguments_are_pinned() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let mut interpreter =
            Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
        let script = Script::new(vec![opcodes::INV_GETOBJ], vec![Value::Int(0)], 0, 0, vec![]);
        let mut frame = Frame::new(3, Arc::new(script));
        let inv = frame
            .push(&mut interpreter.typings, StackType::Int, None)
            .unwrap();
        let slot = frame
            .push(&mut interpreter.typings, StackType::Int, None)
            .unwrap();

        let insn = translate(&mut interpreter, &mut frame, find(COMMON, opcodes::INV_GETOBJ))
            .unwrap();

        assert_eq!(interpreter.typings.resolve(inv.typing), Type::Inv);
        assert_eq!(interpreter.typings.resolve(slot.typing), Type::Int);
        assert_eq!(insn.to_string(), "stack2 = op3301(stack0, stack1);");
        match insn {
            Instruction::Assignment { definitions, .. } => {
                let typing = definitions[0].typings()[0];
                assert_eq!(interpreter.typings.resolve(typing), Type::Obj);
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_stray_operand_is_rejected() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let script = Script::new(vec![opcodes::IF_CLOSE], vec![Value::Int(9)], 0, 0, vec![]);
        let signature = find(COMMON, opcodes::IF_CLOSE);

        let mut strict = Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
        let mut frame = Frame::new(3, Arc::new(script.clone()));
        assert!(translate(&mut strict, &mut frame, signature).is_err());

        let config = InterpreterConfig::default().with_check_operands(false);
        let mut lenient = Interpreter::new(&scripts, &prototypes, config);
        let mut frame = Frame::new(3, Arc::new(script));
        assert!(translate(&mut lenient, &mut frame, signature).is_ok());
    }

    #[test]
    fn test_legacy_local_store() {
        let scripts = ScriptMap::new();
        let prototypes = PrototypeMap::new();
        let config = InterpreterConfig::default().with_format(ScriptFormat::Legacy);
        let mut interpreter = Interpreter::new(&scripts, &prototypes, config);
        let script = Script::new(vec![opcodes::POP_INT_LOCAL], vec![Value::Int(2)], 0, 0, vec![]);
        let mut frame = Frame::new(5, Arc::new(script));
        frame
            .push(&mut interpreter.typings, StackType::Int, None)
            .unwrap();

        let insn = translate(&mut interpreter, &mut frame, find(LEGACY, opcodes::POP_INT_LOCAL))
            .unwrap();
        assert_eq!(insn.to_string(), "$int2 = op34(stack0);");
        assert!(frame.is_empty());
    }
}
