//! The command table: one translation rule per opcode.
//!
//! A [`CommandTable`] is built once per run for one [`ScriptFormat`] and never
//! changes afterwards. Rules are grouped into the families of [`Command`]; most
//! opcodes are [`Command::Basic`] rules driven by a declarative [`Signature`],
//! the rest need control flow, call resolution or dynamic type tags.
//!
//! # Revisions
//!
//! | Opcode | Current | Legacy |
//! |--------|---------|--------|
//! | 40 | [`Command::Proc`] | [`Command::Invoke`] |
//! | variables, locals, arrays, discards | dedicated families | operand-sourced signatures |
//! | hook transmit lists | typed per hook | plain integers |
//! | `enum_hasoutput`, `db_getfield`, `mec_param` | present | absent |

mod assign;
mod basic;
mod call;
mod flow;
mod hooks;
mod lookup;
pub mod opcodes;

use rustc_hash::FxHashMap;

use crate::{
    interpreter::{frame::Frame, Interpreter},
    ir::{Instruction, Variable},
    script::{prototype, Prototype, ScriptFormat, StackType},
    Result,
};

/// Where a declarative rule takes an argument from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Popped from the operand stack
    Stack,
    /// The instruction's inline operand, as a literal
    Operand,
    /// The local variable the operand indexes
    Local,
}

/// Where a declarative rule stores a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Pushed onto the operand stack
    Stack,
    /// The local variable the operand indexes
    Local,
}

/// One argument of a [`Signature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arg {
    /// Declared type and role
    pub prototype: Prototype,
    /// Where the value comes from
    pub source: Source,
}

/// One result of a [`Signature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Def {
    /// Declared type and role
    pub prototype: Prototype,
    /// Where the value goes
    pub destination: Destination,
}

/// The static shape of a declarative rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// The opcode the rule translates
    pub opcode: u16,
    /// Arguments in push order
    pub args: &'static [Arg],
    /// Results in push order
    pub defs: &'static [Def],
    /// A non-zero operand selects component-relative addressing
    pub dot: bool,
}

impl Signature {
    /// Returns `true` if the rule reads its operand.
    #[must_use]
    pub fn uses_operand(&self) -> bool {
        self.dot
            || self.args.iter().any(|a| a.source != Source::Stack)
            || self.defs.iter().any(|d| d.destination != Destination::Stack)
    }

    /// Returns the stack types popped by the rule, in push order.
    #[must_use]
    pub fn stack_arguments(&self) -> Vec<StackType> {
        self.args
            .iter()
            .filter(|a| a.source == Source::Stack)
            .map(|a| a.prototype.stack_type())
            .collect()
    }
}

/// Storage location family addressed by an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Player variable
    Varp,
    /// Bit range of a player variable
    Varbit,
    /// Integer local
    IntLocal,
    /// String local
    StringLocal,
    /// Client integer variable
    VarcInt,
    /// Client string variable
    VarcString,
}

impl Storage {
    /// Returns the stack the stored values live on.
    #[must_use]
    pub const fn stack_type(self) -> StackType {
        match self {
            Storage::StringLocal | Storage::VarcString => StackType::String,
            _ => StackType::Int,
        }
    }

    /// Returns the variable `operand` names in `script`.
    pub(crate) fn variable(self, script: i32, operand: i32) -> Option<Variable> {
        Some(match self {
            Storage::Varp => Variable::Varp(operand),
            Storage::Varbit => Variable::Varbit(operand),
            Storage::VarcInt => Variable::VarcInt(operand),
            Storage::VarcString => Variable::VarcString(operand),
            Storage::IntLocal | Storage::StringLocal => Variable::Local {
                script,
                index: u32::try_from(operand).ok()?,
                stack_type: self.stack_type(),
            },
        })
    }
}

/// Data movement between the stack and a constant or a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Push the operand as a literal
    Constant(StackType),
    /// Push the value of a variable
    Load(Storage),
    /// Pop into a variable
    Store(Storage),
}

/// How the transmit list of a hook is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transmit {
    /// The hook takes no transmit list
    None,
    /// Plain integers
    Untyped,
    /// Stats
    Stat,
    /// Inventories
    Inv,
    /// Player variables, by id constant
    Varp,
    /// Client integer variables, by id constant
    VarcInt,
    /// Client string variables, by id constant
    VarcString,
}

/// A translation rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Multi-way jump through a switch table
    Switch,
    /// Unconditional jump
    Goto,
    /// Conditional jump comparing two integers
    BranchCompare,
    /// Return the whole stack
    Return,
    /// Procedure call, callee in the operand
    Proc,
    /// Legacy script invocation, callee in the operand
    Invoke,
    /// Enum lookup with dynamic key and output types
    Enum,
    /// Enum key membership test
    EnumHasOutput,
    /// Local array declaration
    DefineArray,
    /// Array element load
    PushArrayInt,
    /// Array element store
    PopArrayInt,
    /// Pop and drop one value
    Discard(StackType),
    /// Constant and variable access
    Assign(Access),
    /// Concatenate `operand` strings
    JoinString,
    /// Declarative rule
    Basic(&'static Signature),
    /// UI event hook registration
    Hook(Transmit),
    /// Typed param lookup on a receiver of the given prototype
    Param(Prototype),
    /// Database field lookup
    DbGetField,
}

impl Command {
    /// Translates the instruction at the frame's program counter.
    pub(crate) fn translate(
        self,
        interpreter: &mut Interpreter<'_>,
        frame: &mut Frame,
    ) -> Result<Instruction> {
        match self {
            Command::Switch => flow::switch(frame),
            Command::Goto => flow::goto(frame),
            Command::BranchCompare => flow::branch_compare(interpreter, frame),
            Command::Return => flow::ret(interpreter, frame),
            Command::Proc => call::proc(interpreter, frame),
            Command::Invoke => call::invoke(interpreter, frame),
            Command::Enum => lookup::enumerated(interpreter, frame, true),
            Command::EnumHasOutput => lookup::enumerated(interpreter, frame, false),
            Command::DefineArray => lookup::define_array(interpreter, frame),
            Command::PushArrayInt => lookup::push_array(interpreter, frame),
            Command::PopArrayInt => lookup::pop_array(interpreter, frame),
            Command::Discard(stack_type) => assign::discard(frame, stack_type),
            Command::Assign(access) => assign::access(interpreter, frame, access),
            Command::JoinString => assign::join_string(interpreter, frame),
            Command::Basic(signature) => basic::translate(interpreter, frame, signature),
            Command::Hook(transmit) => hooks::translate(interpreter, frame, transmit),
            Command::Param(receiver) => lookup::param(interpreter, frame, receiver),
            Command::DbGetField => lookup::db_get_field(interpreter, frame),
        }
    }
}

/// Immutable opcode to rule map for one bytecode revision.
#[derive(Debug, Clone)]
pub struct CommandTable {
    format: ScriptFormat,
    commands: FxHashMap<u16, Command>,
}

impl CommandTable {
    /// Builds the table of a revision.
    #[must_use]
    pub fn new(format: ScriptFormat) -> Self {
        use opcodes::*;

        let mut commands = FxHashMap::default();
        commands.insert(SWITCH, Command::Switch);
        commands.insert(BRANCH, Command::Goto);
        for opcode in [
            BRANCH_NOT,
            BRANCH_EQUALS,
            BRANCH_LESS_THAN,
            BRANCH_GREATER_THAN,
            BRANCH_LESS_THAN_OR_EQUALS,
            BRANCH_GREATER_THAN_OR_EQUALS,
        ] {
            commands.insert(opcode, Command::BranchCompare);
        }
        commands.insert(RETURN, Command::Return);
        commands.insert(ENUM, Command::Enum);
        commands.insert(JOIN_STRING, Command::JoinString);
        commands.insert(PUSH_CONSTANT_INT, Command::Assign(Access::Constant(StackType::Int)));
        commands.insert(
            PUSH_CONSTANT_STRING,
            Command::Assign(Access::Constant(StackType::String)),
        );
        commands.insert(NC_PARAM, Command::Param(prototype::NPC));
        commands.insert(LC_PARAM, Command::Param(prototype::LOC));
        commands.insert(OC_PARAM, Command::Param(prototype::OBJ));
        commands.insert(STRUCT_PARAM, Command::Param(prototype::STRUCT));

        for signature in basic::COMMON {
            commands.insert(signature.opcode, Command::Basic(signature));
        }

        match format {
            ScriptFormat::Current => {
                commands.insert(GOSUB_WITH_PARAMS, Command::Proc);
                commands.insert(ENUM_HASOUTPUT, Command::EnumHasOutput);
                commands.insert(DEFINE_ARRAY, Command::DefineArray);
                commands.insert(PUSH_ARRAY_INT, Command::PushArrayInt);
                commands.insert(POP_ARRAY_INT, Command::PopArrayInt);
                commands.insert(POP_INT_DISCARD, Command::Discard(StackType::Int));
                commands.insert(POP_STRING_DISCARD, Command::Discard(StackType::String));
                commands.insert(DB_GETFIELD, Command::DbGetField);
                commands.insert(MEC_PARAM, Command::Param(prototype::MAPELEMENT));
                for (opcode, storage) in [
                    (GET_VAR, Storage::Varp),
                    (GET_VARBIT, Storage::Varbit),
                    (PUSH_INT_LOCAL, Storage::IntLocal),
                    (PUSH_STRING_LOCAL, Storage::StringLocal),
                    (GET_VARC_INT, Storage::VarcInt),
                    (GET_VARC_STRING, Storage::VarcString),
                ] {
                    commands.insert(opcode, Command::Assign(Access::Load(storage)));
                }
                for (opcode, storage) in [
                    (SET_VAR, Storage::Varp),
                    (SET_VARBIT, Storage::Varbit),
                    (POP_INT_LOCAL, Storage::IntLocal),
                    (POP_STRING_LOCAL, Storage::StringLocal),
                    (SET_VARC_INT, Storage::VarcInt),
                    (SET_VARC_STRING, Storage::VarcString),
                ] {
                    commands.insert(opcode, Command::Assign(Access::Store(storage)));
                }
                for signature in basic::CURRENT {
                    commands.insert(signature.opcode, Command::Basic(signature));
                }
                for opcode in hooks::setters(CC_SETONVARCSTRTRANSMIT) {
                    commands.insert(opcode, Command::Hook(hooks::transmit(opcode)));
                }
            }
            ScriptFormat::Legacy => {
                commands.insert(GOSUB_WITH_PARAMS, Command::Invoke);
                for signature in basic::LEGACY {
                    commands.insert(signature.opcode, Command::Basic(signature));
                }
                for opcode in hooks::setters(CC_SETONRESIZE) {
                    commands.insert(opcode, Command::Hook(Transmit::Untyped));
                }
            }
        }

        CommandTable { format, commands }
    }

    /// Returns the revision the table translates.
    #[must_use]
    pub fn format(&self) -> ScriptFormat {
        self.format
    }

    /// Returns the rule of an opcode.
    #[must_use]
    pub fn lookup(&self, opcode: u16) -> Option<&Command> {
        self.commands.get(&opcode)
    }

    /// Returns `true` if the opcode has a rule.
    #[must_use]
    pub fn contains(&self, opcode: u16) -> bool {
        self.commands.contains_key(&opcode)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
