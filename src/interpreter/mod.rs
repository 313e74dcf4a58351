//! Abstract interpretation of script bytecode into typed IR.
//!
//! The [`Interpreter`] walks each script's opcodes once, in order, keeping an
//! abstract operand stack of typed slot references instead of values. Every
//! opcode is translated by its [`CommandTable`] rule into one [`Instruction`];
//! after the scan, a [`Label`] is inserted in front of every jump target.
//!
//! # Cross-script state
//!
//! One interpreter owns the [`Typings`] store and the [`CallGraph`] of a whole
//! run. Calls interpret their callee on demand; every script is interpreted at
//! most once and its result, success or failure, is memoised by id.
//!
//! # Failure
//!
//! A failure aborts the one script in progress. Callers of a failed script fail
//! with [`crate::Error::CalleeFailed`]; unrelated scripts are unaffected.
//!
//! # Example
//!
//! ```rust
//! use cs2scope::interpreter::{opcodes, Interpreter, InterpreterConfig};
//! use cs2scope::script::{PrototypeMap, Script, ScriptMap, StackType, Value};
//!
//! let mut scripts = ScriptMap::new();
//! scripts.insert(
//!     1,
//!     Script::new(
//!         vec![opcodes::PUSH_CONSTANT_INT, opcodes::RETURN],
//!         vec![Value::Int(5), Value::Int(0)],
//!         0,
//!         0,
//!         vec![StackType::Int],
//!     ),
//! );
//! let prototypes = PrototypeMap::new();
//!
//! let mut interpreter = Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
//! let function = interpreter.interpret(1)?;
//! assert_eq!(function.instructions.to_string(), "stack0 = 5;\nreturn(stack0);\n");
//! # Ok::<(), cs2scope::Error>(())
//! ```
//!
//! [`Label`]: crate::ir::Label

mod commands;
mod config;
mod frame;

use std::{collections::BTreeSet, sync::Arc};

use tracing::{debug, trace, warn};
use rustc_hash::FxHashMap;

use crate::{
    analysis::callgraph::CallGraph,
    interpreter::frame::Frame,
    ir::{Function, FunctionSet, Instruction, InstructionChain, Label, Typings, Variable},
    script::{PrototypeLoader, ScriptLoader, StackType},
    Error, Result,
};

pub use commands::{
    opcodes, Access, Arg, Command, CommandTable, Def, Destination, Signature, Source, Storage,
    Transmit,
};
pub use config::InterpreterConfig;

/// The abstract interpreter of one run over a script corpus.
pub struct Interpreter<'a> {
    scripts: &'a dyn ScriptLoader,
    prototypes: &'a dyn PrototypeLoader,
    config: InterpreterConfig,
    table: CommandTable,
    typings: Typings,
    call_graph: CallGraph,
    memo: FxHashMap<i32, Result<Arc<Function>>>,
    /// Scripts whose interpretation is in progress, innermost last.
    active: Vec<i32>,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter over a script corpus.
    #[must_use]
    pub fn new(
        scripts: &'a dyn ScriptLoader,
        prototypes: &'a dyn PrototypeLoader,
        config: InterpreterConfig,
    ) -> Self {
        Interpreter {
            scripts,
            prototypes,
            table: CommandTable::new(config.format),
            config,
            typings: Typings::new(),
            call_graph: CallGraph::new(),
            memo: FxHashMap::default(),
            active: Vec::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Returns the command table in use.
    #[must_use]
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Returns the type unification store.
    #[must_use]
    pub fn typings(&self) -> &Typings {
        &self.typings
    }

    /// Returns the call graph discovered so far.
    #[must_use]
    pub fn call_graph(&self) -> &CallGraph {
        &self.call_graph
    }

    /// Interprets a script, or returns its memoised result.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the script, see the [module docs](self).
    /// [`Error::RecursionLimit`] is returned when on-demand callee
    /// interpretation nests deeper than
    /// [`InterpreterConfig::max_call_depth`]; neither it nor the caller failures
    /// it causes are memoised.
    pub fn interpret(&mut self, id: i32) -> Result<Arc<Function>> {
        if let Some(result) = self.memo.get(&id) {
            return result.clone();
        }
        if self.active.len() >= self.config.max_call_depth {
            return Err(Error::RecursionLimit(self.config.max_call_depth));
        }
        let script = self
            .scripts
            .script(id)
            .ok_or_else(|| malformed_error!("Unknown script {}", id))?;

        self.call_graph.add_script(id);
        self.active.push(id);
        let result = self.run(Frame::new(id, script)).map(Arc::new);
        self.active.pop();

        if let Err(error) = &result {
            if exceeds_depth(error) {
                return result;
            }
            debug!("script {id} failed: {error}");
        }
        self.memo.insert(id, result.clone());
        result
    }

    /// Interprets every script the loader knows, in ascending id order.
    ///
    /// Failures are logged and kept; they do not stop the run.
    pub fn interpret_all(&mut self) {
        for id in self.scripts.script_ids() {
            if let Err(error) = self.interpret(id) {
                warn!("script {id}: {error}");
            }
        }
    }

    /// Ends the run, handing over every result and the shared stores.
    #[must_use]
    pub fn finish(self) -> FunctionSet {
        let mut set = FunctionSet {
            typings: self.typings,
            call_graph: self.call_graph,
            ..FunctionSet::default()
        };
        for (id, result) in self.memo {
            match result {
                Ok(function) => {
                    set.functions.insert(id, function);
                }
                Err(error) => {
                    set.failures.insert(id, error);
                }
            }
        }
        set
    }

    fn run(&mut self, mut frame: Frame) -> Result<Function> {
        let id = frame.id;
        let script = frame.script.clone();
        let mut chain = InstructionChain::with_capacity(script.len() * 2);
        let mut ids = Vec::with_capacity(script.len());
        let mut targets = BTreeSet::new();

        for pc in 0..script.len() {
            frame.pc = pc;
            let opcode = frame.opcode()?;
            let command = *self
                .table
                .lookup(opcode)
                .ok_or(Error::UnknownOpcode {
                    script: id,
                    pc,
                    opcode,
                })?;
            trace!("script {id} pc {pc}: opcode {opcode} as {command:?}");

            let insn = command.translate(self, &mut frame)?;
            if insn.is_terminal() && !frame.is_empty() {
                return Err(frame.imbalance(format!(
                    "{} values left on the stack after {insn}",
                    frame.depth()
                )));
            }
            targets.extend(insn.targets());
            ids.push(chain.push_back(insn));
        }

        if !frame.is_empty() {
            return Err(frame.imbalance("script ends with values on the stack"));
        }

        for &Label(pc) in &targets {
            let at = ids
                .get(pc)
                .copied()
                .ok_or_else(|| malformed_error!("Script {} jumps past its end to {}", id, pc))?;
            chain.insert_before(at, Instruction::Label(Label(pc)))?;
        }

        let mut counts = [0u32; 2];
        let arguments = script
            .argument_types()
            .into_iter()
            .map(|stack_type| {
                let counter = &mut counts[usize::from(stack_type == StackType::String)];
                let index = *counter;
                *counter += 1;
                Variable::Local {
                    script: id,
                    index,
                    stack_type,
                }
            })
            .collect();
        self.typings.args(id, &script.argument_types());

        debug!(
            "script {id}: {} instructions, {} labels",
            script.len(),
            targets.len()
        );
        Ok(Function {
            id,
            arguments,
            instructions: chain,
            return_types: script.return_types.clone(),
        })
    }
}

/// Returns `true` if the error stems from the call depth limit.
fn exceeds_depth(error: &Error) -> bool {
    match error {
        Error::RecursionLimit(_) => true,
        Error::CalleeFailed { source, .. } => exceeds_depth(source),
        _ => false,
    }
}
