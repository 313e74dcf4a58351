use std::{collections::BTreeMap, sync::Arc};

use rayon::prelude::*;

use crate::{
    analysis::{
        callgraph::CallGraph,
        structure::{self, Construct},
    },
    ir::{Instruction, InstructionChain, Label, TypingId, Typings, Variable},
    script::{StackType, Type},
    Error, Result,
};

/// The typed IR of one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Script id
    pub id: i32,
    /// Argument locals: integers first, then strings
    pub arguments: Vec<Variable>,
    /// Instructions in program order, labels included
    pub instructions: InstructionChain,
    /// Declared return stack types
    pub return_types: Vec<StackType>,
}

impl Function {
    /// Returns the labels present in the instruction chain, in order.
    #[must_use]
    pub fn labels(&self) -> Vec<Label> {
        self.instructions
            .instructions()
            .filter_map(|insn| match insn {
                Instruction::Label(label) => Some(*label),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of instructions that are not labels.
    #[must_use]
    pub fn opcode_count(&self) -> usize {
        self.instructions.len() - self.labels().len()
    }
}

/// The output of one interpretation run.
///
/// Holds every successfully interpreted function, the failures keyed by script,
/// and the shared stores the code generator resolves types and call targets with.
#[derive(Debug, Clone, Default)]
pub struct FunctionSet {
    /// Interpreted functions by script id
    pub functions: BTreeMap<i32, Arc<Function>>,
    /// Scripts that could not be interpreted
    pub failures: BTreeMap<i32, Error>,
    /// The type unification store
    pub typings: Typings,
    /// Caller to callee edges discovered during interpretation
    pub call_graph: CallGraph,
}

impl FunctionSet {
    /// Returns the function of a script.
    #[must_use]
    pub fn get(&self, id: i32) -> Option<&Arc<Function>> {
        self.functions.get(&id)
    }

    /// Returns the number of interpreted functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if no function was interpreted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Resolves the printed type of a typing.
    #[must_use]
    pub fn resolve_type(&self, typing: TypingId) -> Type {
        self.typings.resolve(typing)
    }

    /// Resolves the argument types of a script.
    #[must_use]
    pub fn argument_types(&self, id: i32) -> Option<Vec<Type>> {
        let function = self.functions.get(&id)?;
        Some(
            function
                .arguments
                .iter()
                .map(|&variable| match self.typings.variable(variable) {
                    Some(typing) => self.typings.resolve(typing),
                    None => variable.stack_type().default_type(),
                })
                .collect(),
        )
    }

    /// Structures the control flow of one function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StructuringFailure`] for an id without a function and for
    /// control flow that cannot be structured.
    pub fn reconstruct(&self, id: i32) -> Result<Construct> {
        let function = self.functions.get(&id).ok_or_else(|| Error::StructuringFailure {
            script: id,
            message: "no interpreted function".to_string(),
        })?;
        structure::reconstruct(function)
    }

    /// Structures every function in parallel.
    #[must_use]
    pub fn reconstruct_all(&self) -> BTreeMap<i32, Result<Construct>> {
        self.functions
            .par_iter()
            .map(|(&id, function)| (id, structure::reconstruct(function)))
            .collect()
    }
}
