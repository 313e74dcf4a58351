//! Typed intermediate representation.
//!
//! The abstract interpreter lowers each script into a [`Function`]: an
//! [`InstructionChain`] of [`Instruction`]s over [`Expr`] trees. Every value an
//! expression produces carries a [`TypingId`] into the shared [`Typings`] store.
//!
//! # Key Types
//!
//! - [`Function`] / [`FunctionSet`] - Per-script IR and the result of a whole run
//! - [`Instruction`] / [`Label`] - Assignments, jumps, returns and jump anchors
//! - [`Expr`] - Variables, constants, operations, calls and hooks
//! - [`Variable`] - Stack slots, locals, globals and arrays
//! - [`Typings`] - Union-find type unification
//! - [`InstructionChain`] - Doubly-linked instruction list with stable ids

mod chain;
mod expr;
mod function;
mod instruction;
mod typings;
mod variable;

pub use chain::{ChainIter, InsnId, InstructionChain};
pub use expr::{EventProperty, Expr};
pub use function::{Function, FunctionSet};
pub use instruction::{Instruction, Label};
pub use typings::{TypingId, Typings};
pub use variable::Variable;
