//! # cs2scope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cs2scope library. Import this module to get quick access to the essential
//! types for script decompilation.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cs2scope operations
pub use crate::Error;

/// The result type used throughout cs2scope
pub use crate::Result;

// ================================================================================================
// Script Input
// ================================================================================================

/// Decoded scripts and their operand values
pub use crate::script::{Script, ScriptFormat, Value};

/// Value types, stacks and named type uses
pub use crate::script::{prototype, Prototype, StackType, Type};

/// Loader interfaces and their in-memory implementations
pub use crate::script::{PrototypeLoader, PrototypeMap, ScriptLoader, ScriptMap};

// ================================================================================================
// Interpretation
// ================================================================================================

/// The abstract interpreter and its configuration
pub use crate::interpreter::{CommandTable, Interpreter, InterpreterConfig};

/// Typed IR
pub use crate::ir::{
    EventProperty, Expr, Function, FunctionSet, Instruction, InstructionChain, Label, TypingId,
    Typings, Variable,
};

// ================================================================================================
// Analysis
// ================================================================================================

/// Call graph and triggers
pub use crate::analysis::{CallGraph, Trigger};

/// Control flow graph and structured constructs
pub use crate::analysis::{reconstruct, Construct, ControlFlowGraph};
pub use crate::analysis::structure::Condition;
