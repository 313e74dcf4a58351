//! Control-flow reconstruction.
//!
//! Turns the flat, label-and-jump instruction chain of a [`crate::ir::Function`]
//! into a tree of [`Construct`]s: sequences, `if`/`else if`/`else` chains,
//! pre-tested `while` loops and switches.
//!
//! # Guarantees
//!
//! Flattening the tree with [`Construct::flatten`] yields every non-control
//! instruction of the function exactly once, in original order. Unreachable
//! blocks are the only exception; they are dropped with a warning.
//!
//! # Limitations
//!
//! `break`, `continue` and labelled jumps are not recovered. Loops must have a
//! single exit at the header; any other shape is reported as
//! [`crate::Error::StructuringFailure`].

mod construct;
mod reconstruct;

pub use construct::{Condition, Construct};
pub use reconstruct::reconstruct;
