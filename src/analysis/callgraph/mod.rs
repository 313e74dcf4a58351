//! Inter-script call graph.
//!
//! Every procedure call, legacy invoke and event hook the interpreter meets is
//! recorded as a [`CallEdge`] tagged with its [`Trigger`]. The graph lets the
//! code generator name call targets, and answers recursion queries through
//! strongly connected components.
//!
//! # Key Types
//!
//! - [`CallGraph`] - The graph of scripts and trigger-tagged edges
//! - [`CallEdge`] - One (caller, callee, trigger) relation
//! - [`CallGraphStats`] - Aggregate metrics
//! - [`Trigger`] - Invocation mechanism catalogue

mod graph;
mod trigger;

pub use graph::{CallEdge, CallGraph, CallGraphStats};
pub use trigger::Trigger;
