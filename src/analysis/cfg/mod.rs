//! Control Flow Graph (CFG) construction and analysis.
//!
//! A [`ControlFlowGraph`] splits a [`crate::ir::Function`]'s instruction chain
//! into basic blocks and connects them with typed edges.
//!
//! # Architecture
//!
//! The CFG builds upon the generic [`crate::utils::graph::DirectedGraph`]
//! infrastructure. Dominators and post-dominators come from the shared
//! Cooper-Harvey-Kennedy implementation in [`crate::utils::graph::algorithms`].
//!
//! # Key Components
//!
//! - [`ControlFlowGraph`] - The block graph with cached dominance information
//! - [`BasicBlock`] - A straight-line run of instructions
//! - [`BlockExit`] - How control leaves a block
//! - [`CfgEdgeKind`] - Classification of edges
//!
//! # Block Boundaries
//!
//! A new block starts at a label (consecutive labels share one block) and after
//! every terminal instruction: branch, goto, switch and return.
//!
//! # Edge Order
//!
//! - branch: taken, then fallthrough
//! - goto: target
//! - switch: cases in table order, then the default fallthrough
//! - anything else: fallthrough into the next block
//!
//! # Lazy Computation
//!
//! Dominator and post-dominator trees are computed on first access and cached
//! using [`std::sync::OnceLock`].

mod block;
mod edge;
mod graph;

pub use block::{BasicBlock, BlockExit};
pub use edge::CfgEdgeKind;
pub use graph::ControlFlowGraph;
