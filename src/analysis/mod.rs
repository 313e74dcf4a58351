//! Program analysis over the interpreted IR.
//!
//! This module builds upon the generic graph infrastructure in
//! [`crate::utils::graph`] to provide the analyses the code generator needs.
//!
//! # Architecture
//!
//! - [`callgraph`] - Caller to callee relations discovered during interpretation
//! - [`cfg`] - Basic blocks and dominance of one function
//! - [`structure`] - Reconstruction of structured control flow
//!
//! # Usage
//!
//! ```rust,ignore
//! use cs2scope::analysis::{cfg::ControlFlowGraph, structure};
//!
//! let cfg = ControlFlowGraph::build(&function)?;
//! println!("{}", cfg.to_dot(Some("script 10")));
//!
//! let tree = structure::reconstruct(&function)?;
//! ```

pub mod callgraph;
pub mod cfg;
pub mod structure;

pub use callgraph::{CallGraph, Trigger};
pub use cfg::ControlFlowGraph;
pub use structure::{reconstruct, Construct};
