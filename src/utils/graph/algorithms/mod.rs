//! Graph algorithms for program analysis.
//!
//! # Available Algorithms
//!
//! ## Traversal
//!
//! - [`postorder`] / [`reverse_postorder`] - Depth-first orders
//! - [`reachable`] - Reachability with blocked nodes
//! - [`natural_loop`] - Natural loop body of a header and its latches
//!
//! ## Dominator Analysis
//!
//! - [`compute_dominators`] - Cooper-Harvey-Kennedy iterative dominators
//! - [`DominatorTree`] - Result of dominator computation, itself a rooted graph
//!
//! ## Strongly Connected Components
//!
//! - [`strongly_connected_components`] - Tarjan's SCC algorithm
//!
//! # Algorithm Selection
//!
//! | Algorithm | Time Complexity | Use Case |
//! |-----------|-----------------|----------|
//! | Postorder | O(V + E) | Dominator numbering, block ordering |
//! | Dominators | O(V + E) per pass, few passes in practice | Control-flow structuring |
//! | SCC | O(V + E) | Recursion detection in the call graph |

mod dominators;
mod scc;
mod traversal;

pub use dominators::{compute_dominators, DominatorIterator, DominatorTree};
pub use scc::strongly_connected_components;
pub use traversal::{natural_loop, postorder, reachable, reverse_postorder};
