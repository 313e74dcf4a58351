//! Generic directed graph infrastructure.
//!
//! The call graph and the block-level control-flow graph are both built on
//! [`DirectedGraph`]. Algorithms are written against the traits in this module
//! ([`GraphBase`], [`Successors`], [`Predecessors`], [`RootedGraph`]) so they also
//! run on derived views such as the
//! [`DominatorTree`](algorithms::DominatorTree).
//!
//! # Usage Examples
//!
//! ```rust
//! use cs2scope::utils::graph::{algorithms, DirectedGraph};
//!
//! // A -> B, A -> C, B -> D, C -> D
//! let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
//! let a = graph.add_node("A");
//! let b = graph.add_node("B");
//! let c = graph.add_node("C");
//! let d = graph.add_node("D");
//! graph.add_edge(a, b, ())?;
//! graph.add_edge(a, c, ())?;
//! graph.add_edge(b, d, ())?;
//! graph.add_edge(c, d, ())?;
//!
//! let tree = algorithms::compute_dominators(&graph, a);
//! assert_eq!(tree.immediate_dominator(d), Some(a));
//! # Ok::<(), cs2scope::Error>(())
//! ```

mod directed;
mod ids;
mod traits;

pub mod algorithms;

pub use directed::DirectedGraph;
pub use ids::{EdgeId, NodeId};
pub use traits::{GraphBase, Predecessors, RootedGraph, Successors};
