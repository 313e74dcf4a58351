//! Graph abstraction traits.
//!
//! The algorithms in [`crate::utils::graph::algorithms`] are written against these
//! traits rather than a concrete graph type. [`DirectedGraph`](crate::utils::graph::DirectedGraph)
//! implements all of them, and so does the
//! [`DominatorTree`](crate::utils::graph::algorithms::DominatorTree) produced by
//! dominator computation, which lets a dominator tree be traversed like any other graph.

use crate::utils::graph::NodeId;

/// Node enumeration shared by every graph view.
///
/// Node ids are dense: every id in `0..node_count()` is valid.
pub trait GraphBase {
    /// Returns the number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Returns an iterator over all node ids, in index order.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;
}

/// Forward adjacency.
pub trait Successors: GraphBase {
    /// Returns the direct successors of `node`, in edge insertion order.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Backward adjacency.
pub trait Predecessors: GraphBase {
    /// Returns the direct predecessors of `node`, in edge insertion order.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// A graph with a distinguished head node.
pub trait RootedGraph: Successors + Predecessors {
    /// Returns the head node every analysis starts from.
    fn entry(&self) -> NodeId;
}
