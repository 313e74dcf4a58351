//! Dominator tree computation using the Cooper-Harvey-Kennedy algorithm.
//!
//! A node `d` **dominates** a node `n` if every path from the entry node to `n`
//! passes through `d`. The **immediate dominator** of `n` is the closest strict
//! dominator of `n`; making every node a child of its immediate dominator yields
//! the dominator tree, rooted at the entry node.
//!
//! # Algorithm
//!
//! "A Simple, Fast Dominance Algorithm" (Cooper, Harvey, Kennedy, 2001) is an
//! iterative fixpoint over the reverse postorder:
//!
//! 1. Number all nodes reachable from the entry in postorder.
//! 2. `idom(entry) = entry`.
//! 3. For every other node in reverse postorder, intersect the dominator chains of
//!    all predecessors that already have an immediate dominator. The intersection
//!    walks both chains upward, always advancing the finger with the smaller
//!    postorder number, until the fingers meet.
//! 4. Repeat until a full pass changes nothing.
//!
//! Predecessors that are unreachable from the entry, or whose immediate dominator
//! has not been computed yet, do not constrain the intersection.
//!
//! The result, [`DominatorTree`], is itself a rooted graph: each node's only
//! predecessor is its immediate dominator and its successors are the nodes it
//! immediately dominates.

use crate::utils::graph::{
    algorithms::traversal::postorder, GraphBase, NodeId, Predecessors, RootedGraph, Successors,
};

/// Result of dominator computation.
///
/// Nodes that are unreachable from the entry have no immediate dominator, are
/// dominated by nothing and dominate nothing.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    entry: NodeId,
    idom: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
}

impl DominatorTree {
    /// Returns the entry node (root of the tree).
    #[inline]
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns the immediate dominator of `node`.
    ///
    /// `None` for the entry node and for unreachable nodes.
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        if node == self.entry {
            return None;
        }
        self.idom.get(node.index()).copied().flatten()
    }

    /// Returns `true` if `node` is reachable from the entry node.
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        node == self.entry || self.immediate_dominator(node).is_some()
    }

    /// Returns `true` if `a` dominates `b`. Every reachable node dominates itself.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        if !self.is_reachable(b) || !self.is_reachable(a) {
            return false;
        }
        self.dominators(b).any(|d| d == a)
    }

    /// Returns `true` if `a` dominates `b` and `a != b`.
    #[inline]
    #[must_use]
    pub fn strictly_dominates(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Iterates the dominators of `node` from `node` itself up to the entry.
    ///
    /// Yields only `node` when it is unreachable.
    pub fn dominators(&self, node: NodeId) -> DominatorIterator<'_> {
        DominatorIterator {
            tree: self,
            current: Some(node),
        }
    }

    /// Returns the depth of `node` in the tree (the entry has depth 0).
    #[must_use]
    pub fn depth(&self, node: NodeId) -> usize {
        self.dominators(node).count().saturating_sub(1)
    }

    /// Returns the nodes immediately dominated by `node`, in increasing id order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(node.index()).map_or(&[], Vec::as_slice)
    }

    /// Returns the number of nodes of the analysed graph.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.idom.len()
    }
}

/// Iterator over the dominator chain of a node, see [`DominatorTree::dominators`].
pub struct DominatorIterator<'a> {
    tree: &'a DominatorTree,
    current: Option<NodeId>,
}

impl Iterator for DominatorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.immediate_dominator(current);
        Some(current)
    }
}

impl GraphBase for DominatorTree {
    fn node_count(&self) -> usize {
        self.idom.len()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.idom.len()).map(NodeId::new)
    }
}

impl Successors for DominatorTree {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.children(node).iter().copied()
    }
}

impl Predecessors for DominatorTree {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.immediate_dominator(node).into_iter()
    }
}

impl RootedGraph for DominatorTree {
    fn entry(&self) -> NodeId {
        self.entry
    }
}

/// Computes the dominator tree of `graph` rooted at `entry`.
///
/// An `entry` outside the graph yields a tree in which every node is unreachable.
pub fn compute_dominators<G>(graph: &G, entry: NodeId) -> DominatorTree
where
    G: Successors + Predecessors,
{
    let node_count = graph.node_count();
    let mut idom: Vec<Option<NodeId>> = vec![None; node_count];

    if entry.index() >= node_count {
        return DominatorTree {
            entry,
            idom,
            children: vec![Vec::new(); node_count],
        };
    }

    let order = postorder(graph, entry);
    let mut post_number: Vec<Option<usize>> = vec![None; node_count];
    for (number, node) in order.iter().enumerate() {
        post_number[node.index()] = Some(number);
    }

    idom[entry.index()] = Some(entry);

    let mut changed = true;
    while changed {
        changed = false;
        for &node in order.iter().rev() {
            if node == entry {
                continue;
            }

            let mut new_idom: Option<NodeId> = None;
            for pred in graph.predecessors(node) {
                if post_number[pred.index()].is_none() || idom[pred.index()].is_none() {
                    continue;
                }
                new_idom = Some(match new_idom {
                    None => pred,
                    Some(current) => intersect(&idom, &post_number, pred, current),
                });
            }

            if new_idom.is_some() && idom[node.index()] != new_idom {
                idom[node.index()] = new_idom;
                changed = true;
            }
        }
    }

    let mut children = vec![Vec::new(); node_count];
    for (index, parent) in idom.iter().enumerate() {
        if let Some(parent) = parent {
            if index != entry.index() {
                children[parent.index()].push(NodeId::new(index));
            }
        }
    }

    DominatorTree {
        entry,
        idom,
        children,
    }
}

/// Walks two dominator chains upward until they meet.
fn intersect(
    idom: &[Option<NodeId>],
    post_number: &[Option<usize>],
    mut finger1: NodeId,
    mut finger2: NodeId,
) -> NodeId {
    let post = |node: NodeId| post_number[node.index()].unwrap_or(0);

    while finger1 != finger2 {
        while post(finger1) < post(finger2) {
            match idom[finger1.index()] {
                Some(up) if up != finger1 => finger1 = up,
                _ => return finger2,
            }
        }
        while post(finger2) < post(finger1) {
            match idom[finger2.index()] {
                Some(up) if up != finger2 => finger2 = up,
                _ => return finger1,
            }
        }
    }
    finger1
}

#[cfg(test)]
mod tests {
    use crate::utils::graph::{
        algorithms::dominators::compute_dominators, DirectedGraph, NodeId, Predecessors,
        RootedGraph, Successors,
    };

    fn graph_of(count: usize, edges: &[(usize, usize)]) -> DirectedGraph<usize, ()> {
        let mut graph = DirectedGraph::new();
        for i in 0..count {
            graph.add_node(i);
        }
        for &(from, to) in edges {
            graph
                .add_edge(NodeId::new(from), NodeId::new(to), ())
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_dominator_single_node() {
        let graph = graph_of(1, &[]);
        let tree = compute_dominators(&graph, NodeId::new(0));

        assert_eq!(tree.entry(), NodeId::new(0));
        assert_eq!(tree.immediate_dominator(NodeId::new(0)), None);
        assert!(tree.dominates(NodeId::new(0), NodeId::new(0)));
        assert_eq!(tree.depth(NodeId::new(0)), 0);
    }

    #[test]
    fn test_dominator_empty_graph() {
        let graph = graph_of(0, &[]);
        let tree = compute_dominators(&graph, NodeId::new(0));
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_dominator_diamond() {
        // A -> B, A -> C, B -> D, C -> D
        let graph = graph_of(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let tree = compute_dominators(&graph, NodeId::new(0));

        let a = NodeId::new(0);
        assert_eq!(tree.immediate_dominator(NodeId::new(1)), Some(a));
        assert_eq!(tree.immediate_dominator(NodeId::new(2)), Some(a));
        assert_eq!(tree.immediate_dominator(NodeId::new(3)), Some(a));
        assert!(!tree.strictly_dominates(NodeId::new(1), NodeId::new(3)));
        assert!(!tree.strictly_dominates(NodeId::new(2), NodeId::new(3)));
    }

    #[test]
    fn test_dominator_loop() {
        // A -> B, B -> C, C -> B, C -> D
        let graph = graph_of(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]);
        let tree = compute_dominators(&graph, NodeId::new(0));

        assert_eq!(tree.immediate_dominator(NodeId::new(1)), Some(NodeId::new(0)));
        assert_eq!(tree.immediate_dominator(NodeId::new(2)), Some(NodeId::new(1)));
        assert_eq!(tree.immediate_dominator(NodeId::new(3)), Some(NodeId::new(2)));
        assert_eq!(tree.depth(NodeId::new(3)), 3);
        assert!(tree.dominates(NodeId::new(1), NodeId::new(3)));
    }

    #[test]
    fn test_unreachable_predecessor_is_skipped() {
        // entry -> a -> b, dead -> b
        let graph = graph_of(4, &[(0, 1), (1, 2), (3, 2)]);
        let tree = compute_dominators(&graph, NodeId::new(0));

        assert_eq!(tree.immediate_dominator(NodeId::new(2)), Some(NodeId::new(1)));
        assert_eq!(tree.immediate_dominator(NodeId::new(3)), None);
        assert!(!tree.is_reachable(NodeId::new(3)));
        assert!(!tree.dominates(NodeId::new(3), NodeId::new(2)));
        assert!(!tree.dominates(NodeId::new(0), NodeId::new(3)));
    }

    #[test]
    fn test_multiple_entries_into_loop() {
        // entry -> a, entry -> b, a -> b, b -> a (irreducible), a -> exit
        let graph = graph_of(4, &[(0, 1), (0, 2), (1, 2), (2, 1), (1, 3)]);
        let tree = compute_dominators(&graph, NodeId::new(0));

        let entry = NodeId::new(0);
        assert_eq!(tree.immediate_dominator(NodeId::new(1)), Some(entry));
        assert_eq!(tree.immediate_dominator(NodeId::new(2)), Some(entry));
        assert_eq!(tree.immediate_dominator(NodeId::new(3)), Some(NodeId::new(1)));
    }

    #[test]
    fn test_tree_as_graph() {
        let graph = graph_of(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let tree = compute_dominators(&graph, NodeId::new(0));

        assert_eq!(RootedGraph::entry(&tree), NodeId::new(0));
        let children: Vec<NodeId> = tree.successors(NodeId::new(0)).collect();
        assert_eq!(children, vec![NodeId::new(1), NodeId::new(2), NodeId::new(3)]);
        let parent: Vec<NodeId> = tree.predecessors(NodeId::new(3)).collect();
        assert_eq!(parent, vec![NodeId::new(0)]);
        assert_eq!(tree.predecessors(NodeId::new(0)).count(), 0);
    }

    #[test]
    fn test_dominator_chain() {
        let graph = graph_of(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]);
        let tree = compute_dominators(&graph, NodeId::new(0));

        let chain: Vec<NodeId> = tree.dominators(NodeId::new(3)).collect();
        assert_eq!(
            chain,
            vec![NodeId::new(3), NodeId::new(2), NodeId::new(1), NodeId::new(0)]
        );
    }
}
