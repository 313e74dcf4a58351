//! Depth-first traversal orders.
//!
//! All traversals are iterative, so deeply nested bytecode cannot overflow the
//! native stack. Nodes unreachable from the start node are never visited.

use crate::utils::graph::{NodeId, Predecessors, Successors};

/// Returns the nodes reachable from `start` in depth-first postorder.
///
/// Successors are explored in edge insertion order. An out-of-range `start`
/// yields an empty order.
#[allow(clippy::items_after_statements)]
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let node_count = graph.node_count();
    if start.index() >= node_count {
        return Vec::new();
    }

    #[derive(Clone, Copy)]
    enum Visit {
        Enter,
        Leave,
    }

    let mut seen = vec![false; node_count];
    let mut order = Vec::with_capacity(node_count);
    let mut work = vec![(start, Visit::Enter)];

    while let Some((node, visit)) = work.pop() {
        match visit {
            Visit::Enter => {
                if seen[node.index()] {
                    continue;
                }
                seen[node.index()] = true;
                work.push((node, Visit::Leave));

                // Reverse so the first successor is explored first.
                let successors: Vec<NodeId> = graph.successors(node).collect();
                for &succ in successors.iter().rev() {
                    if !seen[succ.index()] {
                        work.push((succ, Visit::Enter));
                    }
                }
            }
            Visit::Leave => order.push(node),
        }
    }

    order
}

/// Returns the nodes reachable from `start` in reverse postorder.
///
/// Every node appears before its successors, back edges excepted.
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut order = postorder(graph, start);
    order.reverse();
    order
}

/// Marks every node reachable from `start` without passing through a blocked node.
///
/// `start` itself is marked even when blocked; its successors are not followed
/// in that case.
pub fn reachable<G, F>(graph: &G, start: NodeId, blocked: F) -> Vec<bool>
where
    G: Successors,
    F: Fn(NodeId) -> bool,
{
    let mut marked = vec![false; graph.node_count()];
    if start.index() >= marked.len() {
        return marked;
    }

    marked[start.index()] = true;
    if blocked(start) {
        return marked;
    }

    let mut work = vec![start];
    while let Some(node) = work.pop() {
        for succ in graph.successors(node) {
            if !marked[succ.index()] {
                marked[succ.index()] = true;
                if !blocked(succ) {
                    work.push(succ);
                }
            }
        }
    }
    marked
}

/// Collects the natural loop of `header`: the header plus every node that reaches
/// one of `latches` without passing through the header.
pub fn natural_loop<G>(graph: &G, header: NodeId, latches: &[NodeId]) -> Vec<bool>
where
    G: Predecessors,
{
    let mut body = vec![false; graph.node_count()];
    if header.index() >= body.len() {
        return body;
    }
    body[header.index()] = true;

    let mut work: Vec<NodeId> = Vec::new();
    for &latch in latches {
        if !body[latch.index()] {
            body[latch.index()] = true;
            work.push(latch);
        }
    }
    while let Some(node) = work.pop() {
        for pred in graph.predecessors(node) {
            if !body[pred.index()] {
                body[pred.index()] = true;
                work.push(pred);
            }
        }
    }
    body
}
