//! Call graph data structure.
//!
//! [`CallGraph`] wraps a [`DirectedGraph`] whose nodes are script ids and whose
//! edges are [`Trigger`]s. Nodes are created on first mention, so a graph can
//! reference callees that were never loaded.

use std::{collections::BTreeSet, fmt::Write};

use rustc_hash::FxHashMap;

use crate::{
    analysis::callgraph::Trigger,
    utils::{
        escape_dot,
        graph::{algorithms, DirectedGraph, NodeId},
    },
    Result,
};

/// One discovered caller to callee relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallEdge {
    /// Invoking script
    pub caller: i32,
    /// Invoked script
    pub callee: i32,
    /// How the callee is invoked
    pub trigger: Trigger,
}

/// Records which scripts invoke which, and how.
///
/// # Examples
///
/// ```rust
/// use cs2scope::analysis::callgraph::{CallGraph, Trigger};
///
/// let mut graph = CallGraph::new();
/// graph.call(1, 2, Trigger::Proc)?;
/// graph.call(2, 1, Trigger::ClientScript)?;
///
/// assert_eq!(graph.callees(1), vec![2]);
/// assert!(graph.is_recursive(1));
/// # Ok::<(), cs2scope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    graph: DirectedGraph<i32, Trigger>,
    nodes: FxHashMap<i32, NodeId>,
}

impl CallGraph {
    /// Creates an empty call graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn node_of(&mut self, script: i32) -> NodeId {
        if let Some(&node) = self.nodes.get(&script) {
            return node;
        }
        let node = self.graph.add_node(script);
        self.nodes.insert(script, node);
        node
    }

    /// Registers a script as a node, without edges.
    pub fn add_script(&mut self, script: i32) {
        self.node_of(script);
    }

    /// Records an edge. Returns `false` if the same edge was already recorded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GraphError`] if the underlying graph rejects the edge.
    pub fn call(&mut self, caller: i32, callee: i32, trigger: Trigger) -> Result<bool> {
        let source = self.node_of(caller);
        let target = self.node_of(callee);
        if self
            .graph
            .find_edge(source, target, |t| *t == trigger)
            .is_some()
        {
            return Ok(false);
        }
        self.graph.add_edge(source, target, trigger)?;
        Ok(true)
    }

    /// Returns every edge in insertion order.
    #[must_use]
    pub fn edges(&self) -> Vec<CallEdge> {
        self.graph
            .edges()
            .filter_map(|(_, source, target, trigger)| self.edge(source, target, *trigger))
            .collect()
    }

    fn edge(&self, source: NodeId, target: NodeId, trigger: Trigger) -> Option<CallEdge> {
        Some(CallEdge {
            caller: *self.graph.node(source)?,
            callee: *self.graph.node(target)?,
            trigger,
        })
    }

    /// Returns the outbound edges of a script.
    #[must_use]
    pub fn edges_from(&self, script: i32) -> Vec<CallEdge> {
        let Some(&node) = self.nodes.get(&script) else {
            return Vec::new();
        };
        self.graph
            .outgoing_edges(node)
            .filter_map(|(_, target, trigger)| self.edge(node, target, *trigger))
            .collect()
    }

    /// Returns the inbound edges of a script.
    #[must_use]
    pub fn edges_to(&self, script: i32) -> Vec<CallEdge> {
        let Some(&node) = self.nodes.get(&script) else {
            return Vec::new();
        };
        self.graph
            .incoming_edges(node)
            .filter_map(|(_, source, trigger)| self.edge(source, node, *trigger))
            .collect()
    }

    /// Returns the distinct callees of a script, ascending.
    #[must_use]
    pub fn callees(&self, script: i32) -> Vec<i32> {
        let set: BTreeSet<i32> = self.edges_from(script).iter().map(|e| e.callee).collect();
        set.into_iter().collect()
    }

    /// Returns the distinct callers of a script, ascending.
    #[must_use]
    pub fn callers(&self, script: i32) -> Vec<i32> {
        let set: BTreeSet<i32> = self.edges_to(script).iter().map(|e| e.caller).collect();
        set.into_iter().collect()
    }

    /// Returns every script mentioned by the graph, ascending.
    #[must_use]
    pub fn scripts(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.nodes.keys().copied().collect();
        set.into_iter().collect()
    }

    /// Returns the number of scripts in the graph.
    #[must_use]
    pub fn script_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if no script has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Returns `true` if a script can reach itself through calls.
    #[must_use]
    pub fn is_recursive(&self, script: i32) -> bool {
        self.recursive_scripts().contains(&script)
    }

    /// Returns the scripts involved in direct or mutual recursion, ascending.
    #[must_use]
    pub fn recursive_scripts(&self) -> BTreeSet<i32> {
        let mut recursive = BTreeSet::new();
        for component in algorithms::strongly_connected_components(&self.graph) {
            let cyclic = match component.as_slice() {
                [single] => self.graph.successors(*single).any(|s| s == *single),
                _ => true,
            };
            if cyclic {
                recursive.extend(component.iter().filter_map(|&n| self.graph.node(n).copied()));
            }
        }
        recursive
    }

    /// Computes aggregate statistics.
    #[must_use]
    pub fn stats(&self) -> CallGraphStats {
        let mut stats = CallGraphStats {
            script_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            ..CallGraphStats::default()
        };

        for (_, _, _, trigger) in self.graph.edges() {
            match trigger {
                Trigger::Proc => stats.proc_calls += 1,
                Trigger::ClientScript => stats.clientscript_calls += 1,
                _ => stats.other_calls += 1,
            }
        }
        for node in self.graph.node_ids() {
            if self.graph.in_degree(node) == 0 {
                stats.entry_points += 1;
            }
            if self.graph.out_degree(node) == 0 {
                stats.leaf_scripts += 1;
            }
        }
        stats.scc_count = algorithms::strongly_connected_components(&self.graph).len();
        stats.recursive_scripts = self.recursive_scripts().len();
        stats
    }

    /// Exports the graph in Graphviz DOT format.
    ///
    /// Entry points (no callers) are filled green, leaves (no callees) blue.
    /// Edges are labelled with their trigger.
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CallGraph {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"{}\";", escape_dot(name));
        } else {
            dot.push_str("    label=\"Call Graph\";\n");
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n");
        dot.push_str("    rankdir=TB;\n\n");

        for (node, script) in self.graph.nodes() {
            let style = if self.graph.in_degree(node) == 0 {
                ", style=filled, fillcolor=lightgreen"
            } else if self.graph.out_degree(node) == 0 {
                ", style=filled, fillcolor=lightblue"
            } else {
                ""
            };
            let _ = writeln!(dot, "    \"{script}\" [label=\"script{script}\"{style}];");
        }

        dot.push('\n');
        for edge in self.edges() {
            let _ = writeln!(
                dot,
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                edge.caller, edge.callee, edge.trigger
            );
        }

        dot.push_str("}\n");
        dot
    }
}

/// Statistics about a call graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraphStats {
    /// Number of scripts (nodes) in the graph.
    pub script_count: usize,
    /// Number of distinct (caller, callee, trigger) edges.
    pub edge_count: usize,
    /// Number of procedure call edges.
    pub proc_calls: usize,
    /// Number of invoke and hook edges.
    pub clientscript_calls: usize,
    /// Number of edges with any other trigger.
    pub other_calls: usize,
    /// Number of scripts with no callers.
    pub entry_points: usize,
    /// Number of scripts with no callees.
    pub leaf_scripts: usize,
    /// Number of strongly connected components.
    pub scc_count: usize,
    /// Number of scripts involved in direct or mutual recursion.
    pub recursive_scripts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_is_idempotent_per_trigger() {
        let mut graph = CallGraph::new();
        assert!(graph.call(1, 2, Trigger::Proc).unwrap());
        assert!(!graph.call(1, 2, Trigger::Proc).unwrap());
        assert!(graph.call(1, 2, Trigger::ClientScript).unwrap());

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.callees(1), vec![2]);
        assert_eq!(graph.callers(2), vec![1]);
        assert_eq!(graph.edges_from(1).len(), 2);
        assert!(graph.edges_to(1).is_empty());
    }

    #[test]
    fn test_recursion_detection() {
        let mut graph = CallGraph::new();
        graph.call(1, 2, Trigger::Proc).unwrap();
        graph.call(2, 3, Trigger::Proc).unwrap();
        graph.call(3, 2, Trigger::Proc).unwrap();
        graph.call(4, 4, Trigger::ClientScript).unwrap();

        assert!(!graph.is_recursive(1));
        assert!(graph.is_recursive(2));
        assert!(graph.is_recursive(3));
        assert!(graph.is_recursive(4));
        assert_eq!(
            graph.recursive_scripts().into_iter().collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_stats() {
        let mut graph = CallGraph::new();
        graph.call(1, 2, Trigger::Proc).unwrap();
        graph.call(1, 3, Trigger::ClientScript).unwrap();
        graph.call(2, 3, Trigger::LoadNpc).unwrap();
        graph.add_script(9);

        let stats = graph.stats();
        assert_eq!(stats.script_count, 4);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.proc_calls, 1);
        assert_eq!(stats.clientscript_calls, 1);
        assert_eq!(stats.other_calls, 1);
        assert_eq!(stats.entry_points, 2);
        assert_eq!(stats.leaf_scripts, 2);
        assert_eq!(stats.recursive_scripts, 0);
        assert_eq!(stats.scc_count, 4);
    }

    #[test]
    fn test_to_dot() {
        let mut graph = CallGraph::new();
        graph.call(10, 20, Trigger::Proc).unwrap();

        let dot = graph.to_dot(Some("corpus"));
        assert!(dot.starts_with("digraph CallGraph {"));
        assert!(dot.contains("label=\"corpus\";"));
        assert!(dot.contains("\"10\" -> \"20\" [label=\"proc\"];"));
        assert!(dot.contains("fillcolor=lightgreen"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
