//! Strongly connected components using Tarjan's algorithm.
//!
//! The call graph uses this to find scripts that (mutually) invoke themselves.
//! Components are returned in reverse topological order of the condensation:
//! a component is emitted only after every component reachable from it.

use crate::utils::graph::{NodeId, Successors};

/// Returns the strongly connected components of `graph`.
///
/// Every node belongs to exactly one component. Single-node components are
/// included whether or not the node has a self-loop.
pub fn strongly_connected_components<G>(graph: &G) -> Vec<Vec<NodeId>>
where
    G: Successors,
{
    let node_count = graph.node_count();
    let mut state = TarjanState::new(node_count);

    for i in 0..node_count {
        if state.index[i].is_none() {
            state.strongconnect(graph, NodeId::new(i));
        }
    }

    state.components
}

struct TarjanState {
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<NodeId>,
    next_index: usize,
    components: Vec<Vec<NodeId>>,
}

impl TarjanState {
    fn new(n: usize) -> Self {
        TarjanState {
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        }
    }

    fn strongconnect<G: Successors>(&mut self, graph: &G, v: NodeId) {
        let v_idx = v.index();
        let v_index = self.next_index;

        self.index[v_idx] = Some(v_index);
        self.lowlink[v_idx] = v_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v_idx] = true;

        for w in graph.successors(v) {
            let w_idx = w.index();
            match self.index[w_idx] {
                None => {
                    self.strongconnect(graph, w);
                    self.lowlink[v_idx] = self.lowlink[v_idx].min(self.lowlink[w_idx]);
                }
                Some(w_index) if self.on_stack[w_idx] => {
                    self.lowlink[v_idx] = self.lowlink[v_idx].min(w_index);
                }
                Some(_) => {}
            }
        }

        if self.lowlink[v_idx] == v_index {
            let mut component = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w.index()] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}
