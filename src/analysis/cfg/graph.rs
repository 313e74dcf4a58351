//! Block-level control flow graph of one [`Function`].

use std::{fmt::Write, sync::OnceLock};

use rustc_hash::FxHashMap;

use crate::{
    analysis::cfg::{BasicBlock, BlockExit, CfgEdgeKind},
    ir::{Function, InsnId, Instruction, Label},
    utils::{
        escape_dot,
        graph::{
            algorithms::{self, DominatorTree},
            DirectedGraph, GraphBase, NodeId, Predecessors, RootedGraph, Successors,
        },
    },
    Result,
};

/// A control flow graph over the basic blocks of a function.
///
/// Blocks are numbered in program order, so comparing two [`NodeId`]s compares
/// the positions of the blocks in the instruction chain.
///
/// # Lazy Computation
///
/// - [`dominators`](Self::dominators) - Dominator tree rooted at the entry block
/// - [`post_dominators`](Self::post_dominators) - Dominator tree of the reversed
///   graph, rooted at a virtual exit node
///
/// Both are computed on first access and cached.
///
/// # Examples
///
/// ```rust
/// use cs2scope::analysis::cfg::ControlFlowGraph;
/// use cs2scope::ir::{Function, Instruction, InstructionChain, Label};
///
/// let instructions: InstructionChain = vec![
///     Instruction::Goto(Label(1)),
///     Instruction::Label(Label(1)),
///     Instruction::Return(vec![]),
/// ]
/// .into_iter()
/// .collect();
/// let function = Function {
///     id: 0,
///     arguments: vec![],
///     instructions,
///     return_types: vec![],
/// };
///
/// let cfg = ControlFlowGraph::build(&function)?;
/// assert_eq!(cfg.block_count(), 2);
/// assert_eq!(cfg.block_of_label(Label(1)), Some(cfg.successors(cfg.entry()).next().unwrap()));
/// # Ok::<(), cs2scope::Error>(())
/// ```
#[derive(Debug)]
pub struct ControlFlowGraph<'a> {
    function: &'a Function,
    graph: DirectedGraph<BasicBlock, CfgEdgeKind>,
    labels: FxHashMap<Label, NodeId>,
    entry: NodeId,
    exits: Vec<NodeId>,
    dominators: OnceLock<DominatorTree>,
    post_dominators: OnceLock<DominatorTree>,
}

impl<'a> ControlFlowGraph<'a> {
    /// Splits a function into blocks and connects them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if a jump names a label that is not in
    /// the chain, or a branch or switch is the last instruction of the function.
    pub fn build(function: &'a Function) -> Result<Self> {
        let mut blocks = split(function);

        let mut labels = FxHashMap::default();
        for block in &blocks {
            for label in &block.labels {
                labels.insert(*label, NodeId::new(block.index));
            }
        }

        let block_count = blocks.len();
        let resolve = |label: &Label| {
            labels.get(label).copied().ok_or_else(|| {
                malformed_error!("Script {} jumps to {} which has no anchor", function.id, label)
            })
        };
        let next_of = |index: usize| {
            (index + 1 < block_count).then(|| NodeId::new(index + 1))
        };

        for block in &mut blocks {
            let terminator = block
                .terminator
                .and_then(|id| function.instructions.get(id));
            block.exit = match terminator {
                Some(Instruction::Return(_)) => BlockExit::Return,
                Some(Instruction::Goto(target)) => BlockExit::Goto(resolve(target)?),
                Some(Instruction::Branch { target, .. }) => BlockExit::Branch {
                    taken: resolve(target)?,
                    fallthrough: next_of(block.index).ok_or_else(|| {
                        malformed_error!("Script {} ends with a branch", function.id)
                    })?,
                },
                Some(Instruction::Switch { cases, .. }) => {
                    let mut targets = Vec::with_capacity(cases.len());
                    for (value, label) in cases {
                        targets.push((*value, resolve(label)?));
                    }
                    BlockExit::Switch {
                        cases: targets,
                        default: next_of(block.index).ok_or_else(|| {
                            malformed_error!("Script {} ends with a switch", function.id)
                        })?,
                    }
                }
                _ => BlockExit::Fallthrough(next_of(block.index)),
            };
        }

        let mut graph = DirectedGraph::with_capacity(block_count, block_count * 2);
        let mut edges = Vec::new();
        let mut exits = Vec::new();
        for block in blocks {
            let node = NodeId::new(block.index);
            match &block.exit {
                BlockExit::Return | BlockExit::Fallthrough(None) => exits.push(node),
                BlockExit::Fallthrough(Some(next)) => edges.push((node, *next, CfgEdgeKind::Fallthrough)),
                BlockExit::Goto(target) => edges.push((node, *target, CfgEdgeKind::Jump)),
                BlockExit::Branch { taken, fallthrough } => {
                    edges.push((node, *taken, CfgEdgeKind::Taken));
                    edges.push((node, *fallthrough, CfgEdgeKind::NotTaken));
                }
                BlockExit::Switch { cases, default } => {
                    for (value, target) in cases {
                        edges.push((node, *target, CfgEdgeKind::Case(*value)));
                    }
                    edges.push((node, *default, CfgEdgeKind::Default));
                }
            }
            graph.add_node(block);
        }
        for (source, target, kind) in edges {
            graph.add_edge(source, target, kind)?;
        }

        Ok(ControlFlowGraph {
            function,
            graph,
            labels,
            entry: NodeId::new(0),
            exits,
            dominators: OnceLock::new(),
            post_dominators: OnceLock::new(),
        })
    }

    /// Returns the function the graph was built from.
    #[must_use]
    pub fn function(&self) -> &'a Function {
        self.function
    }

    /// Returns the entry block.
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns the blocks that leave the function.
    #[must_use]
    pub fn exits(&self) -> &[NodeId] {
        &self.exits
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns a block.
    #[must_use]
    pub fn block(&self, node: NodeId) -> Option<&BasicBlock> {
        self.graph.node(node)
    }

    /// Iterates the blocks in program order.
    pub fn blocks(&self) -> impl Iterator<Item = (NodeId, &BasicBlock)> + '_ {
        self.graph.nodes()
    }

    /// Returns the block a label anchors.
    #[must_use]
    pub fn block_of_label(&self, label: Label) -> Option<NodeId> {
        self.labels.get(&label).copied()
    }

    /// Returns an instruction of the underlying function.
    #[must_use]
    pub fn instruction(&self, id: InsnId) -> Option<&'a Instruction> {
        self.function.instructions.get(id)
    }

    /// Returns the successors of a block in edge order.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.successors(node)
    }

    /// Returns the predecessors of a block.
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.predecessors(node)
    }

    /// Returns the underlying graph.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph<BasicBlock, CfgEdgeKind> {
        &self.graph
    }

    /// Returns the dominator tree.
    #[must_use]
    pub fn dominators(&self) -> &DominatorTree {
        self.dominators
            .get_or_init(|| algorithms::compute_dominators(&self.graph, self.entry))
    }

    /// Returns the post-dominator tree.
    ///
    /// The tree is rooted at [`virtual_exit`](Self::virtual_exit), which every
    /// exit block flows into. Blocks that cannot reach an exit (infinite loops)
    /// are unreachable in this tree.
    #[must_use]
    pub fn post_dominators(&self) -> &DominatorTree {
        self.post_dominators.get_or_init(|| {
            let exit = self.virtual_exit();
            let mut reversed: DirectedGraph<(), ()> =
                DirectedGraph::with_capacity(exit.index() + 1, self.graph.edge_count());
            for _ in 0..=exit.index() {
                reversed.add_node(());
            }
            for (_, source, target, _) in self.graph.edges() {
                let _ = reversed.add_edge(target, source, ());
            }
            for &node in &self.exits {
                let _ = reversed.add_edge(exit, node, ());
            }
            algorithms::compute_dominators(&reversed, exit)
        })
    }

    /// Returns the id of the virtual exit node of the post-dominator tree.
    #[must_use]
    pub fn virtual_exit(&self) -> NodeId {
        NodeId::new(self.graph.node_count())
    }

    /// Returns the immediate post-dominator of a block.
    ///
    /// `None` when only the virtual exit post-dominates the block, or when the
    /// block cannot reach an exit.
    #[must_use]
    pub fn immediate_post_dominator(&self, node: NodeId) -> Option<NodeId> {
        self.post_dominators()
            .immediate_dominator(node)
            .filter(|&p| p != self.virtual_exit())
    }

    /// Follows goto-only blocks to the block that does the work.
    ///
    /// A cycle of goto-only blocks stops at the first block that repeats.
    #[must_use]
    pub fn forward(&self, mut node: NodeId) -> NodeId {
        let mut hops = 0;
        while let Some(block) = self.graph.node(node) {
            match block.exit {
                BlockExit::Goto(target) if block.is_trampoline() && hops < self.block_count() => {
                    node = target;
                    hops += 1;
                }
                _ => break,
            }
        }
        node
    }

    /// Returns the blocks with a back edge to `node`: predecessors it dominates.
    #[must_use]
    pub fn latches(&self, node: NodeId) -> Vec<NodeId> {
        let dominators = self.dominators();
        self.predecessors(node)
            .filter(|&pred| dominators.dominates(node, pred))
            .collect()
    }

    /// Returns `true` if `node` heads a loop.
    #[must_use]
    pub fn is_loop_header(&self, node: NodeId) -> bool {
        !self.latches(node).is_empty()
    }

    /// Exports the graph in Graphviz DOT format.
    ///
    /// Each block lists its instructions; the entry block is filled green and
    /// exit blocks red.
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CFG {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"CFG: {}\";", escape_dot(name));
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

        for (node, block) in self.graph.nodes() {
            let is_entry = node == self.entry;
            let is_exit = self.exits.contains(&node);

            let mut label = format!("B{}", block.index);
            if is_entry {
                label.push_str(" (entry)");
            }
            if is_exit {
                label.push_str(" (exit)");
            }
            label.push_str("\\l");
            for insn in block.instructions.iter().filter_map(|&id| self.instruction(id)) {
                let _ = write!(label, "{}\\l", escape_dot(&insn.to_string()));
            }

            let style = if is_entry {
                ", style=filled, fillcolor=lightgreen"
            } else if is_exit {
                ", style=filled, fillcolor=lightcoral"
            } else {
                ""
            };
            let _ = writeln!(dot, "    B{} [label=\"{label}\"{style}];", block.index);
        }

        dot.push('\n');
        for (_, source, target, kind) in self.graph.edges() {
            let _ = writeln!(
                dot,
                "    B{} -> B{} [label=\"{}\"];",
                source.index(),
                target.index(),
                escape_dot(&kind.to_string())
            );
        }

        dot.push_str("}\n");
        dot
    }
}

impl GraphBase for ControlFlowGraph<'_> {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        self.graph.node_ids()
    }
}

impl Successors for ControlFlowGraph<'_> {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.graph.successors(node)
    }
}

impl Predecessors for ControlFlowGraph<'_> {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.graph.predecessors(node)
    }
}

impl RootedGraph for ControlFlowGraph<'_> {
    fn entry(&self) -> NodeId {
        self.entry
    }
}

/// Partitions the instruction chain into blocks. Exits are filled in later.
fn split(function: &Function) -> Vec<BasicBlock> {
    let mut blocks = vec![BasicBlock::new(0)];
    let mut after_terminal = false;

    for (id, insn) in function.instructions.iter() {
        let current_has_code = blocks
            .last()
            .is_some_and(|b| !b.body.is_empty() || b.terminator.is_some());
        let starts_block = match insn {
            Instruction::Label(_) => current_has_code,
            _ => after_terminal,
        };
        if starts_block {
            blocks.push(BasicBlock::new(blocks.len()));
        }
        after_terminal = false;

        let Some(block) = blocks.last_mut() else {
            break;
        };
        block.instructions.push(id);
        match insn {
            Instruction::Label(label) => block.labels.push(*label),
            Instruction::Return(_) => {
                block.body.push(id);
                block.terminator = Some(id);
                after_terminal = true;
            }
            Instruction::Branch { .. } | Instruction::Goto(_) | Instruction::Switch { .. } => {
                block.terminator = Some(id);
                after_terminal = true;
            }
            Instruction::Assignment { .. } => block.body.push(id),
        }
    }

    blocks
}
