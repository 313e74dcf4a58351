use crate::{
    ir::{InsnId, Label},
    utils::graph::NodeId,
};

/// How control leaves a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockExit {
    /// The block ends in a `return`.
    Return,
    /// The block runs into the next one, or off the end of the script (`None`).
    Fallthrough(Option<NodeId>),
    /// The block ends in a `goto`.
    Goto(NodeId),
    /// The block ends in a conditional branch.
    Branch {
        /// Target when the condition holds
        taken: NodeId,
        /// Target when it does not
        fallthrough: NodeId,
    },
    /// The block ends in a switch.
    Switch {
        /// Case value and target, in table order
        cases: Vec<(i32, NodeId)>,
        /// Target for values without a case
        default: NodeId,
    },
}

impl BlockExit {
    /// Returns the successor blocks in edge order.
    #[must_use]
    pub fn successors(&self) -> Vec<NodeId> {
        match self {
            BlockExit::Return | BlockExit::Fallthrough(None) => Vec::new(),
            BlockExit::Fallthrough(Some(next)) | BlockExit::Goto(next) => vec![*next],
            BlockExit::Branch { taken, fallthrough } => vec![*taken, *fallthrough],
            BlockExit::Switch { cases, default } => cases
                .iter()
                .map(|(_, target)| *target)
                .chain(std::iter::once(*default))
                .collect(),
        }
    }
}

/// A maximal straight-line run of instructions.
///
/// A block starts at the first instruction, at a label, or right after a
/// terminal instruction. Consecutive labels share one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// Position of the block in program order
    pub index: usize,
    /// Labels that name the block entry
    pub labels: Vec<Label>,
    /// All instructions, labels and the terminator included
    pub instructions: Vec<InsnId>,
    /// Instructions kept by structuring: everything but labels and jumps
    pub body: Vec<InsnId>,
    /// The terminal instruction, if the block has one
    pub terminator: Option<InsnId>,
    /// Control flow out of the block
    pub exit: BlockExit,
}

impl BasicBlock {
    pub(crate) fn new(index: usize) -> Self {
        BasicBlock {
            index,
            labels: Vec::new(),
            instructions: Vec::new(),
            body: Vec::new(),
            terminator: None,
            exit: BlockExit::Fallthrough(None),
        }
    }

    /// Returns `true` if the block only forwards control with a `goto`.
    #[must_use]
    pub fn is_trampoline(&self) -> bool {
        self.body.is_empty() && matches!(self.exit, BlockExit::Goto(_))
    }

    /// Returns `true` if the block has neither body nor terminator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.terminator.is_none()
    }
}
