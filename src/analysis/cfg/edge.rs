//! Control flow edge kinds.

use std::fmt;

/// The kind of control flow represented by an edge.
///
/// # Examples
///
/// ```rust
/// use cs2scope::analysis::cfg::CfgEdgeKind;
///
/// assert!(CfgEdgeKind::Taken.is_conditional());
/// assert!(!CfgEdgeKind::Jump.is_conditional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfgEdgeKind {
    /// Sequential flow into the next block after a non-jumping instruction.
    Fallthrough,
    /// Unconditional `goto`.
    Jump,
    /// Branch taken: the condition held.
    Taken,
    /// Branch not taken: flow continues at the next block.
    NotTaken,
    /// A switch case, with its dispatch value.
    Case(i32),
    /// Switch fallthrough for values without a case.
    Default,
}

impl CfgEdgeKind {
    /// Returns `true` for the two outcomes of a branch.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(self, CfgEdgeKind::Taken | CfgEdgeKind::NotTaken)
    }

    /// Returns `true` for switch edges.
    #[must_use]
    pub const fn is_switch(self) -> bool {
        matches!(self, CfgEdgeKind::Case(_) | CfgEdgeKind::Default)
    }
}

impl fmt::Display for CfgEdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfgEdgeKind::Fallthrough => Ok(()),
            CfgEdgeKind::Jump => f.write_str("goto"),
            CfgEdgeKind::Taken => f.write_str("T"),
            CfgEdgeKind::NotTaken => f.write_str("F"),
            CfgEdgeKind::Case(value) => write!(f, "case {value}"),
            CfgEdgeKind::Default => f.write_str("default"),
        }
    }
}
