use std::collections::BTreeSet;

use crate::ir::{Expr, Instruction};

/// The test guarding an `if` branch or a `while` loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Instructions evaluated before the test; a loop re-runs them every iteration
    pub prelude: Vec<Instruction>,
    /// The branch condition
    pub expression: Expr,
    /// The construct runs when the expression is false
    pub negated: bool,
}

impl Condition {
    /// A condition without prelude.
    #[must_use]
    pub fn new(expression: Expr, negated: bool) -> Self {
        Condition {
            prelude: Vec::new(),
            expression,
            negated,
        }
    }
}

/// A node of the structured control flow tree.
///
/// Every variant has an optional `next`: the construct that runs after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    /// Straight-line instructions.
    Seq {
        /// The instructions, in order
        instructions: Vec<Instruction>,
        /// What follows
        next: Option<Box<Construct>>,
    },
    /// A chain of guarded branches with an optional fallback.
    If {
        /// Condition and body of `if` and each `else if`, in order
        branches: Vec<(Condition, Construct)>,
        /// The `else` body
        otherwise: Option<Box<Construct>>,
        /// What follows
        next: Option<Box<Construct>>,
    },
    /// A pre-tested loop.
    While {
        /// The loop condition
        condition: Condition,
        /// The loop body
        body: Box<Construct>,
        /// What follows
        next: Option<Box<Construct>>,
    },
    /// A multi-way dispatch.
    Switch {
        /// The dispatch value
        expression: Expr,
        /// Case values sharing one body, ordered by body position
        cases: Vec<(BTreeSet<i32>, Construct)>,
        /// Body for values without a case
        default: Option<Box<Construct>>,
        /// What follows
        next: Option<Box<Construct>>,
    },
}

impl Construct {
    /// An empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Construct::Seq {
            instructions: Vec::new(),
            next: None,
        }
    }

    /// Returns the construct that follows this one.
    #[must_use]
    pub fn next(&self) -> Option<&Construct> {
        match self {
            Construct::Seq { next, .. }
            | Construct::If { next, .. }
            | Construct::While { next, .. }
            | Construct::Switch { next, .. } => next.as_deref(),
        }
    }

    pub(crate) fn next_mut(&mut self) -> &mut Option<Box<Construct>> {
        match self {
            Construct::Seq { next, .. }
            | Construct::If { next, .. }
            | Construct::While { next, .. }
            | Construct::Switch { next, .. } => next,
        }
    }

    /// Returns `true` for a sequence without instructions or successor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Construct::Seq { instructions, next: None } if instructions.is_empty())
    }

    /// Returns the instructions of the tree in execution order.
    ///
    /// Condition preludes come before their bodies. Labels, gotos and the
    /// consumed branches and switches are absent.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Instruction> {
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(construct) = current {
            match construct {
                Construct::Seq { instructions, .. } => out.extend(instructions.iter()),
                Construct::If {
                    branches,
                    otherwise,
                    ..
                } => {
                    for (condition, body) in branches {
                        out.extend(condition.prelude.iter());
                        out.extend(body.flatten());
                    }
                    if let Some(otherwise) = otherwise {
                        out.extend(otherwise.flatten());
                    }
                }
                Construct::While {
                    condition, body, ..
                } => {
                    out.extend(condition.prelude.iter());
                    out.extend(body.flatten());
                }
                Construct::Switch { cases, default, .. } => {
                    for (_, body) in cases {
                        out.extend(body.flatten());
                    }
                    if let Some(default) = default {
                        out.extend(default.flatten());
                    }
                }
            }
            current = construct.next();
        }
        out
    }

    /// Returns the nesting depth of the tree; a flat sequence has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut current = Some(self);
        while let Some(construct) = current {
            let nested = match construct {
                Construct::Seq { .. } => 0,
                Construct::If {
                    branches,
                    otherwise,
                    ..
                } => branches
                    .iter()
                    .map(|(_, body)| body.depth())
                    .chain(otherwise.iter().map(|o| o.depth()))
                    .max()
                    .unwrap_or(0),
                Construct::While { body, .. } => body.depth(),
                Construct::Switch { cases, default, .. } => cases
                    .iter()
                    .map(|(_, body)| body.depth())
                    .chain(default.iter().map(|d| d.depth()))
                    .max()
                    .unwrap_or(0),
            };
            deepest = deepest.max(nested + 1);
            current = construct.next();
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Variable;

    fn stmt(id: i32) -> Instruction {
        Instruction::Assignment {
            definitions: vec![],
            expression: Expr::Pointer(Variable::Varp(id)),
        }
    }

    #[test]
    fn test_flatten_emits_preludes_before_bodies() {
        let mut condition = Condition::new(Expr::Pointer(Variable::Varp(0)), false);
        condition.prelude.push(stmt(1));

        let tree = Construct::While {
            condition,
            body: Box::new(Construct::Seq {
                instructions: vec![stmt(2)],
                next: None,
            }),
            next: Some(Box::new(Construct::Seq {
                instructions: vec![stmt(3)],
                next: None,
            })),
        };

        let flat: Vec<Instruction> = tree.flatten().into_iter().cloned().collect();
        assert_eq!(flat, vec![stmt(1), stmt(2), stmt(3)]);
        assert_eq!(tree.depth(), 2);
        assert!(Construct::empty().is_empty());
    }
}
