use std::{collections::BTreeMap, fmt};

use crate::ir::Expr;

/// A jump anchor, named by the instruction position it precedes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(pub usize);

impl Label {
    /// Returns the opcode position the label points at.
    #[must_use]
    pub const fn pc(self) -> usize {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// One IR instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Zero or more definitions receive the values of one expression.
    Assignment {
        /// Destinations, in push order
        definitions: Vec<Expr>,
        /// Source of the values
        expression: Expr,
    },
    /// Conditional jump; falls through when the condition is false.
    Branch {
        /// The tested condition
        condition: Expr,
        /// Taken target
        target: Label,
    },
    /// Unconditional jump.
    Goto(Label),
    /// Multi-way jump; falls through for values without a case.
    Switch {
        /// The dispatch value
        expression: Expr,
        /// Case value to target
        cases: BTreeMap<i32, Label>,
    },
    /// Leaves the script with the given values.
    Return(Vec<Expr>),
    /// A jump anchor. Emits no code.
    Label(Label),
}

impl Instruction {
    /// Returns `true` for instructions after which the operand stack must be empty.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Instruction::Branch { .. }
                | Instruction::Goto(_)
                | Instruction::Switch { .. }
                | Instruction::Return(_)
        )
    }

    /// Returns `true` if control can continue at the next instruction.
    #[must_use]
    pub const fn falls_through(&self) -> bool {
        !matches!(self, Instruction::Goto(_) | Instruction::Return(_))
    }

    /// Returns the labels this instruction may jump to.
    #[must_use]
    pub fn targets(&self) -> Vec<Label> {
        match self {
            Instruction::Branch { target, .. } | Instruction::Goto(target) => vec![*target],
            Instruction::Switch { cases, .. } => cases.values().copied().collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assignment {
                definitions,
                expression,
            } => {
                for (i, def) in definitions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{def}")?;
                }
                if !definitions.is_empty() {
                    f.write_str(" = ")?;
                }
                write!(f, "{expression};")
            }
            Instruction::Branch { condition, target } => write!(f, "if ({condition}) goto {target};"),
            Instruction::Goto(target) => write!(f, "goto {target};"),
            Instruction::Switch { expression, cases } => {
                write!(f, "switch ({expression}) {{")?;
                for (value, label) in cases {
                    write!(f, " {value}: {label};")?;
                }
                f.write_str(" }")
            }
            Instruction::Return(values) => {
                f.write_str("return(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(");")
            }
            Instruction::Label(label) => write!(f, "{label}:"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        let goto = Instruction::Goto(Label(4));
        assert!(goto.is_terminal());
        assert!(!goto.falls_through());
        assert_eq!(goto.targets(), vec![Label(4)]);

        let label = Instruction::Label(Label(4));
        assert!(!label.is_terminal());
        assert!(label.falls_through());
        assert_eq!(label.to_string(), "@4:");
    }

    #[test]
    fn test_switch_targets_in_table_order() {
        let mut cases = BTreeMap::new();
        cases.insert(3, Label(9));
        cases.insert(-1, Label(7));
        let switch = Instruction::Switch {
            expression: Expr::Pointer(crate::ir::Variable::Varp(1)),
            cases,
        };
        assert_eq!(switch.targets(), vec![Label(7), Label(9)]);
        assert!(switch.falls_through());
    }
}
