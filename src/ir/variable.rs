use std::fmt;

use crate::script::StackType;

/// A typed storage location referenced by the IR.
///
/// Identity is the variant plus its scope key. Stack slots belong to one
/// interpretation of one script; locals and arrays are keyed by script id;
/// the global kinds are only ever referenced, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// An abstract operand stack slot, numbered per script.
    Stack {
        /// Owning script
        script: i32,
        /// Sequential slot id
        id: u32,
        /// Stack the slot lives on
        stack_type: StackType,
    },
    /// A local variable. Arguments occupy the lowest indices of each stack type.
    Local {
        /// Owning script
        script: i32,
        /// Index within locals of the same stack type
        index: u32,
        /// Stack type of the local
        stack_type: StackType,
    },
    /// Player variable.
    Varp(i32),
    /// Bit-packed player variable.
    Varbit(i32),
    /// Client-side integer variable.
    VarcInt(i32),
    /// Client-side string variable.
    VarcString(i32),
    /// A local array; every element shares one typing.
    Array {
        /// Owning script
        script: i32,
        /// Array index
        index: u32,
    },
}

impl Variable {
    /// Returns the stack this variable's values live on.
    #[must_use]
    pub const fn stack_type(&self) -> StackType {
        match self {
            Variable::Stack { stack_type, .. } | Variable::Local { stack_type, .. } => *stack_type,
            Variable::VarcString(_) => StackType::String,
            Variable::Varp(_) | Variable::Varbit(_) | Variable::VarcInt(_) | Variable::Array { .. } => {
                StackType::Int
            }
        }
    }

    /// Returns `true` for abstract stack slots.
    #[must_use]
    pub const fn is_stack(&self) -> bool {
        matches!(self, Variable::Stack { .. })
    }

    /// Returns `true` for process-wide variables.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        matches!(
            self,
            Variable::Varp(_) | Variable::Varbit(_) | Variable::VarcInt(_) | Variable::VarcString(_)
        )
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Stack { id, .. } => write!(f, "stack{id}"),
            Variable::Local {
                index, stack_type, ..
            } => write!(f, "${stack_type}{index}"),
            Variable::Varp(id) => write!(f, "%var{id}"),
            Variable::Varbit(id) => write!(f, "%varbit{id}"),
            Variable::VarcInt(id) => write!(f, "%varcint{id}"),
            Variable::VarcString(id) => write!(f, "%varcstring{id}"),
            Variable::Array { index, .. } => write!(f, "$array{index}"),
        }
    }
}
