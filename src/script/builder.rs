//! Fluent construction of [`Script`]s.
//!
//! Jumps are written with absolute targets; the builder converts them to the
//! relative offsets the bytecode stores.
//!
//! # Example
//!
//! ```rust
//! use cs2scope::interpreter::opcodes;
//! use cs2scope::script::{ScriptBuilder, StackType};
//!
//! // if (arg0 == 1) return 1; return 0;
//! let script = ScriptBuilder::new()
//!     .arguments(1, 0)
//!     .returns(&[StackType::Int])
//!     .op(opcodes::PUSH_INT_LOCAL, 0)
//!     .push_int(1)
//!     .jump(opcodes::BRANCH_EQUALS, 5)
//!     .push_int(0)
//!     .op(opcodes::RETURN, 0)
//!     .push_int(1)
//!     .op(opcodes::RETURN, 0)
//!     .build();
//!
//! assert_eq!(script.operands[2].as_int(), Some(2));
//! assert_eq!(script.len(), 7);
//! ```

use std::collections::BTreeMap;

use crate::{
    interpreter::opcodes,
    script::{Script, StackType, Value},
};

/// Builder for [`Script`].
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    opcodes: Vec<u16>,
    operands: Vec<Value>,
    switches: Vec<BTreeMap<i32, i32>>,
    int_arguments: usize,
    string_arguments: usize,
    returns: Vec<StackType>,
}

impl ScriptBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the argument counts.
    #[must_use]
    pub fn arguments(mut self, ints: usize, strings: usize) -> Self {
        self.int_arguments = ints;
        self.string_arguments = strings;
        self
    }

    /// Declares the return stack types.
    #[must_use]
    pub fn returns(mut self, returns: &[StackType]) -> Self {
        self.returns = returns.to_vec();
        self
    }

    /// Returns the position the next instruction will take.
    #[must_use]
    pub fn pc(&self) -> usize {
        self.opcodes.len()
    }

    /// Appends an instruction.
    #[must_use]
    pub fn op(mut self, opcode: u16, operand: impl Into<Value>) -> Self {
        self.opcodes.push(opcode);
        self.operands.push(operand.into());
        self
    }

    /// Appends `push_constant_int`.
    #[must_use]
    pub fn push_int(self, value: i32) -> Self {
        self.op(opcodes::PUSH_CONSTANT_INT, value)
    }

    /// Appends `push_constant_string`.
    #[must_use]
    pub fn push_string(self, value: &str) -> Self {
        self.op(opcodes::PUSH_CONSTANT_STRING, value)
    }

    /// Appends a branch or goto to the absolute position `target`.
    #[must_use]
    pub fn jump(self, opcode: u16, target: usize) -> Self {
        let offset = target as i64 - self.pc() as i64 - 1;
        self.op(opcode, offset as i32)
    }

    /// Appends a `switch` whose cases jump to absolute positions.
    #[must_use]
    pub fn switch(mut self, cases: &[(i32, usize)]) -> Self {
        let pc = self.pc() as i64;
        let table = cases
            .iter()
            .map(|&(value, target)| (value, (target as i64 - pc - 1) as i32))
            .collect();
        let index = self.switches.len() as i32;
        self.switches.push(table);
        self.op(opcodes::SWITCH, index)
    }

    /// Finishes the script.
    #[must_use]
    pub fn build(self) -> Script {
        Script::new(
            self.opcodes,
            self.operands,
            self.int_arguments,
            self.string_arguments,
            self.returns,
        )
        .with_switches(self.switches)
    }
}
