//! The script input model.
//!
//! A [`Script`] is the decoded form of one compiled clientscript: parallel opcode
//! and operand arrays, its switch jump tables and its calling signature. Decoding
//! the binary container is the job of an external collaborator; scripts reach the
//! interpreter through a [`ScriptLoader`].
//!
//! # Key Types
//!
//! - [`Script`] - Immutable decoded script
//! - [`ScriptBuilder`] - Fluent construction with absolute jump targets
//! - [`Value`] - Integer or string operand
//! - [`Type`] / [`StackType`] - Concrete value types and the VM stacks
//! - [`Prototype`] - A named use of a type, see [`prototype`] for the catalogue
//! - [`ScriptFormat`] - Bytecode revision selecting the command table

use std::collections::BTreeMap;

use strum::{Display, EnumIter};

mod builder;
mod loader;
mod types;
mod value;

pub mod prototype;

pub use builder::ScriptBuilder;
pub use loader::{PrototypeLoader, PrototypeMap, ScriptLoader, ScriptMap};
pub use prototype::Prototype;
pub use types::{StackType, Type};
pub use value::Value;

/// Bytecode revision of a script corpus.
///
/// The two revisions share opcode numbers for the core instructions but translate
/// several of them differently, see [`crate::interpreter::CommandTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum ScriptFormat {
    /// Early revision: calls are `invoke` with the callee as first argument,
    /// variable access is expressed through operand-sourced signatures.
    Legacy,
    /// Current revision: calls are `gosub_with_params`, hooks carry typed
    /// transmit lists, param and db lookups are typed through the prototype loader.
    #[default]
    Current,
}

/// One decoded script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Opcode per instruction position
    pub opcodes: Vec<u16>,
    /// Operand per instruction position, parallel to `opcodes`
    pub operands: Vec<Value>,
    /// Switch jump tables: dispatch value to relative jump offset
    pub switches: Vec<BTreeMap<i32, i32>>,
    /// Number of integer arguments
    pub int_argument_count: usize,
    /// Number of string arguments
    pub string_argument_count: usize,
    /// Declared return stack types, in push order
    pub return_types: Vec<StackType>,
}

impl Script {
    /// Creates a script without switch tables.
    #[must_use]
    pub fn new(
        opcodes: Vec<u16>,
        operands: Vec<Value>,
        int_argument_count: usize,
        string_argument_count: usize,
        return_types: Vec<StackType>,
    ) -> Self {
        Script {
            opcodes,
            operands,
            switches: Vec::new(),
            int_argument_count,
            string_argument_count,
            return_types,
        }
    }

    /// Attaches switch jump tables.
    #[must_use]
    pub fn with_switches(mut self, switches: Vec<BTreeMap<i32, i32>>) -> Self {
        self.switches = switches;
        self
    }

    /// Returns the number of instruction positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    /// Returns `true` if the script has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }

    /// Returns the total number of arguments.
    #[must_use]
    pub fn argument_count(&self) -> usize {
        self.int_argument_count + self.string_argument_count
    }

    /// Returns the argument stack types: integers first, then strings.
    #[must_use]
    pub fn argument_types(&self) -> Vec<StackType> {
        let mut types = vec![StackType::Int; self.int_argument_count];
        types.extend(std::iter::repeat(StackType::String).take(self.string_argument_count));
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_types_order() {
        let script = Script::new(vec![21], vec![Value::Int(0)], 2, 1, vec![]);
        assert_eq!(script.argument_count(), 3);
        assert_eq!(
            script.argument_types(),
            vec![StackType::Int, StackType::Int, StackType::String]
        );
        assert_eq!(script.len(), 1);
    }

    #[test]
    fn test_default_format() {
        assert_eq!(ScriptFormat::default(), ScriptFormat::Current);
    }
}
