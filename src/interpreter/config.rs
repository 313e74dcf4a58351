//! Interpreter configuration.
//!
//! [`InterpreterConfig`] selects the command table revision and bounds the
//! on-demand interpretation of callees.
//!
//! # Configuration Presets
//!
//! - [`InterpreterConfig::current()`] - Current bytecode revision (the default)
//! - [`InterpreterConfig::legacy()`] - Early bytecode revision
//!
//! # Example
//!
//! ```rust
//! use cs2scope::interpreter::InterpreterConfig;
//!
//! let config = InterpreterConfig::legacy().with_max_call_depth(32);
//! assert_eq!(config.max_call_depth, 32);
//! ```

use crate::script::ScriptFormat;

/// Settings of one interpretation run.
///
/// # Default Configuration
///
/// - current bytecode revision
/// - 256 nested callee interpretations
/// - operands of rules that declare none must be zero
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Bytecode revision, selects the command table.
    pub format: ScriptFormat,

    /// Maximum nesting of on-demand callee interpretation.
    ///
    /// Every call to a script that has not been interpreted yet interprets it
    /// first. A chain deeper than this fails with
    /// [`crate::Error::RecursionLimit`].
    pub max_call_depth: usize,

    /// Reject non-zero operands on rules that take none.
    ///
    /// Declarative rules without component-relative addressing ignore their
    /// operand. A non-zero value there usually means the opcode table is wrong.
    pub check_operands: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            format: ScriptFormat::Current,
            max_call_depth: 256,
            check_operands: true,
        }
    }
}

impl InterpreterConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for the early bytecode revision.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            format: ScriptFormat::Legacy,
            ..Default::default()
        }
    }

    /// Configuration for the current bytecode revision.
    #[must_use]
    pub fn current() -> Self {
        Self {
            format: ScriptFormat::Current,
            ..Default::default()
        }
    }

    /// Sets the bytecode revision.
    #[must_use]
    pub fn with_format(mut self, format: ScriptFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the maximum nesting of on-demand callee interpretation.
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum number of scripts interpreted inside one another
    #[must_use]
    pub fn with_max_call_depth(mut self, max: usize) -> Self {
        self.max_call_depth = max;
        self
    }

    /// Enables or disables the operand check.
    #[must_use]
    pub fn with_check_operands(mut self, check: bool) -> Self {
        self.check_operands = check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(InterpreterConfig::default(), InterpreterConfig::current());
        assert_eq!(InterpreterConfig::legacy().format, ScriptFormat::Legacy);
        assert_eq!(InterpreterConfig::legacy().max_call_depth, 256);
    }

    #[test]
    fn test_builders() {
        let config = InterpreterConfig::new()
            .with_format(ScriptFormat::Legacy)
            .with_max_call_depth(4)
            .with_check_operands(false);
        assert_eq!(config.format, ScriptFormat::Legacy);
        assert_eq!(config.max_call_depth, 4);
        assert!(!config.check_operands);
    }
}
