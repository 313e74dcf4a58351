use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant is fatal for exactly one script: the interpreter memoizes failures per
/// script id, so an error in one script never corrupts the state used by unrelated scripts.
/// Callers of a failed script see the failure wrapped in [`Error::CalleeFailed`].
///
/// # Error Categories
///
/// ## Interpretation Errors
/// - [`Error::UnknownOpcode`] - No command table rule exists for an opcode
/// - [`Error::StackImbalance`] - The abstract operand stack does not match a rule or terminal
/// - [`Error::MissingCallee`] - A call targets a script the loader does not know
/// - [`Error::CalleeFailed`] - A callee could not be decompiled
/// - [`Error::MissingPrototype`] - A param or db-column id has no declared prototype
/// - [`Error::RecursionLimit`] - On-demand callee interpretation nested too deeply
///
/// ## Type Errors
/// - [`Error::TypeConflict`] - Two incompatible concrete types met in one typing class
///
/// ## Structural Errors
/// - [`Error::StructuringFailure`] - The control-flow graph is not expressible as constructs
/// - [`Error::Malformed`] - Corrupted bytecode (invalid label targets, missing tables, ...)
/// - [`Error::GraphError`] - Graph construction referenced unknown nodes
///
/// # Examples
///
/// ```rust
/// use cs2scope::Error;
///
/// fn describe(err: &Error) -> &'static str {
///     match err {
///         Error::UnknownOpcode { .. } => "incomplete opcode table",
///         Error::TypeConflict { .. } => "type inference failed",
///         Error::CalleeFailed { .. } => "a callee failed",
///         _ => "other",
///     }
/// }
/// ```
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// No translation rule is registered for an opcode.
    ///
    /// Raised by the command table lookup. Either the bytecode is corrupt, or the
    /// selected command table revision does not cover this opcode.
    #[error("Unknown opcode {opcode} at script {script} pc {pc}")]
    UnknownOpcode {
        /// Script that contained the opcode
        script: i32,
        /// Position of the opcode
        pc: usize,
        /// The unmapped opcode id
        opcode: u16,
    },

    /// The abstract operand stack violated the stack discipline.
    ///
    /// Raised when the stack is not empty after a terminal instruction, when a pop
    /// finds an empty stack, or when a popped slot has a different stack type than
    /// the rule declares.
    #[error("Stack imbalance in script {script} at pc {pc}: {message}")]
    StackImbalance {
        /// Script being interpreted
        script: i32,
        /// Position of the offending instruction
        pc: usize,
        /// Description of the imbalance
        message: String,
    },

    /// Two typing classes with incompatible concrete types were unified.
    ///
    /// Only the documented union pairs may share a class; any other combination,
    /// and any mix of int and string stack types, ends up here.
    #[error("Type conflict between {left} and {right}")]
    TypeConflict {
        /// Description of the first class
        left: String,
        /// Description of the second class
        right: String,
    },

    /// A call targets a script id that the script loader does not know.
    #[error("Script {caller} calls missing script {callee}")]
    MissingCallee {
        /// Calling script
        caller: i32,
        /// Unknown callee id
        callee: i32,
    },

    /// A callee failed to decompile, so its caller cannot be decompiled either.
    #[error("Script {caller} depends on script {callee}, which failed: {source}")]
    CalleeFailed {
        /// Calling script
        caller: i32,
        /// Failed callee
        callee: i32,
        /// The callee's own failure
        #[source]
        source: Box<Error>,
    },

    /// No prototype is declared for a param or db-column key.
    #[error("No prototype declared for key {key}")]
    MissingPrototype {
        /// The param or db-column id
        key: i32,
    },

    /// The control-flow graph cannot be expressed as a tree of constructs.
    #[error("Cannot structure script {script}: {message}")]
    StructuringFailure {
        /// Script being structured
        script: i32,
        /// Description of the offending edge
        message: String,
    },

    /// The bytecode is damaged and could not be interpreted.
    ///
    /// The error includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Reach the maximum nesting of on-demand callee interpretation.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Graph construction or query error.
    #[error("{0}")]
    GraphError(String),
}
