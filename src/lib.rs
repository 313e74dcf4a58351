// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(clippy::too_many_arguments)]

//! # cs2scope
//!
//! A decompiler core for clientscript (CS2) bytecode, the stack-based scripting
//! language of a game client's UI.
//!
//! `cs2scope` turns decoded scripts into typed, structured IR:
//!
//! - **Abstract interpretation** - every opcode becomes one IR instruction over
//!   typed stack slots, driven by a per-revision command table
//! - **Type unification** - a union-find store merges the types of values that
//!   flow into each other, across script boundaries
//! - **Call graph** - every procedure call, invoke and event hook is recorded
//! - **Control-flow reconstruction** - dominator-based structuring into
//!   sequences, if/else chains, while loops and switches
//!
//! Decoding the binary script container and emitting source text are left to
//! collaborators; scripts come in through a [`script::ScriptLoader`].
//!
//! ## Quick Start
//!
//! ```rust
//! use cs2scope::prelude::*;
//! use cs2scope::interpreter::opcodes;
//!
//! let mut scripts = ScriptMap::new();
//! scripts.insert(
//!     1,
//!     Script::new(
//!         vec![opcodes::PUSH_CONSTANT_INT, opcodes::RETURN],
//!         vec![Value::Int(5), Value::Int(0)],
//!         0,
//!         0,
//!         vec![StackType::Int],
//!     ),
//! );
//! let prototypes = PrototypeMap::new();
//!
//! let mut interpreter = Interpreter::new(&scripts, &prototypes, InterpreterConfig::default());
//! interpreter.interpret_all();
//! let functions = interpreter.finish();
//!
//! let construct = functions.reconstruct(1)?;
//! assert_eq!(construct.flatten().len(), 2);
//! # Ok::<(), cs2scope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`script`] - The input model: scripts, values, types and prototypes
//! - [`interpreter`] - Command table and abstract interpreter
//! - [`ir`] - Instructions, expressions, variables and the typings store
//! - [`analysis`] - Call graph, control flow graph and structuring
//! - [`utils`] - Generic directed graph and graph algorithms
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Errors are fatal for one
//! script only:
//!
//! ```rust
//! use cs2scope::Error;
//!
//! fn retryable(err: &Error) -> bool {
//!     matches!(err, Error::RecursionLimit(_))
//! }
//! assert!(retryable(&Error::RecursionLimit(256)));
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared fixtures for unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cs2scope::prelude::*;
///
/// let config = InterpreterConfig::legacy();
/// assert_eq!(config.format, ScriptFormat::Legacy);
/// ```
pub mod prelude;

pub mod analysis;
pub mod interpreter;
pub mod ir;
pub mod script;
pub mod utils;

/// `cs2scope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cs2scope` Error type
///
/// Every variant is fatal for the one script being decompiled.
pub use error::Error;
