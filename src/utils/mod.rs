//! Shared infrastructure: the generic graph library and Graphviz helpers.

mod dot;

pub mod graph;

pub use dot::escape_dot;
