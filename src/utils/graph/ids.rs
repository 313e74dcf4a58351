//! Strongly-typed node and edge identifiers.
//!
//! Both identifiers wrap a dense `usize` index handed out by
//! [`DirectedGraph`](crate::utils::graph::DirectedGraph) in insertion order, so
//! analysis results can be stored in plain vectors indexed by
//! [`NodeId::index`] / [`EdgeId::index`].

use std::fmt;

macro_rules! graph_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Creates an identifier from a raw 0-based index.
            #[must_use]
            #[inline]
            pub const fn new(index: usize) -> Self {
                $name(index)
            }

            /// Returns the raw 0-based index.
            #[must_use]
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                $name(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

graph_id!(
    /// Identifier of a node within a [`DirectedGraph`](crate::utils::graph::DirectedGraph).
    ///
    /// Control-flow blocks, call graph scripts and dominator tree nodes are all
    /// addressed through this type.
    NodeId,
    "n"
);

graph_id!(
    /// Identifier of an edge within a [`DirectedGraph`](crate::utils::graph::DirectedGraph).
    EdgeId,
    "e"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_node_id_roundtrip_index() {
        let node = NodeId::new(42);
        assert_eq!(node.index(), 42);
        assert_eq!(usize::from(node), 42);
        assert_eq!(NodeId::from(42), node);
    }

    #[test]
    fn test_id_formatting() {
        assert_eq!(format!("{:?}", NodeId::new(3)), "NodeId(3)");
        assert_eq!(format!("{}", NodeId::new(3)), "n3");
        assert_eq!(format!("{:?}", EdgeId::new(7)), "EdgeId(7)");
        assert_eq!(format!("{}", EdgeId::new(7)), "e7");
    }

    #[test]
    fn test_ids_order_by_index() {
        let set: BTreeSet<NodeId> = [NodeId::new(5), NodeId::new(1), NodeId::new(3)]
            .into_iter()
            .collect();
        let order: Vec<usize> = set.into_iter().map(NodeId::index).collect();
        assert_eq!(order, vec![1, 3, 5]);
    }
}
