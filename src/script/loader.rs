//! Loader interfaces for the external collaborators.
//!
//! Decoding the script container format and the param/db-table definitions is
//! outside this crate. The interpreter only sees these two traits, so any
//! backing store works: an in-memory map, a cache reader, a test fixture.

use std::{collections::BTreeMap, sync::Arc};

use rustc_hash::FxHashMap;

use crate::script::{Prototype, Script};

/// Keyed access to the script corpus.
pub trait ScriptLoader: Sync {
    /// Returns the script with the given id.
    fn script(&self, id: i32) -> Option<Arc<Script>>;

    /// Returns every known script id, in ascending order.
    fn script_ids(&self) -> Vec<i32>;
}

/// Declared prototypes of dynamically-typed keys.
pub trait PrototypeLoader: Sync {
    /// Returns the value prototype of a param id.
    fn param(&self, id: i32) -> Option<Prototype>;

    /// Returns the tuple prototypes of a db-column id.
    fn db_column(&self, id: i32) -> Option<Vec<Prototype>>;
}

/// An in-memory [`ScriptLoader`].
#[derive(Debug, Clone, Default)]
pub struct ScriptMap {
    scripts: BTreeMap<i32, Arc<Script>>,
}

impl ScriptMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a script.
    pub fn insert(&mut self, id: i32, script: Script) {
        self.scripts.insert(id, Arc::new(script));
    }

    /// Returns the number of scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Returns `true` if the map holds no scripts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl FromIterator<(i32, Script)> for ScriptMap {
    fn from_iter<T: IntoIterator<Item = (i32, Script)>>(iter: T) -> Self {
        let mut map = ScriptMap::new();
        for (id, script) in iter {
            map.insert(id, script);
        }
        map
    }
}

impl ScriptLoader for ScriptMap {
    fn script(&self, id: i32) -> Option<Arc<Script>> {
        self.scripts.get(&id).cloned()
    }

    fn script_ids(&self) -> Vec<i32> {
        self.scripts.keys().copied().collect()
    }
}

/// An in-memory [`PrototypeLoader`]. The default instance knows no keys.
#[derive(Debug, Clone, Default)]
pub struct PrototypeMap {
    params: FxHashMap<i32, Prototype>,
    db_columns: FxHashMap<i32, Vec<Prototype>>,
}

impl PrototypeMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the value prototype of a param.
    #[must_use]
    pub fn with_param(mut self, id: i32, prototype: Prototype) -> Self {
        self.params.insert(id, prototype);
        self
    }

    /// Declares the tuple prototypes of a db column.
    #[must_use]
    pub fn with_db_column(mut self, id: i32, prototypes: Vec<Prototype>) -> Self {
        self.db_columns.insert(id, prototypes);
        self
    }
}

impl PrototypeLoader for PrototypeMap {
    fn param(&self, id: i32) -> Option<Prototype> {
        self.params.get(&id).copied()
    }

    fn db_column(&self, id: i32) -> Option<Vec<Prototype>> {
        self.db_columns.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{prototype, StackType};

    #[test]
    fn test_script_map_ids_sorted() {
        let map: ScriptMap = [
            (9, Script::new(vec![], vec![], 0, 0, vec![])),
            (2, Script::new(vec![], vec![], 0, 0, vec![StackType::Int])),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert_eq!(map.script_ids(), vec![2, 9]);
        assert_eq!(map.script(2).map(|s| s.return_types.len()), Some(1));
        assert!(map.script(3).is_none());
    }

    #[test]
    fn test_prototype_map() {
        let map = PrototypeMap::new()
            .with_param(5, prototype::OBJ)
            .with_db_column(70, vec![prototype::STRING, prototype::INT]);

        assert_eq!(map.param(5), Some(prototype::OBJ));
        assert_eq!(map.param(6), None);
        assert_eq!(map.db_column(70).map(|c| c.len()), Some(2));
    }
}
