//! Type unification engine.
//!
//! Every IR value is mapped to a *typing*: an equivalence class in a union-find
//! arena. Interpretation merges the classes of values that flow into each other
//! and freezes classes to the concrete types that command signatures declare.
//! After a whole corpus has been interpreted, [`Typings::resolve`] picks the type
//! each class prints as.
//!
//! # Class contents
//!
//! A class records its [`StackType`] and the set of concrete types it was frozen
//! to. `int` is weak: any more specific integer type narrows it away. After
//! narrowing, a class holds no type, one type, or one of the compatible pairs
//! from [`Type::union`]. Everything else is a [`Error::TypeConflict`].
//!
//! # Memoised typings
//!
//! | Source | Key |
//! |--------|-----|
//! | [`Typings::of_variable`] | the [`Variable`] |
//! | [`Typings::args`] | the callee's argument locals |
//! | [`Typings::returns`] | script id and return slot |
//!
//! [`Typings::prototype`] and [`Typings::fresh`] always create a new class.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{
    ir::Variable,
    script::{Prototype, StackType, Type},
    Error, Result,
};

/// Handle of a typing class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypingId(u32);

impl TypingId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Record {
    parent: TypingId,
    rank: u8,
    stack_type: StackType,
    types: Vec<Type>,
}

/// The arena of typing classes shared by a whole interpretation run.
#[derive(Debug, Clone, Default)]
pub struct Typings {
    records: Vec<Record>,
    variables: FxHashMap<Variable, TypingId>,
    returns: FxHashMap<(i32, usize), TypingId>,
}

impl Typings {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of typing records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no typing has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Creates a new unconstrained class.
    pub fn fresh(&mut self, stack_type: StackType) -> TypingId {
        let id = TypingId(self.records.len() as u32);
        self.records.push(Record {
            parent: id,
            rank: 0,
            stack_type,
            types: Vec::new(),
        });
        id
    }

    /// Creates a new class frozen to the prototype's type.
    pub fn prototype(&mut self, prototype: Prototype) -> TypingId {
        let id = self.fresh(prototype.stack_type());
        self.records[id.index()].types.push(prototype.ty);
        id
    }

    /// Returns the typing of a variable, creating it on first use.
    pub fn of_variable(&mut self, variable: Variable) -> TypingId {
        if let Some(&id) = self.variables.get(&variable) {
            return id;
        }
        let id = self.fresh(variable.stack_type());
        self.variables.insert(variable, id);
        id
    }

    /// Returns the typing of a variable if it has one.
    #[must_use]
    pub fn variable(&self, variable: Variable) -> Option<TypingId> {
        self.variables.get(&variable).copied()
    }

    /// Returns the typings of a script's arguments.
    ///
    /// Arguments are the lowest locals of their stack type, so the n-th integer
    /// argument shares its class with `$int{n}` inside the callee.
    pub fn args(&mut self, script: i32, stack_types: &[StackType]) -> Vec<TypingId> {
        let mut ints = 0;
        let mut strings = 0;
        stack_types
            .iter()
            .map(|&stack_type| {
                let counter = match stack_type {
                    StackType::Int => &mut ints,
                    StackType::String => &mut strings,
                };
                let index = *counter;
                *counter += 1;
                self.of_variable(Variable::Local {
                    script,
                    index,
                    stack_type,
                })
            })
            .collect()
    }

    /// Returns the typings of a script's return slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeConflict`] if a slot was first requested with a
    /// different stack type.
    pub fn returns(&mut self, script: i32, stack_types: &[StackType]) -> Result<Vec<TypingId>> {
        let mut typings = Vec::with_capacity(stack_types.len());
        for (slot, &stack_type) in stack_types.iter().enumerate() {
            let id = match self.returns.get(&(script, slot)) {
                Some(&id) => id,
                None => {
                    let id = self.fresh(stack_type);
                    self.returns.insert((script, slot), id);
                    id
                }
            };
            let existing = self.stack_type(id);
            if existing != stack_type {
                return Err(Error::TypeConflict {
                    left: format!("return {slot} of script {script} ({existing})"),
                    right: stack_type.to_string(),
                });
            }
            typings.push(id);
        }
        Ok(typings)
    }

    /// Finds the representative of a class without modifying the arena.
    #[must_use]
    pub fn find(&self, mut id: TypingId) -> TypingId {
        while let Some(record) = self.records.get(id.index()) {
            if record.parent == id {
                break;
            }
            id = record.parent;
        }
        id
    }

    fn find_compress(&mut self, id: TypingId) -> TypingId {
        let root = self.find(id);
        let mut current = id;
        while current != root {
            let next = self.records[current.index()].parent;
            self.records[current.index()].parent = root;
            current = next;
        }
        root
    }

    /// Returns `true` if two typings are in the same class.
    #[must_use]
    pub fn same_class(&self, a: TypingId, b: TypingId) -> bool {
        self.find(a) == self.find(b)
    }

    /// Returns the stack type of a class.
    #[must_use]
    pub fn stack_type(&self, id: TypingId) -> StackType {
        self.records
            .get(self.find(id).index())
            .map_or(StackType::Int, |r| r.stack_type)
    }

    /// Returns the concrete types a class is frozen to, after narrowing.
    #[must_use]
    pub fn types(&self, id: TypingId) -> &[Type] {
        self.records
            .get(self.find(id).index())
            .map_or(&[], |r| r.types.as_slice())
    }

    /// Pins a class to a concrete type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeConflict`] if the type lives on another stack or is
    /// incompatible with the types the class already holds.
    pub fn freeze(&mut self, id: TypingId, ty: Type) -> Result<()> {
        let root = self.find_compress(id);
        let record = &self.records[root.index()];
        if record.stack_type != ty.stack_type() {
            return Err(Error::TypeConflict {
                left: describe(record.stack_type, &record.types),
                right: ty.to_string(),
            });
        }
        if record.types.contains(&ty) {
            return Ok(());
        }

        let mut types = record.types.clone();
        types.push(ty);
        let types = narrow(types).ok_or_else(|| Error::TypeConflict {
            left: describe(record.stack_type, &record.types),
            right: ty.to_string(),
        })?;
        self.records[root.index()].types = types;
        Ok(())
    }

    /// Unions two classes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeConflict`] if the classes live on different stacks or
    /// their concrete types are incompatible. Neither class changes on error.
    pub fn merge(&mut self, a: TypingId, b: TypingId) -> Result<()> {
        let a = self.find_compress(a);
        let b = self.find_compress(b);
        if a == b {
            return Ok(());
        }

        let (left, right) = (&self.records[a.index()], &self.records[b.index()]);
        let conflict = || Error::TypeConflict {
            left: describe(left.stack_type, &left.types),
            right: describe(right.stack_type, &right.types),
        };
        if left.stack_type != right.stack_type {
            return Err(conflict());
        }

        let mut types = left.types.clone();
        for ty in &right.types {
            if !types.contains(ty) {
                types.push(*ty);
            }
        }
        let types = narrow(types).ok_or_else(conflict)?;

        // Union by rank.
        let (root, child) = if left.rank >= right.rank { (a, b) } else { (b, a) };
        if self.records[root.index()].rank == self.records[child.index()].rank {
            self.records[root.index()].rank = self.records[root.index()].rank.saturating_add(1);
        }
        self.records[child.index()].parent = root;
        self.records[child.index()].types.clear();
        self.records[root.index()].types = types;
        Ok(())
    }

    /// Unifies the operands of a comparison.
    ///
    /// A comparison produces no value, but both sides must hold the same type.
    ///
    /// # Errors
    ///
    /// See [`Typings::merge`].
    pub fn compare(&mut self, a: TypingId, b: TypingId) -> Result<()> {
        self.merge(a, b)
    }

    /// Unifies each definition typing with the matching expression typing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeConflict`] on a length mismatch or an incompatible pair.
    pub fn assign(&mut self, definitions: &[TypingId], expressions: &[TypingId]) -> Result<()> {
        if definitions.len() != expressions.len() {
            return Err(Error::TypeConflict {
                left: format!("{} definitions", definitions.len()),
                right: format!("{} values", expressions.len()),
            });
        }
        for (&def, &expr) in definitions.iter().zip(expressions) {
            self.merge(def, expr)?;
        }
        Ok(())
    }

    /// Returns the type a class prints as.
    ///
    /// An unconstrained class takes its stack's default type, a single type is
    /// itself, and a compatible pair resolves to its union.
    #[must_use]
    pub fn resolve(&self, id: TypingId) -> Type {
        match self.types(id) {
            [] => self.stack_type(id).default_type(),
            [ty] => *ty,
            [a, b, ..] => Type::union(*a, *b).unwrap_or(*a),
        }
    }

    /// Returns the tightest type every member of a class satisfies.
    #[must_use]
    pub fn intersection(&self, id: TypingId) -> Type {
        match self.types(id) {
            [a, b, ..] => Type::intersection(*a, *b).unwrap_or(*a),
            _ => self.resolve(id),
        }
    }
}

/// Drops weak `int` next to a specific type and rejects incompatible sets.
fn narrow(mut types: Vec<Type>) -> Option<Vec<Type>> {
    if types.len() > 1 {
        types.retain(|&ty| ty != Type::Int);
    }
    match types.as_slice() {
        [] | [_] => Some(types),
        [a, b] if Type::union(*a, *b).is_some() => {
            types.sort();
            Some(types)
        }
        _ => None,
    }
}

fn describe(stack_type: StackType, types: &[Type]) -> String {
    match types {
        [] => stack_type.to_string(),
        [ty] => ty.to_string(),
        _ => {
            let names: Vec<&str> = types.iter().map(|t| t.literal()).collect();
            format!("{{{}}}", names.join(", "))
        }
    }
}
