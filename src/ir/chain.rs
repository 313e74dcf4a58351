//! Order-preserving instruction sequence with O(1) insertion.
//!
//! Labels are only known once every jump has been seen, so they are inserted
//! into the middle of an already built sequence. [`InstructionChain`] is a
//! doubly-linked list stored in an arena: every instruction keeps a stable
//! [`InsnId`] across insertions and removals.

use std::fmt;

use crate::{ir::Instruction, Result};

/// Stable handle of an instruction inside an [`InstructionChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InsnId(usize);

impl InsnId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Link {
    insn: Option<Instruction>,
    prev: Option<InsnId>,
    next: Option<InsnId>,
}

/// A doubly-linked list of instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionChain {
    links: Vec<Link>,
    head: Option<InsnId>,
    tail: Option<InsnId>,
    len: usize,
}

impl InstructionChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty chain with room for `capacity` instructions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        InstructionChain {
            links: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the number of live instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the chain holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first instruction id.
    #[must_use]
    pub fn first(&self) -> Option<InsnId> {
        self.head
    }

    /// Returns the last instruction id.
    #[must_use]
    pub fn last(&self) -> Option<InsnId> {
        self.tail
    }

    fn link(&self, id: InsnId) -> Option<&Link> {
        self.links.get(id.0).filter(|l| l.insn.is_some())
    }

    /// Returns the instruction behind an id, if it is still in the chain.
    #[must_use]
    pub fn get(&self, id: InsnId) -> Option<&Instruction> {
        self.links.get(id.0).and_then(|l| l.insn.as_ref())
    }

    /// Returns the instruction behind an id mutably.
    pub fn get_mut(&mut self, id: InsnId) -> Option<&mut Instruction> {
        self.links.get_mut(id.0).and_then(|l| l.insn.as_mut())
    }

    /// Returns the id following `id`.
    #[must_use]
    pub fn next(&self, id: InsnId) -> Option<InsnId> {
        self.link(id).and_then(|l| l.next)
    }

    /// Returns the id preceding `id`.
    #[must_use]
    pub fn prev(&self, id: InsnId) -> Option<InsnId> {
        self.link(id).and_then(|l| l.prev)
    }

    /// Appends an instruction.
    pub fn push_back(&mut self, insn: Instruction) -> InsnId {
        let id = InsnId(self.links.len());
        self.links.push(Link {
            insn: Some(insn),
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.links[tail.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Inserts an instruction immediately before `at`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if `at` is not in the chain.
    pub fn insert_before(&mut self, at: InsnId, insn: Instruction) -> Result<InsnId> {
        let prev = match self.link(at) {
            Some(link) => link.prev,
            None => return Err(malformed_error!("Instruction {} is not in the chain", at.0)),
        };

        let id = InsnId(self.links.len());
        self.links.push(Link {
            insn: Some(insn),
            prev,
            next: Some(at),
        });
        self.links[at.0].prev = Some(id);
        match prev {
            Some(prev) => self.links[prev.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.len += 1;
        Ok(id)
    }

    /// Unlinks an instruction and returns it.
    pub fn remove(&mut self, id: InsnId) -> Option<Instruction> {
        let link = self.links.get_mut(id.0)?;
        let insn = link.insn.take()?;
        let (prev, next) = (link.prev.take(), link.next.take());

        match prev {
            Some(prev) => self.links[prev.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.links[next.0].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        Some(insn)
    }

    /// Iterates instructions in order.
    #[must_use]
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Iterates the ids of all instructions in order.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = InsnId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Iterates the instructions without their ids.
    pub fn instructions(&self) -> impl DoubleEndedIterator<Item = &Instruction> + '_ {
        self.iter().map(|(_, insn)| insn)
    }
}

impl FromIterator<Instruction> for InstructionChain {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        let mut chain = InstructionChain::new();
        for insn in iter {
            chain.push_back(insn);
        }
        chain
    }
}

impl<'a> IntoIterator for &'a InstructionChain {
    type Item = (InsnId, &'a Instruction);
    type IntoIter = ChainIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended iterator over an [`InstructionChain`].
pub struct ChainIter<'a> {
    chain: &'a InstructionChain,
    front: Option<InsnId>,
    back: Option<InsnId>,
    remaining: usize,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (InsnId, &'a Instruction);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        let link = self.chain.link(id)?;
        self.front = link.next;
        self.remaining -= 1;
        link.insn.as_ref().map(|insn| (id, insn))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for ChainIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        let link = self.chain.link(id)?;
        self.back = link.prev;
        self.remaining -= 1;
        link.insn.as_ref().map(|insn| (id, insn))
    }
}

impl ExactSizeIterator for ChainIter<'_> {}

impl fmt::Display for InstructionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for insn in self.instructions() {
            writeln!(f, "{insn}")?;
        }
        Ok(())
    }
}
