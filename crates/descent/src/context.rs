//! # Context Stack
//!
//! Mutable state local to one parse attempt: a LIFO stack of slots, each
//! holding the lexeme a `context_push` pattern captured.
//!
//! ## Overview
//!
//! The context stack is what lets a grammar match balanced, paired
//! constructs: push the lexeme of an opening tag name, then require the
//! closing tag name to compare equal against the top slot. Comparison is
//! controlled by a [`SlotComparator`].
//!
//! A context is created fresh per production invocation and is never
//! shared between sibling alternatives of a choice: the engine probes
//! uncommitted branches on a clone of the stack, so a failed
//! alternative's pushes are never observable.

use smallvec::SmallVec;

/// How `context_pop` and `context_top` compare a freshly captured lexeme
/// against the slot on top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotComparator {
    /// The captured lexemes have the same length in code units.
    #[default]
    Lengthwise,
    /// The captured lexemes are identical.
    Exact,
}

impl SlotComparator {
    pub(crate) fn matches(self, slot: &[u8], fresh: &[u8]) -> bool {
        match self {
            Self::Lengthwise => slot.len() == fresh.len(),
            Self::Exact => slot == fresh,
        }
    }
}

/// Per-attempt mutable state: the named-slot stack.
#[derive(Debug, Clone, Default)]
pub struct Context {
    slots: SmallVec<[Box<[u8]>; 4]>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn push(&mut self, lexeme: &[u8]) {
        self.slots.push(lexeme.to_vec().into_boxed_slice());
    }

    pub(crate) fn top(&self) -> Option<&[u8]> {
        self.slots.last().map(AsRef::as_ref)
    }

    pub(crate) fn pop(&mut self) -> Option<Box<[u8]>> {
        self.slots.pop()
    }

    /// Discards the top slot.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty. An empty stack here is a grammar
    /// bug (a `context_drop` without a matching `context_push`), not a
    /// recoverable parse failure.
    pub(crate) fn drop_top(&mut self) {
        assert!(
            self.slots.pop().is_some(),
            "context_drop on an empty context stack"
        );
    }
}
