#![forbid(unsafe_code)]

//! An atomically-applied ordered group of undo records.
//!
//! # Invariants
//!
//! 1. Children execute strictly in reverse of append order, so a sequence
//!    of operations A, B, C undoes as inverse(C), inverse(B), inverse(A).
//! 2. Applying a list yields the list for the opposite direction; applying
//!    that one restores the original order of effects.
//! 3. `simplify` never loses the list's description: an empty list
//!    collapses to a no-op record carrying it, and a collapsed single
//!    child is relabelled with it. History display always shows the
//!    action label, never a child record's internal description.

use crate::record::UndoRecord;

/// One element of an [`UndoList`]: either a leaf record or a nested list.
///
/// Nested lists keep their own atomicity; their children also execute in
/// reverse of append order.
#[derive(Debug)]
pub enum UndoEntry {
    /// A single reversible operation.
    Record(UndoRecord),
    /// A nested atomic group.
    List(UndoList),
}

impl UndoEntry {
    /// Human-readable description for history display.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Record(r) => r.description(),
            Self::List(l) => l.description(),
        }
    }

    /// Replace the description, keeping the operation.
    pub fn set_description(&mut self, description: impl Into<String>) {
        match self {
            Self::Record(r) => r.set_description(description),
            Self::List(l) => l.set_description(description),
        }
    }

    /// Whether applying this entry would have no effect.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Record(r) => r.is_noop(),
            Self::List(l) => l.entries.iter().all(UndoEntry::is_noop),
        }
    }

    /// Apply the entry, returning the entry for the opposite direction.
    #[must_use]
    pub fn apply(self) -> UndoEntry {
        match self {
            Self::Record(r) => Self::Record(r.apply()),
            Self::List(l) => Self::List(l.apply()),
        }
    }
}

impl From<UndoRecord> for UndoEntry {
    fn from(record: UndoRecord) -> Self {
        Self::Record(record)
    }
}

impl From<UndoList> for UndoEntry {
    fn from(list: UndoList) -> Self {
        Self::List(list)
    }
}

/// An ordered group of undo records treated as one atomic unit.
///
/// Every mutation entry point in the engine takes an explicit, caller-owned
/// `&mut UndoList`; there is no shared default list.
#[derive(Debug)]
pub struct UndoList {
    description: String,
    entries: Vec<UndoEntry>,
}

impl UndoList {
    /// Create an empty list with a description for history display.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            entries: Vec::new(),
        }
    }

    /// Append a record. Appended last means undone first.
    pub fn push(&mut self, record: UndoRecord) {
        self.entries.push(UndoEntry::Record(record));
    }

    /// Append a nested atomic group.
    pub fn push_list(&mut self, list: UndoList) {
        self.entries.push(UndoEntry::List(list));
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human-readable description for history display.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Apply all children in reverse of append order, returning the list
    /// that redoes them in original order.
    #[must_use]
    pub fn apply(self) -> UndoList {
        let mut redo = UndoList::new(self.description);
        for entry in self.entries.into_iter().rev() {
            redo.entries.push(entry.apply());
        }
        redo
    }

    /// Collapse trivial shapes.
    ///
    /// - An empty list becomes a no-op record carrying the list's
    ///   description, so callers can still label "nothing happened".
    /// - A one-element list becomes its single child, relabelled with the
    ///   list's description: the list carries the user-facing action label,
    ///   the child only its internal one. Skipped when `preserve_list` is
    ///   set (needed when the caller will keep appending for atomicity).
    /// - Anything else stays a list.
    #[must_use]
    pub fn simplify(mut self, preserve_list: bool) -> UndoEntry {
        if preserve_list {
            return UndoEntry::List(self);
        }
        match self.entries.len() {
            0 => UndoEntry::Record(UndoRecord::noop(self.description)),
            1 => {
                let mut child = self.entries.pop().expect("len checked");
                child.set_description(self.description);
                child
            }
            _ => UndoEntry::List(self),
        }
    }
}
