#![forbid(unsafe_code)]

//! Done/undone history stacks with branch-discarding redo semantics.
//!
//! # Invariants
//!
//! 1. `add_undo` clears the undone stack. Redoing after a fresh action is
//!    impossible by design; the discarded branch is unrecoverable.
//! 2. `undo`/`redo` on an empty stack are documented no-ops reported as
//!    `false`, not errors — callers poll `can_undo`/`can_redo` first.
//! 3. `done.len() <= config.max_depth` after any operation; the oldest
//!    entries are evicted first.

use tracing::debug;

use crate::list::{UndoEntry, UndoList};

/// Configuration for journal depth limiting.
#[derive(Debug, Clone, Copy)]
pub struct JournalConfig {
    /// Maximum number of entries kept on the done stack
    /// (`usize::MAX` = unlimited).
    pub max_depth: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

impl JournalConfig {
    /// Keep at most `max_depth` undoable entries.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

/// Stack-based undo/redo history.
///
/// The journal stores [`UndoEntry`] values: each `add_undo` simplifies the
/// incoming list (an empty list still lands as a labelled no-op record).
#[derive(Debug, Default)]
pub struct Journal {
    done: Vec<UndoEntry>,
    undone: Vec<UndoEntry>,
    config: JournalConfig,
}

impl Journal {
    /// Create an unbounded journal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(JournalConfig::default())
    }

    /// Create a journal with the given configuration.
    #[must_use]
    pub fn with_config(config: JournalConfig) -> Self {
        Self {
            done: Vec::new(),
            undone: Vec::new(),
            config,
        }
    }

    /// Record a completed operation.
    ///
    /// Clears the undone stack (hard branch-discard) and enforces the depth
    /// limit by evicting the oldest entries.
    pub fn add_undo(&mut self, list: UndoList) {
        self.add_entry(list.simplify(false));
    }

    /// Record a pre-simplified entry.
    pub fn add_entry(&mut self, entry: UndoEntry) {
        debug!(description = entry.description(), "journal add_undo");
        self.undone.clear();
        self.done.push(entry);
        if self.done.len() > self.config.max_depth {
            let excess = self.done.len() - self.config.max_depth;
            self.done.drain(..excess);
        }
    }

    /// Undo the most recent operation.
    ///
    /// Returns `false` if there is nothing to undo (documented no-op).
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.done.pop() else {
            return false;
        };
        debug!(description = entry.description(), "journal undo");
        self.undone.push(entry.apply());
        true
    }

    /// Redo the most recently undone operation.
    ///
    /// Returns `false` if there is nothing to redo (documented no-op).
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.undone.pop() else {
            return false;
        };
        debug!(description = entry.description(), "journal redo");
        self.done.push(entry.apply());
        true
    }

    /// Whether an undo is available. O(1).
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    /// Whether a redo is available. O(1).
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Description of the operation `undo()` would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.done.last().map(UndoEntry::description)
    }

    /// Description of the operation `redo()` would re-apply.
    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.undone.last().map(UndoEntry::description)
    }

    /// Descriptions of undoable operations, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.done
            .iter()
            .rev()
            .take(limit)
            .map(UndoEntry::description)
            .collect()
    }

    /// Descriptions of redoable operations, most recent first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undone
            .iter()
            .rev()
            .take(limit)
            .map(UndoEntry::description)
            .collect()
    }

    /// Number of undoable entries.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.done.len()
    }

    /// Number of redoable entries.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.undone.len()
    }

    /// Drop all history, both directions.
    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }
}
