#![forbid(unsafe_code)]

//! A single reversible operation.
//!
//! # Invariants
//!
//! - Applying a record returns its target to the exact prior observable
//!   state and yields the record for the opposite direction.
//! - A record is one-shot: `apply()` consumes it.
//! - A no-op record applies to another no-op record, so callers can chain
//!   "nothing happened" entries without special cases.

/// A reversible operation plus the closure needed to reverse it.
///
/// The closure captured a cloneable handle to its target when the original
/// mutation ran. Applying the record executes the inverse operation and
/// returns the redo record produced by that execution.
pub struct UndoRecord {
    description: String,
    apply: Option<Box<dyn FnOnce() -> UndoRecord>>,
}

impl UndoRecord {
    /// Create a record whose closure performs the inverse operation and
    /// returns the record for the opposite direction.
    #[must_use]
    pub fn new(description: impl Into<String>, apply: impl FnOnce() -> UndoRecord + 'static) -> Self {
        Self {
            description: description.into(),
            apply: Some(Box::new(apply)),
        }
    }

    /// Create a record that does nothing when applied.
    ///
    /// Used for operations that are semantically recorded but have no
    /// effect, e.g. resizing a table to its current size. Applying a no-op
    /// yields another no-op with the same description.
    #[must_use]
    pub fn noop(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            apply: None,
        }
    }

    /// Whether this record has no effect when applied.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.apply.is_none()
    }

    /// Human-readable description for history display.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description, keeping the operation.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Execute the inverse operation, consuming the record.
    ///
    /// Returns the record that redoes what this application just undid.
    #[must_use]
    pub fn apply(self) -> UndoRecord {
        match self.apply {
            Some(f) => f(),
            None => UndoRecord::noop(self.description),
        }
    }
}

impl std::fmt::Debug for UndoRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoRecord")
            .field("description", &self.description)
            .field("noop", &self.is_noop())
            .finish()
    }
}
