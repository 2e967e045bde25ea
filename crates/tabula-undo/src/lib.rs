#![forbid(unsafe_code)]

//! Undo/redo infrastructure for the Tabula data engine.
//!
//! Every mutation in the engine routes through this crate: the mutation
//! builds an [`UndoRecord`] containing the exact inverse call and appends it
//! to a caller-supplied [`UndoList`], which the caller eventually hands to a
//! [`Journal`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Journal                                 │
//! │  ┌──────────────────┐          ┌──────────────────┐             │
//! │  │   Done Stack     │          │   Undone Stack   │             │
//! │  │  ┌────────────┐  │  undo()  │  ┌────────────┐  │             │
//! │  │  │ EntryN     │  │ ──────►  │  │ Entry1     │  │             │
//! │  │  ├────────────┤  │          │  ├────────────┤  │             │
//! │  │  │ Entry1     │  │  ◄────── │  │ EntryN     │  │             │
//! │  │  └────────────┘  │  redo()  │  └────────────┘  │             │
//! │  └──────────────────┘          └──────────────────┘             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Notes
//!
//! ## Why records store closures
//!
//! A record needs to mutate its target long after the original call returned,
//! so it cannot hold a borrow. Instead the record owns a one-shot closure
//! that captured a cloneable handle to the target when the mutation ran.
//! Applying the closure performs the inverse operation and returns a *fresh*
//! record for the redo direction, so history never goes stale.
//!
//! ## Atomicity
//!
//! An [`UndoList`] is the unit the journal stores. Its children execute
//! strictly in reverse of append order, so a sequence of operations A, B, C
//! undoes as inverse(C), inverse(B), inverse(A).

pub mod journal;
pub mod list;
pub mod record;

pub use journal::{Journal, JournalConfig};
pub use list::{UndoEntry, UndoList};
pub use record::UndoRecord;
