#![forbid(unsafe_code)]

//! Tabula: the data core of a plotting application, as a library.
//!
//! Three tightly-coupled pieces:
//!
//! - **Properties** ([`tabula_props`]): typed, self-validating attributes
//!   with canonical storage, lazy defaults, and per-object change signals.
//! - **Undo** ([`tabula_undo`]): one-shot inverse-operation records,
//!   atomic record groups, and a done/undone journal with branch-discard
//!   redo semantics.
//! - **Table** ([`tabula_table`]): an undo-aware columnar store whose
//!   column metadata is keyed by name, so reordering never desynchronizes
//!   data from its designation.
//!
//! ```
//! use tabula::prelude::*;
//!
//! # fn main() -> tabula::Result<()> {
//! let table = Table::new(2, 4, "dd")?;
//! let mut journal = Journal::new();
//!
//! let mut list = UndoList::new("resize to 8 rows");
//! table.resize(8, &mut list)?;
//! journal.add_undo(list);
//!
//! assert!(journal.undo());
//! assert_eq!(table.row_count(), 4);
//! assert!(journal.redo());
//! assert_eq!(table.row_count(), 8);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub use tabula_props::{
    BoolCheck, Check, CheckChain, CheckError, ChoiceCheck, ClassSpec, ClassSpecBuilder,
    FloatCheck, IntCheck, KindCheck, MappingCheck, PropEvent, PropObject, Property, RegexCheck,
    SignalHub, Subscription, TextCheck, TypedList, TypedMap, ValidationError, Value, ValueKind,
};
pub use tabula_table::{
    Column, ColumnData, ColumnType, Dataset, Designation, Table, TableError, TableEvent,
    UndoMode, column_spec, dataset_spec, parse_typecodes,
};
pub use tabula_undo::{Journal, JournalConfig, UndoEntry, UndoList, UndoRecord};

/// Top-level error wrapping the crate errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Top-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The types most callers need.
pub mod prelude {
    pub use tabula_props::{
        Check, CheckChain, ChoiceCheck, ClassSpec, FloatCheck, IntCheck, PropObject, Property,
        TextCheck, Value,
    };
    pub use tabula_table::{
        Column, ColumnData, ColumnType, Dataset, Designation, Table, UndoMode,
    };
    pub use tabula_undo::{Journal, UndoList, UndoRecord};
}
