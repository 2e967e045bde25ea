#![forbid(unsafe_code)]

//! Undo-aware columnar table store.
//!
//! A [`Table`] is a record-array of named, typed columns with a metadata
//! side map keyed by column name. Every structural mutation validates
//! first, swaps in new storage, emits a [`TableEvent`], and appends the
//! inverse operation to a caller-owned undo list. [`Dataset`] wraps a table
//! with a name and an optional deferred-load hook.
//!
//! ```
//! use tabula_table::Table;
//! use tabula_undo::UndoList;
//!
//! # fn main() -> Result<(), tabula_table::TableError> {
//! let table = Table::new(3, 5, "dfd")?;
//! let mut undo = UndoList::new("trim rows");
//! table.resize(3, &mut undo)?;
//! assert_eq!(table.row_count(), 3);
//!
//! let _redo = undo.apply();
//! assert_eq!(table.row_count(), 5);
//! # Ok(())
//! # }
//! ```

pub mod column;
pub mod dataset;
pub mod error;
pub mod table;

pub use column::{Column, ColumnData, ColumnType, Designation, column_spec, parse_typecodes};
pub use dataset::{Dataset, dataset_spec};
pub use error::{Result, TableError};
pub use table::{Table, TableEvent, UndoMode};
