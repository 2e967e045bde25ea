#![forbid(unsafe_code)]

//! Dataset: a named, lazily-loadable wrapper around one table.
//!
//! # Design
//!
//! A dataset may be created with the table already in memory, or with a
//! deferred-load hook that produces the table on first access. The hook is
//! a single nullable callback invoked exactly once; it either completes or
//! fails before any read of the data proceeds, and closing the dataset
//! discards it uninvoked.

use std::cell::RefCell;
use std::rc::Rc;

use tabula_props::{CheckChain, ClassSpec, PropObject, Property, TextCheck, Value};
use tabula_undo::UndoList;
use tracing::debug;

use crate::error::{Result, TableError};
use crate::table::Table;

type Loader = Box<dyn FnOnce() -> Result<Table>>;

enum DatasetState {
    /// Table not yet produced; the hook runs on first access.
    Deferred(Loader),
    Loaded(Table),
    /// Closed or load failed; the table is detached for good.
    Closed,
}

thread_local! {
    static DATASET_SPEC: Rc<ClassSpec> = ClassSpec::builder("Dataset")
        .property(
            Property::new("key", CheckChain::single(TextCheck::new().strict()))
                .required()
                .doc("Unique dataset name within a project."),
        )
        .property(
            Property::new("label", CheckChain::single(TextCheck::new()))
                .default_value("")
                .doc("Display label."),
        )
        .build();
}

/// The shared descriptor class for dataset metadata.
#[must_use]
pub fn dataset_spec() -> Rc<ClassSpec> {
    DATASET_SPEC.with(Rc::clone)
}

/// A named table with optional deferred loading.
pub struct Dataset {
    props: PropObject,
    state: RefCell<DatasetState>,
}

impl Dataset {
    /// A dataset whose table is already in memory.
    pub fn new(key: impl Into<String>, table: Table) -> Result<Self> {
        Ok(Self {
            props: Self::new_props(key)?,
            state: RefCell::new(DatasetState::Loaded(table)),
        })
    }

    /// A dataset whose table is produced by `loader` on first access.
    pub fn deferred(
        key: impl Into<String>,
        loader: impl FnOnce() -> Result<Table> + 'static,
    ) -> Result<Self> {
        Ok(Self {
            props: Self::new_props(key)?,
            state: RefCell::new(DatasetState::Deferred(Box::new(loader))),
        })
    }

    fn new_props(key: impl Into<String>) -> Result<PropObject> {
        Ok(PropObject::with_values(
            dataset_spec(),
            [("key".to_string(), Value::Text(key.into()))],
        )?)
    }

    /// The table handle, running the deferred-load hook if it has not run
    /// yet.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::State`] on a closed dataset. A failing
    /// loader closes the dataset and propagates its error; the hook is
    /// never retried.
    pub fn table(&self) -> Result<Table> {
        let state = std::mem::replace(&mut *self.state.borrow_mut(), DatasetState::Closed);
        match state {
            DatasetState::Loaded(table) => {
                let handle = table.clone();
                *self.state.borrow_mut() = DatasetState::Loaded(table);
                Ok(handle)
            }
            DatasetState::Deferred(loader) => {
                let table = loader()?;
                debug!(
                    key = %self.key(),
                    rows = table.row_count(),
                    columns = table.column_count(),
                    "dataset loaded"
                );
                let handle = table.clone();
                *self.state.borrow_mut() = DatasetState::Loaded(table);
                Ok(handle)
            }
            DatasetState::Closed => Err(self.closed_error()),
        }
    }

    /// Whether the deferred-load hook has produced the table.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(&*self.state.borrow(), DatasetState::Loaded(_))
    }

    /// Whether the dataset has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(&*self.state.borrow(), DatasetState::Closed)
    }

    /// Detach the table and discard any pending deferred-load hook.
    ///
    /// Closing twice is a no-op.
    pub fn close(&self) {
        *self.state.borrow_mut() = DatasetState::Closed;
    }

    /// The unique dataset name.
    #[must_use]
    pub fn key(&self) -> String {
        match self.props.get("key") {
            Ok(Value::Text(key)) => key,
            _ => String::new(),
        }
    }

    /// The display label.
    #[must_use]
    pub fn label(&self) -> String {
        match self.props.get("label") {
            Ok(Value::Text(label)) => label,
            _ => String::new(),
        }
    }

    /// Set the display label, recording the inverse write.
    pub fn set_label(&self, label: impl Into<String>, undo: &mut UndoList) -> Result<()> {
        self.props
            .set_undoable("label", Value::Text(label.into()), undo)?;
        Ok(())
    }

    /// The metadata property object.
    #[must_use]
    pub fn props(&self) -> &PropObject {
        &self.props
    }

    fn closed_error(&self) -> TableError {
        TableError::state(format!("dataset `{}` is closed", self.key()))
    }
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.state.borrow() {
            DatasetState::Deferred(_) => "deferred",
            DatasetState::Loaded(_) => "loaded",
            DatasetState::Closed => "closed",
        };
        f.debug_struct("Dataset")
            .field("key", &self.key())
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn small_table() -> Table {
        Table::new(2, 3, "dl").unwrap()
    }

    #[test]
    fn eager_dataset_hands_out_the_table() {
        let ds = Dataset::new("measurements", small_table()).unwrap();
        assert!(ds.is_loaded());
        let t = ds.table().unwrap();
        assert_eq!(t.row_count(), 3);
        // Handles share the instance.
        assert!(t.same_instance(&ds.table().unwrap()));
    }

    #[test]
    fn deferred_loader_runs_exactly_once() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let ds = Dataset::deferred("lazy", move || {
            calls_clone.set(calls_clone.get() + 1);
            Ok(Table::new(1, 2, "d").unwrap())
        })
        .unwrap();

        assert!(!ds.is_loaded());
        assert_eq!(ds.table().unwrap().row_count(), 2);
        assert_eq!(ds.table().unwrap().row_count(), 2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn close_discards_the_pending_loader() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let ds = Dataset::deferred("lazy", move || {
            calls_clone.set(calls_clone.get() + 1);
            Ok(Table::new(1, 1, "d").unwrap())
        })
        .unwrap();

        ds.close();
        assert!(ds.is_closed());
        assert_eq!(calls.get(), 0);

        let err = ds.table().unwrap_err();
        assert_eq!(err.to_string(), "dataset `lazy` is closed");
    }

    #[test]
    fn failing_loader_closes_the_dataset() {
        let ds = Dataset::deferred("broken", || {
            Err(TableError::state("backing file vanished"))
        })
        .unwrap();

        assert!(ds.table().is_err());
        assert!(ds.is_closed());
        assert!(matches!(ds.table(), Err(TableError::State { .. })));
    }

    #[test]
    fn close_detaches_a_loaded_table() {
        let ds = Dataset::new("d", small_table()).unwrap();
        ds.close();
        assert!(matches!(ds.table(), Err(TableError::State { .. })));
        ds.close(); // Idempotent.
    }

    #[test]
    fn label_round_trips_through_undo() {
        let ds = Dataset::new("d", small_table()).unwrap();
        let mut list = UndoList::new("rename");
        ds.set_label("Run 1", &mut list).unwrap();
        assert_eq!(ds.label(), "Run 1");

        let _ = list.apply();
        assert_eq!(ds.label(), "");
    }
}
