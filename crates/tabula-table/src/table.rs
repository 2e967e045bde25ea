#![forbid(unsafe_code)]

//! The undo-aware columnar table engine.
//!
//! # Design
//!
//! A [`Table`] is a cloneable handle (clones share the instance) over a
//! record-array representation: an ordered field list pairing each column
//! name with its payload, plus a metadata side map **keyed by column name**.
//! Keying metadata by name rather than position means reordering fields can
//! never desynchronize a column from its designation, label, or query.
//!
//! Every structural operation follows one state machine:
//!
//! ```text
//! validate inputs → build new storage → swap → emit TableEvent
//!                                            → append inverse UndoRecord
//! ```
//!
//! Undo records capture a handle clone and apply their inverse through the
//! same internal mutation paths, so undo and redo emit change notifications
//! exactly like direct calls.
//!
//! # Invariants
//!
//! 1. All fields share one row count whenever a caller can observe the
//!    table.
//! 2. A failed operation leaves the table untouched (validation happens
//!    before any storage is built).
//! 3. Every field name has exactly one metadata entry, and vice versa.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use tabula_props::{PropObject, SignalHub, Subscription, Value};
use tabula_undo::{UndoEntry, UndoList, UndoRecord};
use tracing::debug;

use crate::column::{Column, ColumnData, ColumnType, Designation, column_spec, parse_typecodes};
use crate::error::{Result, TableError};

/// Event fired on every observable table mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// Row or column layout changed.
    Structure {
        row_count: usize,
        column_count: usize,
    },
    /// One cell changed.
    Cell { column: String, row: usize },
    /// A metadata attribute of one column changed.
    Metadata { column: String, attribute: String },
}

/// How `delete_n_rows` records its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndoMode {
    /// Snapshot the removed rows; undo restores the exact data.
    #[default]
    Snapshot,
    /// Record only the shape; undo restores zero-filled rows. Cheaper, but
    /// the removed values are gone.
    ZeroFill,
}

struct Field {
    name: String,
    data: ColumnData,
}

struct TableInner {
    fields: Vec<Field>,
    meta: AHashMap<String, PropObject>,
}

/// Cloneable handle to one table instance.
#[derive(Clone)]
pub struct Table {
    inner: Rc<RefCell<TableInner>>,
    hub: SignalHub<TableEvent>,
}

impl Table {
    /// A zero-filled table of `column_count` columns and `row_count` rows,
    /// with storage tags taken from `typecodes` (one character per column)
    /// and field names `col0`, `col1`, ...
    pub fn new(column_count: usize, row_count: usize, typecodes: &str) -> Result<Self> {
        let types = parse_typecodes(typecodes)?;
        if types.len() != column_count {
            return Err(TableError::structural(format!(
                "typecode count {} does not match column count {column_count}",
                types.len()
            )));
        }
        let mut fields = Vec::with_capacity(column_count);
        let mut meta = AHashMap::new();
        for (i, ty) in types.into_iter().enumerate() {
            let name = format!("col{i}");
            meta.insert(name.clone(), new_meta(&name)?);
            fields.push(Field {
                name,
                data: ColumnData::zeroed(ty, row_count),
            });
        }
        Ok(Self::from_inner(fields, meta))
    }

    /// A table adopting detached columns.
    ///
    /// # Errors
    ///
    /// Duplicate keys fail with [`TableError::KeyConflict`]; differing row
    /// counts fail with [`TableError::Structural`].
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut fields = Vec::with_capacity(columns.len());
        let mut meta = AHashMap::new();
        let mut row_count = None;
        for column in columns {
            let name = column.key();
            let (props, data) = column.into_parts();
            match row_count {
                None => row_count = Some(data.len()),
                Some(rows) if rows != data.len() => {
                    return Err(TableError::structural(format!(
                        "column `{name}` has {} rows, expected {rows}",
                        data.len()
                    )));
                }
                Some(_) => {}
            }
            if meta.insert(name.clone(), props).is_some() {
                return Err(TableError::key_conflict(name));
            }
            fields.push(Field { name, data });
        }
        Ok(Self::from_inner(fields, meta))
    }

    fn from_inner(fields: Vec<Field>, meta: AHashMap<String, PropObject>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TableInner { fields, meta })),
            hub: SignalHub::new(),
        }
    }

    /// Subscribe to mutation events.
    pub fn on_change(&self, callback: impl Fn(&TableEvent) + 'static) -> Subscription {
        self.hub.subscribe(callback)
    }

    /// Number of rows (zero when the table has no columns).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.inner
            .borrow()
            .fields
            .first()
            .map_or(0, |f| f.data.len())
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.inner.borrow().fields.len()
    }

    /// Field names in column order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    /// Index of the column named `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.inner.borrow().fields.iter().position(|f| f.name == name)
    }

    /// One typecode character per column, in column order. This string is
    /// the exporter's single source of truth and stays stable.
    #[must_use]
    pub fn typecodes(&self) -> String {
        self.inner
            .borrow()
            .fields
            .iter()
            .map(|f| f.data.column_type().typecode())
            .collect()
    }

    /// The storage tag of column `i`.
    pub fn column_type(&self, i: usize) -> Result<ColumnType> {
        let inner = self.inner.borrow();
        let field = field_at(&inner, i)?;
        Ok(field.data.column_type())
    }

    /// A copy of column `i`'s payload. Always a copy, never a view: the
    /// caller may mutate it freely without touching the table or any undo
    /// snapshot.
    pub fn column_data(&self, i: usize) -> Result<ColumnData> {
        let inner = self.inner.borrow();
        Ok(field_at(&inner, i)?.data.clone())
    }

    /// A detached copy of column `i`: payload and metadata, fresh identity.
    pub fn column(&self, i: usize) -> Result<Column> {
        let inner = self.inner.borrow();
        let field = field_at(&inner, i)?;
        let props = inner.meta[&field.name].copy();
        Ok(Column::from_parts(props, field.data.clone()))
    }

    /// A shared handle to the metadata properties of the column named
    /// `name`.
    pub fn column_props(&self, name: &str) -> Result<PropObject> {
        let inner = self.inner.borrow();
        inner
            .meta
            .get(name)
            .cloned()
            .ok_or_else(|| no_column(name))
    }

    /// Read one cell.
    pub fn value(&self, col: usize, row: usize) -> Result<Value> {
        let inner = self.inner.borrow();
        let field = field_at(&inner, col)?;
        field.data.value(row).ok_or_else(|| {
            TableError::structural(format!(
                "row {row} out of range (row count {})",
                field.data.len()
            ))
        })
    }

    /// Coerce and write one cell, recording the inverse write.
    pub fn set_value(
        &self,
        col: usize,
        row: usize,
        value: Value,
        undo: &mut UndoList,
    ) -> Result<()> {
        let (prior, column) = {
            let mut inner = self.inner.borrow_mut();
            let field = field_at_mut(&mut inner, col)?;
            (field.data.set_value(row, value)?, field.name.clone())
        };
        self.hub.emit(&TableEvent::Cell { column, row });
        undo.push(record_set_cell(self.clone(), col, row, prior));
        Ok(())
    }

    /// Grow or shrink to exactly `rows` rows.
    ///
    /// Shrinking deletes from row `rows` to the end; growing appends
    /// zero-filled rows; an equal size records a true no-op (callers chain
    /// these).
    pub fn resize(&self, rows: usize, undo: &mut UndoList) -> Result<()> {
        let current = self.row_count();
        if rows == current {
            undo.push(UndoRecord::noop("resize"));
            return Ok(());
        }
        if rows < current {
            self.delete_n_rows(rows, current - rows, undo)?;
        } else {
            self.insert_n_rows(current, rows - current, undo)?;
        }
        Ok(())
    }

    /// Append `rows` zero-filled rows.
    pub fn extend(&self, rows: usize, undo: &mut UndoList) -> Result<()> {
        self.insert_n_rows(self.row_count(), rows, undo)
    }

    /// Insert `n` zero-filled rows at row `i`.
    ///
    /// `i` past the current row count is a hard error, never corrected.
    pub fn insert_n_rows(&self, i: usize, n: usize, undo: &mut UndoList) -> Result<()> {
        self.check_row_insertion_point(i)?;
        let zeroes: Vec<ColumnData> = {
            let inner = self.inner.borrow();
            inner
                .fields
                .iter()
                .map(|f| ColumnData::zeroed(f.data.column_type(), n))
                .collect()
        };
        self.apply_restore_rows(i, &zeroes);
        undo.push(record_delete_rows(self.clone(), i, n, UndoMode::ZeroFill));
        Ok(())
    }

    /// Insert explicit rows at row `i`: one payload per column, matching
    /// tags, all of equal length.
    pub fn insert_rows(&self, i: usize, rows: Vec<ColumnData>, undo: &mut UndoList) -> Result<()> {
        self.check_row_insertion_point(i)?;
        let n = {
            let inner = self.inner.borrow();
            check_row_block(&inner, &rows)?
        };
        self.apply_restore_rows(i, &rows);
        undo.push(record_delete_rows(self.clone(), i, n, UndoMode::Snapshot));
        Ok(())
    }

    /// Delete up to `n` rows starting at row `i`, snapshotting the removed
    /// data for undo. Returns the removed rows, one payload per column.
    ///
    /// `n` is clamped to `row_count - i`; deleting past the end just
    /// deletes fewer rows.
    pub fn delete_n_rows(&self, i: usize, n: usize, undo: &mut UndoList) -> Result<Vec<ColumnData>> {
        self.delete_n_rows_with(i, n, UndoMode::Snapshot, undo)
    }

    /// [`Table::delete_n_rows`] with an explicit undo mode.
    pub fn delete_n_rows_with(
        &self,
        i: usize,
        n: usize,
        mode: UndoMode,
        undo: &mut UndoList,
    ) -> Result<Vec<ColumnData>> {
        let row_count = self.row_count();
        if i > row_count {
            return Err(TableError::structural(format!(
                "row {i} out of range (row count {row_count})"
            )));
        }
        let n = n.min(row_count - i);
        let removed = self.apply_delete_rows(i, n);
        match mode {
            UndoMode::Snapshot => {
                undo.push(record_restore_rows(self.clone(), i, removed.clone()));
            }
            UndoMode::ZeroFill => {
                undo.push(record_insert_zero_rows(self.clone(), i, n));
            }
        }
        Ok(removed)
    }

    /// Reorder columns so that new position `p` holds old column
    /// `order[p]`.
    ///
    /// `order` must be a full permutation of the column indices; a subset
    /// is never accepted (dropping columns goes through the removal
    /// operations).
    pub fn rearrange(&self, order: &[usize], undo: &mut UndoList) -> Result<()> {
        let column_count = self.column_count();
        if order.len() != column_count {
            return Err(TableError::structural(format!(
                "permutation length {} does not match column count {column_count}",
                order.len()
            )));
        }
        let mut seen = vec![false; column_count];
        for &k in order {
            if k >= column_count || seen[k] {
                return Err(TableError::structural(format!(
                    "order is not a permutation of 0..{column_count}"
                )));
            }
            seen[k] = true;
        }
        let mut inverse = vec![0; order.len()];
        for (pos, &k) in order.iter().enumerate() {
            inverse[k] = pos;
        }
        self.apply_rearrange(order);
        undo.push(record_rearrange(self.clone(), inverse));
        Ok(())
    }

    /// Insert copies of `source`'s columns at column `i`.
    ///
    /// Incoming names colliding with existing fields are deduplicated by
    /// auto-suffixing before any storage is built. Row counts must match
    /// unless this table has no columns yet.
    pub fn insert_columns(&self, i: usize, source: &Table, undo: &mut UndoList) -> Result<()> {
        let column_count = self.column_count();
        if i > column_count {
            return Err(TableError::structural(format!(
                "column {i} out of range (column count {column_count})"
            )));
        }
        if column_count > 0 && source.column_count() > 0 && source.row_count() != self.row_count()
        {
            return Err(TableError::structural(format!(
                "source has {} rows, expected {}",
                source.row_count(),
                self.row_count()
            )));
        }

        // Build the renamed incoming block before touching storage.
        let (mut fields, mut meta) = {
            let inner = self.inner.borrow();
            let src = source.inner.borrow();
            let mut taken: Vec<String> =
                inner.fields.iter().map(|f| f.name.clone()).collect();
            let mut fields = Vec::with_capacity(src.fields.len());
            let mut meta = Vec::with_capacity(src.fields.len());
            for field in &src.fields {
                let name = dedup_name(&field.name, &taken);
                taken.push(name.clone());
                let props = src.meta[&field.name].copy();
                if name != field.name {
                    props.set("key", Value::Text(name.clone()))?;
                }
                meta.push((name.clone(), props));
                fields.push(Field {
                    name,
                    data: field.data.clone(),
                });
            }
            (fields, meta)
        };

        let n = fields.len();
        {
            let mut inner = self.inner.borrow_mut();
            for field in fields.drain(..).rev() {
                inner.fields.insert(i, field);
            }
            inner.meta.extend(meta.drain(..));
        }
        self.emit_structure("insert_columns");
        undo.push(record_remove_columns(self.clone(), i, n));
        Ok(())
    }

    /// Detach columns `i..i + n` into an independently owned table carrying
    /// their payloads and metadata, the re-insertion payload for undo.
    ///
    /// The undo record re-attaches these exact columns: applying it moves
    /// them back and leaves the detached table empty.
    pub fn remove_n_columns(&self, i: usize, n: usize, undo: &mut UndoList) -> Result<Table> {
        let column_count = self.column_count();
        let end = i.saturating_add(n);
        if end > column_count {
            return Err(TableError::structural(format!(
                "columns {i}..{end} out of range (column count {column_count})"
            )));
        }
        let detached = self.apply_remove_columns(i, n);
        undo.push(record_insert_columns(self.clone(), i, detached.clone()));
        Ok(detached)
    }

    /// Detach the single column at `i`.
    pub fn remove_by_index(&self, i: usize, undo: &mut UndoList) -> Result<Table> {
        self.remove_n_columns(i, 1, undo)
    }

    /// The designation of the column named `name`.
    pub fn designation(&self, name: &str) -> Result<Designation> {
        match self.column_props(name)?.get("designation")? {
            Value::Text(text) => Designation::from_text(&text),
            other => Err(TableError::structural(format!(
                "designation holds non-text value {other:?}"
            ))),
        }
    }

    /// Set the designation of the column named `name`.
    pub fn set_designation(
        &self,
        name: &str,
        designation: Designation,
        undo: &mut UndoList,
    ) -> Result<()> {
        self.set_meta(name, "designation", Value::from(designation.as_str()), undo)
    }

    /// The display label of the column named `name`.
    pub fn label(&self, name: &str) -> Result<String> {
        match self.column_props(name)?.get("label")? {
            Value::Text(label) => Ok(label),
            _ => Ok(String::new()),
        }
    }

    /// Set the display label of the column named `name`.
    pub fn set_label(
        &self,
        name: &str,
        label: impl Into<String>,
        undo: &mut UndoList,
    ) -> Result<()> {
        self.set_meta(name, "label", Value::Text(label.into()), undo)
    }

    /// The optional row-filter expression of the column named `name`.
    pub fn query(&self, name: &str) -> Result<Option<String>> {
        match self.column_props(name)?.get("query")? {
            Value::Text(query) => Ok(Some(query)),
            _ => Ok(None),
        }
    }

    /// Set or clear the row-filter expression of the column named `name`.
    pub fn set_query(
        &self,
        name: &str,
        query: Option<String>,
        undo: &mut UndoList,
    ) -> Result<()> {
        let value = match query {
            Some(q) => Value::Text(q),
            None => Value::Null,
        };
        self.set_meta(name, "query", value, undo)
    }

    /// Metadata writes are wrapped so the undo path re-emits
    /// [`TableEvent::Metadata`] on this hub, not just the property object's
    /// own signal.
    fn set_meta(
        &self,
        name: &str,
        attribute: &str,
        value: Value,
        undo: &mut UndoList,
    ) -> Result<()> {
        let props = self.column_props(name)?;
        let mut restore = UndoList::new(format!("set {attribute}"));
        props.set_undoable(attribute, value, &mut restore)?;
        self.hub.emit(&TableEvent::Metadata {
            column: name.to_string(),
            attribute: attribute.to_string(),
        });
        undo.push(record_set_meta(
            self.clone(),
            name.to_string(),
            attribute.to_string(),
            restore.simplify(false),
        ));
        Ok(())
    }

    /// An independent table: copied payloads, copied metadata, fresh
    /// identity and a fresh subscriber list.
    #[must_use]
    pub fn deep_copy(&self) -> Table {
        let inner = self.inner.borrow();
        let fields = inner
            .fields
            .iter()
            .map(|f| Field {
                name: f.name.clone(),
                data: f.data.clone(),
            })
            .collect();
        let meta = inner
            .meta
            .iter()
            .map(|(name, props)| (name.clone(), props.copy()))
            .collect();
        Table::from_inner(fields, meta)
    }

    /// Whether both handles refer to the same instance.
    #[must_use]
    pub fn same_instance(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn check_row_insertion_point(&self, i: usize) -> Result<()> {
        let row_count = self.row_count();
        if self.column_count() == 0 {
            return Err(TableError::structural("table has no columns"));
        }
        if i > row_count {
            return Err(TableError::structural(format!(
                "row {i} out of range (row count {row_count})"
            )));
        }
        Ok(())
    }

    fn emit_structure(&self, op: &str) {
        let (row_count, column_count) = {
            let inner = self.inner.borrow();
            (
                inner.fields.first().map_or(0, |f| f.data.len()),
                inner.fields.len(),
            )
        };
        debug!(op, row_count, column_count, "table mutated");
        self.hub.emit(&TableEvent::Structure {
            row_count,
            column_count,
        });
    }

    // Internal mutation paths shared by direct calls and undo records.
    // These assume already-validated inputs and always emit.

    fn apply_restore_rows(&self, i: usize, rows: &[ColumnData]) {
        {
            let mut inner = self.inner.borrow_mut();
            for (field, block) in inner.fields.iter_mut().zip(rows) {
                // Tags match by construction of the snapshot.
                let _ = field.data.insert_rows(i, block);
            }
        }
        self.emit_structure("insert_rows");
    }

    fn apply_delete_rows(&self, i: usize, n: usize) -> Vec<ColumnData> {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            inner
                .fields
                .iter_mut()
                .map(|f| f.data.remove_rows(i, n))
                .collect()
        };
        self.emit_structure("delete_rows");
        removed
    }

    fn apply_rearrange(&self, order: &[usize]) {
        {
            let mut inner = self.inner.borrow_mut();
            let mut old: Vec<Option<Field>> =
                inner.fields.drain(..).map(Some).collect();
            inner.fields = order
                .iter()
                .filter_map(|&k| old[k].take())
                .collect();
        }
        self.emit_structure("rearrange");
    }

    fn apply_remove_columns(&self, i: usize, n: usize) -> Table {
        let (fields, meta) = {
            let mut inner = self.inner.borrow_mut();
            let fields: Vec<Field> = inner.fields.drain(i..i + n).collect();
            let meta = fields
                .iter()
                .filter_map(|f| inner.meta.remove(&f.name).map(|p| (f.name.clone(), p)))
                .collect();
            (fields, meta)
        };
        self.emit_structure("remove_columns");
        Table::from_inner(fields, meta)
    }

    /// Move every column of `detached` back into this table at `i`.
    ///
    /// Instances are moved, not copied, so metadata undo records targeting
    /// the original property objects stay valid across a remove/undo round
    /// trip. The detached table is empty afterwards.
    fn apply_insert_columns(&self, i: usize, detached: &Table) {
        {
            let mut inner = self.inner.borrow_mut();
            let mut src = detached.inner.borrow_mut();
            let meta = std::mem::take(&mut src.meta);
            for field in src.fields.drain(..).rev() {
                inner.fields.insert(i, field);
            }
            inner.meta.extend(meta);
        }
        self.emit_structure("insert_columns");
    }

    fn apply_set_cell(&self, col: usize, row: usize, value: Value) -> Value {
        let (prior, column) = {
            let mut inner = self.inner.borrow_mut();
            let field = &mut inner.fields[col];
            let prior = field.data.value(row).unwrap_or(Value::Undefined);
            // The value is this cell's own canonical snapshot.
            let _ = field.data.set_value(row, value);
            (prior, field.name.clone())
        };
        self.hub.emit(&TableEvent::Cell { column, row });
        prior
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        // Observable equality: column order, payloads, metadata values.
        let a = self.inner.borrow();
        let b = other.inner.borrow();
        if a.fields.len() != b.fields.len() {
            return false;
        }
        a.fields.iter().zip(&b.fields).all(|(fa, fb)| {
            fa.name == fb.name
                && fa.data == fb.data
                && a.meta[&fa.name].get_values() == b.meta[&fb.name].get_values()
        })
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Table")
            .field(
                "columns",
                &inner.fields.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            )
            .field("row_count", &inner.fields.first().map_or(0, |c| c.data.len()))
            .finish()
    }
}

fn new_meta(name: &str) -> Result<PropObject> {
    Ok(PropObject::with_values(
        column_spec(),
        [("key".to_string(), Value::Text(name.to_string()))],
    )?)
}

fn no_column(name: &str) -> TableError {
    TableError::structural(format!("no column named `{name}`"))
}

fn field_at<'a>(inner: &'a TableInner, i: usize) -> Result<&'a Field> {
    inner.fields.get(i).ok_or_else(|| {
        TableError::structural(format!(
            "column {i} out of range (column count {})",
            inner.fields.len()
        ))
    })
}

fn field_at_mut<'a>(inner: &'a mut TableInner, i: usize) -> Result<&'a mut Field> {
    let column_count = inner.fields.len();
    inner.fields.get_mut(i).ok_or_else(|| {
        TableError::structural(format!(
            "column {i} out of range (column count {column_count})"
        ))
    })
}

/// Suffix `name` with `_1`, `_2`, ... until it collides with nothing in
/// `taken`.
fn dedup_name(name: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == name) {
        return name.to_string();
    }
    let mut k = 1;
    loop {
        let candidate = format!("{name}_{k}");
        if !taken.iter().any(|t| *t == candidate) {
            return candidate;
        }
        k += 1;
    }
}

// Inverse-record constructors. Each applies through the table's internal
// mutation paths and returns the opposite-direction record.

fn record_restore_rows(table: Table, i: usize, rows: Vec<ColumnData>) -> UndoRecord {
    UndoRecord::new("restore rows", move || {
        table.apply_restore_rows(i, &rows);
        record_delete_rows(
            table.clone(),
            i,
            rows.first().map_or(0, ColumnData::len),
            UndoMode::Snapshot,
        )
    })
}

fn record_delete_rows(table: Table, i: usize, n: usize, mode: UndoMode) -> UndoRecord {
    UndoRecord::new("delete rows", move || {
        let removed = table.apply_delete_rows(i, n);
        match mode {
            UndoMode::Snapshot => record_restore_rows(table.clone(), i, removed),
            UndoMode::ZeroFill => record_insert_zero_rows(table.clone(), i, n),
        }
    })
}

fn record_insert_zero_rows(table: Table, i: usize, n: usize) -> UndoRecord {
    UndoRecord::new("restore rows", move || {
        let zeroes: Vec<ColumnData> = {
            let inner = table.inner.borrow();
            inner
                .fields
                .iter()
                .map(|f| ColumnData::zeroed(f.data.column_type(), n))
                .collect()
        };
        table.apply_restore_rows(i, &zeroes);
        record_delete_rows(table.clone(), i, n, UndoMode::ZeroFill)
    })
}

fn record_rearrange(table: Table, order: Vec<usize>) -> UndoRecord {
    UndoRecord::new("rearrange columns", move || {
        let mut inverse = vec![0; order.len()];
        for (pos, &k) in order.iter().enumerate() {
            inverse[k] = pos;
        }
        table.apply_rearrange(&order);
        record_rearrange(table.clone(), inverse)
    })
}

fn record_remove_columns(table: Table, i: usize, n: usize) -> UndoRecord {
    UndoRecord::new("remove columns", move || {
        let detached = table.apply_remove_columns(i, n);
        record_insert_columns(table.clone(), i, detached)
    })
}

fn record_insert_columns(table: Table, i: usize, detached: Table) -> UndoRecord {
    let n = detached.column_count();
    UndoRecord::new("insert columns", move || {
        table.apply_insert_columns(i, &detached);
        record_remove_columns(table.clone(), i, n)
    })
}

fn record_set_meta(
    table: Table,
    column: String,
    attribute: String,
    restore: UndoEntry,
) -> UndoRecord {
    UndoRecord::new(format!("set {attribute}"), move || {
        let inverse = restore.apply();
        table.hub.emit(&TableEvent::Metadata {
            column: column.clone(),
            attribute: attribute.clone(),
        });
        record_set_meta(table.clone(), column, attribute, inverse)
    })
}

fn record_set_cell(table: Table, col: usize, row: usize, value: Value) -> UndoRecord {
    UndoRecord::new("set cell", move || {
        let prior = table.apply_set_cell(col, row, value);
        record_set_cell(table.clone(), col, row, prior)
    })
}

fn check_row_block(inner: &TableInner, rows: &[ColumnData]) -> Result<usize> {
    if rows.len() != inner.fields.len() {
        return Err(TableError::structural(format!(
            "{} row payloads for {} columns",
            rows.len(),
            inner.fields.len()
        )));
    }
    let n = rows.first().map_or(0, ColumnData::len);
    for (field, block) in inner.fields.iter().zip(rows) {
        if block.column_type() != field.data.column_type() {
            return Err(TableError::structural(format!(
                "column `{}` is {}, payload is {}",
                field.name,
                field.data.column_type(),
                block.column_type()
            )));
        }
        if block.len() != n {
            return Err(TableError::structural(
                "row payloads have differing lengths",
            ));
        }
    }
    Ok(n)
}
