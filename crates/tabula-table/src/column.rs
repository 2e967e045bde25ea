#![forbid(unsafe_code)]

//! Column model: storage tags, payload arrays, and the column descriptor
//! class.
//!
//! # Design
//!
//! Storage representation is a closed tagged variant, never a parsed type
//! string: [`ColumnType`] carries the exhaustive tag set and the stable
//! one-character typecode mapping exporters read back. [`ColumnData`] is the
//! owned payload; every structural edit builds fresh backing storage so an
//! undo snapshot can never alias live data.
//!
//! # Invariants
//!
//! - The typecode mapping (`'f'`, `'d'`, `'i'`, `'l'`, `'s'`) is a stable
//!   external contract; changing it breaks round-tripping through the
//!   serialization collaborator.
//! - A payload's tag never changes after creation; cell writes coerce the
//!   incoming value to the tag's representation or fail.

use std::rc::Rc;

use tabula_props::{
    CheckChain, ChoiceCheck, ClassSpec, PropObject, Property, TextCheck, ValidationError, Value,
};

use crate::error::{Result, TableError};

/// Storage representation tag for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnType {
    F32,
    F64,
    I32,
    I64,
    Text,
}

impl ColumnType {
    /// The one-character typecode exporters persist.
    #[must_use]
    pub fn typecode(self) -> char {
        match self {
            Self::F32 => 'f',
            Self::F64 => 'd',
            Self::I32 => 'i',
            Self::I64 => 'l',
            Self::Text => 's',
        }
    }

    /// Parse a single typecode.
    pub fn from_typecode(code: char) -> Result<Self> {
        match code {
            'f' => Ok(Self::F32),
            'd' => Ok(Self::F64),
            'i' => Ok(Self::I32),
            'l' => Ok(Self::I64),
            's' => Ok(Self::Text),
            other => Err(TableError::structural(format!(
                "unknown typecode `{other}` (expected one of f, d, i, l, s)"
            ))),
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Text => "text",
        })
    }
}

/// Parse a typecode string like `"dfd"` into one tag per column.
pub fn parse_typecodes(codes: &str) -> Result<Vec<ColumnType>> {
    codes.chars().map(ColumnType::from_typecode).collect()
}

/// The semantic role of a column for downstream plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Designation {
    X,
    Y,
    XY,
    XErr,
    YErr,
    Label,
}

impl Designation {
    /// All designations, in canonical listing order.
    pub const ALL: [Designation; 6] = [
        Self::X,
        Self::Y,
        Self::XY,
        Self::XErr,
        Self::YErr,
        Self::Label,
    ];

    /// The canonical text form stored in the property layer.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::XY => "XY",
            Self::XErr => "XERR",
            Self::YErr => "YERR",
            Self::Label => "LABEL",
        }
    }

    /// Parse the canonical text form.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == text)
            .ok_or_else(|| {
                TableError::structural(format!("unknown designation `{text}`"))
            })
    }

    /// The closed choice check backing property-level validation.
    #[must_use]
    pub fn check_chain() -> CheckChain {
        CheckChain::single(ChoiceCheck::text(Self::ALL.map(Designation::as_str)))
    }
}

impl std::fmt::Display for Designation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned payload array for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    Text(Vec<String>),
}

impl ColumnData {
    /// A zero-filled payload of `rows` rows.
    #[must_use]
    pub fn zeroed(column_type: ColumnType, rows: usize) -> Self {
        match column_type {
            ColumnType::F32 => Self::F32(vec![0.0; rows]),
            ColumnType::F64 => Self::F64(vec![0.0; rows]),
            ColumnType::I32 => Self::I32(vec![0; rows]),
            ColumnType::I64 => Self::I64(vec![0; rows]),
            ColumnType::Text => Self::Text(vec![String::new(); rows]),
        }
    }

    /// The payload's storage tag.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::F32(_) => ColumnType::F32,
            Self::F64(_) => ColumnType::F64,
            Self::I32(_) => ColumnType::I32,
            Self::I64(_) => ColumnType::I64,
            Self::Text(_) => ColumnType::Text,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// Whether the payload has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Truncate or zero-extend to exactly `rows` rows, rebuilding storage.
    pub fn resize_zero_filled(&mut self, rows: usize) {
        fn rebuild<T: Clone + Default>(v: &Vec<T>, rows: usize) -> Vec<T> {
            let mut out = Vec::with_capacity(rows);
            out.extend_from_slice(&v[..v.len().min(rows)]);
            out.resize(rows, T::default());
            out
        }
        match self {
            Self::F32(v) => *v = rebuild(v, rows),
            Self::F64(v) => *v = rebuild(v, rows),
            Self::I32(v) => *v = rebuild(v, rows),
            Self::I64(v) => *v = rebuild(v, rows),
            Self::Text(v) => *v = rebuild(v, rows),
        }
    }

    /// Copy rows `i..i + n` into a new payload.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the row count; callers clamp first.
    #[must_use]
    pub fn slice_rows(&self, i: usize, n: usize) -> Self {
        match self {
            Self::F32(v) => Self::F32(v[i..i + n].to_vec()),
            Self::F64(v) => Self::F64(v[i..i + n].to_vec()),
            Self::I32(v) => Self::I32(v[i..i + n].to_vec()),
            Self::I64(v) => Self::I64(v[i..i + n].to_vec()),
            Self::Text(v) => Self::Text(v[i..i + n].to_vec()),
        }
    }

    /// Remove rows `i..i + n`, returning the removed payload.
    ///
    /// Storage is rebuilt, not spliced in place.
    pub fn remove_rows(&mut self, i: usize, n: usize) -> Self {
        fn split<T: Clone>(v: &Vec<T>, i: usize, n: usize) -> (Vec<T>, Vec<T>) {
            let mut kept = Vec::with_capacity(v.len() - n);
            kept.extend_from_slice(&v[..i]);
            kept.extend_from_slice(&v[i + n..]);
            (kept, v[i..i + n].to_vec())
        }
        match self {
            Self::F32(v) => {
                let (kept, removed) = split(v, i, n);
                *v = kept;
                Self::F32(removed)
            }
            Self::F64(v) => {
                let (kept, removed) = split(v, i, n);
                *v = kept;
                Self::F64(removed)
            }
            Self::I32(v) => {
                let (kept, removed) = split(v, i, n);
                *v = kept;
                Self::I32(removed)
            }
            Self::I64(v) => {
                let (kept, removed) = split(v, i, n);
                *v = kept;
                Self::I64(removed)
            }
            Self::Text(v) => {
                let (kept, removed) = split(v, i, n);
                *v = kept;
                Self::Text(removed)
            }
        }
    }

    /// Insert `rows` at index `i`, rebuilding storage.
    ///
    /// # Errors
    ///
    /// Fails if the inserted payload's tag differs from this payload's.
    pub fn insert_rows(&mut self, i: usize, rows: &ColumnData) -> Result<()> {
        fn join<T: Clone>(v: &Vec<T>, i: usize, inserted: &[T]) -> Vec<T> {
            let mut out = Vec::with_capacity(v.len() + inserted.len());
            out.extend_from_slice(&v[..i]);
            out.extend_from_slice(inserted);
            out.extend_from_slice(&v[i..]);
            out
        }
        match (&mut *self, rows) {
            (Self::F32(v), Self::F32(r)) => *v = join(v, i, r),
            (Self::F64(v), Self::F64(r)) => *v = join(v, i, r),
            (Self::I32(v), Self::I32(r)) => *v = join(v, i, r),
            (Self::I64(v), Self::I64(r)) => *v = join(v, i, r),
            (Self::Text(v), Self::Text(r)) => *v = join(v, i, r),
            (slot, rows) => {
                return Err(TableError::structural(format!(
                    "cannot insert {} rows into a {} column",
                    rows.column_type(),
                    slot.column_type()
                )));
            }
        }
        Ok(())
    }

    /// Insert `n` zero-filled rows at index `i`.
    pub fn insert_zeroed(&mut self, i: usize, n: usize) {
        let zeroes = Self::zeroed(self.column_type(), n);
        // Tags match by construction.
        let _ = self.insert_rows(i, &zeroes);
    }

    /// Read one cell as a dynamic value.
    #[must_use]
    pub fn value(&self, row: usize) -> Option<Value> {
        if row >= self.len() {
            return None;
        }
        Some(match self {
            Self::F32(v) => Value::Float(f64::from(v[row])),
            Self::F64(v) => Value::Float(v[row]),
            Self::I32(v) => Value::Int(i64::from(v[row])),
            Self::I64(v) => Value::Int(v[row]),
            Self::Text(v) => Value::Text(v[row].clone()),
        })
    }

    /// Coerce and write one cell, returning the prior value.
    ///
    /// # Errors
    ///
    /// Fails if `value` cannot be represented under this payload's tag, or
    /// if `row` is out of range.
    pub fn set_value(&mut self, row: usize, value: Value) -> Result<Value> {
        if row >= self.len() {
            return Err(TableError::structural(format!(
                "row {row} out of range (row count {})",
                self.len()
            )));
        }
        let prior = match self {
            Self::F32(v) => {
                let new = coerce_float(&value)? as f32;
                Value::Float(f64::from(std::mem::replace(&mut v[row], new)))
            }
            Self::F64(v) => {
                let new = coerce_float(&value)?;
                Value::Float(std::mem::replace(&mut v[row], new))
            }
            Self::I32(v) => {
                let new = coerce_int(&value)?;
                let new = i32::try_from(new).map_err(|_| {
                    TableError::structural(format!("{new} does not fit a 32-bit integer column"))
                })?;
                Value::Int(i64::from(std::mem::replace(&mut v[row], new)))
            }
            Self::I64(v) => {
                let new = coerce_int(&value)?;
                Value::Int(std::mem::replace(&mut v[row], new))
            }
            Self::Text(v) => {
                let new = match &value {
                    Value::Text(s) => s.clone(),
                    Value::Bool(_) | Value::Int(_) | Value::Float(_) => value.to_string(),
                    other => {
                        return Err(cell_error(other, ColumnType::Text));
                    }
                };
                Value::Text(std::mem::replace(&mut v[row], new))
            }
        };
        Ok(prior)
    }
}

fn coerce_float(value: &Value) -> Result<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| cell_error(value, ColumnType::F64)),
        other => Err(cell_error(other, ColumnType::F64)),
    }
}

fn coerce_int(value: &Value) -> Result<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| cell_error(value, ColumnType::I64)),
        other => Err(cell_error(other, ColumnType::I64)),
    }
}

fn cell_error(value: &Value, target: ColumnType) -> TableError {
    TableError::structural(format!("cannot store {value} in a {target} column"))
}

thread_local! {
    static COLUMN_SPEC: Rc<ClassSpec> = ClassSpec::builder("Column")
        .property(
            Property::new("key", CheckChain::single(TextCheck::new().strict()))
                .required()
                .doc("Unique field name within the parent table."),
        )
        .property(
            Property::new("designation", Designation::check_chain())
                .default_value(Designation::Y.as_str())
                .doc("Semantic role of the column for plotting."),
        )
        .property(
            Property::new("label", CheckChain::single(TextCheck::new()))
                .default_value("")
                .doc("Display label shown in legends and headers."),
        )
        .property(
            Property::new("query", CheckChain::single(TextCheck::new().strict()).nullable())
                .default_value(Value::Null)
                .doc("Optional row-filter expression."),
        )
        .build();
}

/// The shared descriptor class for column metadata.
#[must_use]
pub fn column_spec() -> Rc<ClassSpec> {
    COLUMN_SPEC.with(Rc::clone)
}

/// One field of tabular data: metadata properties plus the owned payload.
///
/// A detached column is an independent copy; attaching it to a table moves
/// ownership of the payload into the table.
#[derive(Debug)]
pub struct Column {
    props: PropObject,
    data: ColumnData,
}

impl Column {
    /// A zero-filled column.
    pub fn new(
        key: impl Into<String>,
        column_type: ColumnType,
        rows: usize,
    ) -> std::result::Result<Self, ValidationError> {
        Self::from_data(key, ColumnData::zeroed(column_type, rows))
    }

    /// A column wrapping an existing payload.
    pub fn from_data(
        key: impl Into<String>,
        data: ColumnData,
    ) -> std::result::Result<Self, ValidationError> {
        let props = PropObject::with_values(
            column_spec(),
            [("key".to_string(), Value::Text(key.into()))],
        )?;
        Ok(Self { props, data })
    }

    pub(crate) fn from_parts(props: PropObject, data: ColumnData) -> Self {
        Self { props, data }
    }

    /// The unique field name.
    #[must_use]
    pub fn key(&self) -> String {
        match self.props.get("key") {
            Ok(Value::Text(key)) => key,
            _ => String::new(),
        }
    }

    /// The semantic role.
    pub fn designation(&self) -> Result<Designation> {
        match self.props.get("designation")? {
            Value::Text(text) => Designation::from_text(&text),
            other => Err(TableError::structural(format!(
                "designation holds non-text value {other:?}"
            ))),
        }
    }

    /// Set the semantic role.
    pub fn set_designation(&self, designation: Designation) -> Result<()> {
        self.props
            .set("designation", Value::from(designation.as_str()))?;
        Ok(())
    }

    /// The display label.
    #[must_use]
    pub fn label(&self) -> String {
        match self.props.get("label") {
            Ok(Value::Text(label)) => label,
            _ => String::new(),
        }
    }

    /// Set the display label.
    pub fn set_label(&self, label: impl Into<String>) -> Result<()> {
        self.props.set("label", Value::Text(label.into()))?;
        Ok(())
    }

    /// The optional row-filter expression.
    #[must_use]
    pub fn query(&self) -> Option<String> {
        match self.props.get("query") {
            Ok(Value::Text(query)) => Some(query),
            _ => None,
        }
    }

    /// The metadata property object.
    #[must_use]
    pub fn props(&self) -> &PropObject {
        &self.props
    }

    /// The payload's storage tag.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the payload.
    #[must_use]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Mutably borrow the payload.
    pub fn data_mut(&mut self) -> &mut ColumnData {
        &mut self.data
    }

    pub(crate) fn into_parts(self) -> (PropObject, ColumnData) {
        (self.props, self.data)
    }

    /// An independent copy: copied payload, copied metadata, fresh
    /// identity.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            props: self.props.copy(),
            data: self.data.clone(),
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.props == other.props && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typecode_mapping_is_stable() {
        let pairs = [
            (ColumnType::F32, 'f'),
            (ColumnType::F64, 'd'),
            (ColumnType::I32, 'i'),
            (ColumnType::I64, 'l'),
            (ColumnType::Text, 's'),
        ];
        for (ty, code) in pairs {
            assert_eq!(ty.typecode(), code);
            assert_eq!(ColumnType::from_typecode(code).unwrap(), ty);
        }
    }

    #[test]
    fn parse_typecodes_rejects_unknown() {
        assert_eq!(
            parse_typecodes("dfd").unwrap(),
            vec![ColumnType::F64, ColumnType::F32, ColumnType::F64]
        );
        let err = parse_typecodes("dxd").unwrap_err();
        assert!(err.to_string().contains("unknown typecode `x`"));
    }

    #[test]
    fn designation_choice_lists_all_six() {
        let chain = Designation::check_chain();
        use tabula_props::Check;
        let err = chain.check(Value::from("Z")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "must be one of [X, Y, XY, XERR, YERR, LABEL]"
        );
        assert_eq!(
            chain.check(Value::from("XERR")).unwrap(),
            Value::from("XERR")
        );
    }

    #[test]
    fn remove_and_reinsert_rows_round_trips() {
        let mut data = ColumnData::I64((0..6).collect());
        let removed = data.remove_rows(2, 3);
        assert_eq!(data, ColumnData::I64(vec![0, 1, 5]));
        assert_eq!(removed, ColumnData::I64(vec![2, 3, 4]));

        data.insert_rows(2, &removed).unwrap();
        assert_eq!(data, ColumnData::I64((0..6).collect()));
    }

    #[test]
    fn insert_rows_rejects_tag_mismatch() {
        let mut data = ColumnData::F64(vec![1.0]);
        let err = data
            .insert_rows(0, &ColumnData::Text(vec!["a".into()]))
            .unwrap_err();
        assert!(err.to_string().contains("text rows into a f64 column"));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn resize_zero_fills_the_tail() {
        let mut data = ColumnData::F32(vec![1.0, 2.0]);
        data.resize_zero_filled(4);
        assert_eq!(data, ColumnData::F32(vec![1.0, 2.0, 0.0, 0.0]));
        data.resize_zero_filled(1);
        assert_eq!(data, ColumnData::F32(vec![1.0]));
    }

    #[test]
    fn cell_write_coerces_and_returns_prior() {
        let mut data = ColumnData::F64(vec![1.5, 2.5]);
        let prior = data.set_value(1, Value::from("3.25")).unwrap();
        assert_eq!(prior, Value::Float(2.5));
        assert_eq!(data.value(1), Some(Value::Float(3.25)));

        assert!(data.set_value(0, Value::from("not a number")).is_err());
        assert_eq!(data.value(0), Some(Value::Float(1.5)));
    }

    #[test]
    fn i32_cell_write_rejects_overflow() {
        let mut data = ColumnData::I32(vec![0]);
        assert!(data.set_value(0, Value::Int(1 << 40)).is_err());
        data.set_value(0, Value::Int(7)).unwrap();
        assert_eq!(data.value(0), Some(Value::Int(7)));
    }

    #[test]
    fn column_defaults_and_metadata() {
        let col = Column::new("time", ColumnType::F64, 3).unwrap();
        assert_eq!(col.key(), "time");
        assert_eq!(col.designation().unwrap(), Designation::Y);
        assert_eq!(col.label(), "");
        assert_eq!(col.query(), None);

        col.set_designation(Designation::X).unwrap();
        assert_eq!(col.designation().unwrap(), Designation::X);
    }

    #[test]
    fn column_requires_a_key() {
        let err = PropObject::new(column_spec()).unwrap_err();
        assert!(matches!(
            err,
            tabula_props::ValidationError::Missing { .. }
        ));
    }

    #[test]
    fn deep_copy_is_independent() {
        let col = Column::new("a", ColumnType::I64, 2).unwrap();
        let copy = col.deep_copy();
        assert_eq!(col, copy);

        copy.set_label("changed").unwrap();
        assert_eq!(col.label(), "");
        assert_ne!(col, copy);
    }
}
