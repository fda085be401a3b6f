//! Core table types: columns, typed values, rows and the table itself

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// CSV position of the first data column; position 0 holds the row-index
/// placeholder
pub const FIRST_COLUMN: usize = 1;

/// Declared type of a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Opaque payload with no string coercion; also the type of a column
    /// whose type row entry was never read
    #[default]
    CustomType,
    Int,
    Float,
    String,
}

impl ColumnType {
    /// Raw label written to the type row
    pub fn label(self) -> &'static str {
        match self {
            ColumnType::CustomType => "CustomType",
            ColumnType::Int => "Int",
            ColumnType::Float => "Float",
            ColumnType::String => "String",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do when a numeric field does not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoercionPolicy {
    /// Substitute zero and carry on
    #[default]
    DefaultZero,
    /// Surface [`Error::Coercion`]
    Fail,
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within a table
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: ColumnType,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    String(String),
    /// Opaque payload of a `CustomType` column
    Custom(String),
}

impl Value {
    /// The column type this value belongs to
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::String(_) => ColumnType::String,
            Value::Custom(_) => ColumnType::CustomType,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the text of a `String` or `Custom` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Custom(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) | Value::Custom(s) => f.write_str(s),
        }
    }
}

/// One record: column name to typed value, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the previous one for that column
    pub fn insert(&mut self, column: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(column.into(), value)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.shift_remove(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(column, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_int(&self, column: &str) -> Option<i32> {
        self.get(column).and_then(Value::as_int)
    }

    pub fn get_float(&self, column: &str) -> Option<f32> {
        self.get(column).and_then(Value::as_float)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A record type that can be built from a [`Row`]
pub trait FromRow: Sized {
    /// Build a record, or `None` if the row does not fit
    fn from_row(row: &Row) -> Option<Self>;
}

/// Every value as text, in row order
impl FromRow for Vec<String> {
    fn from_row(row: &Row) -> Option<Self> {
        Some(row.iter().map(|(_, v)| v.to_string()).collect())
    }
}

/// A typed table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Columns keyed by CSV position; gaps are allowed
    columns: BTreeMap<usize, Column>,
    /// Row data
    rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Columns in position order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Column registered at a CSV position
    pub fn column_at(&self, position: usize) -> Option<&Column> {
        self.columns.get(&position)
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.values().find(|c| c.name == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Append a column after the last registered position, or at
    /// [`FIRST_COLUMN`] on a table without columns
    pub fn add_column(&mut self, name: impl Into<String>, ty: ColumnType) -> Result<usize> {
        let position = self
            .columns
            .keys()
            .next_back()
            .map_or(FIRST_COLUMN, |&last| last + 1);
        self.insert_column(position, name, ty)?;
        Ok(position)
    }

    /// Register a column at an explicit CSV position
    pub fn insert_column(
        &mut self,
        position: usize,
        name: impl Into<String>,
        ty: ColumnType,
    ) -> Result<()> {
        let name = name.into();
        if let Some(existing) = self.columns.get(&position) {
            return Err(Error::PositionOccupied {
                position,
                existing: existing.name.clone(),
            });
        }
        if self.find_column(&name).is_some() {
            return Err(Error::DuplicateColumn(name));
        }
        self.columns.insert(position, Column::new(name, ty));
        Ok(())
    }

    /// Change the declared type of the column at `position`.
    /// Existing row values are left as they are.
    pub(crate) fn set_column_type(&mut self, position: usize, ty: ColumnType) -> bool {
        match self.columns.get_mut(&position) {
            Some(column) => {
                column.ty = ty;
                true
            }
            None => false,
        }
    }

    /// Check that `value` may be stored under `column`
    fn check_value(&self, column: &str, value: &Value) -> Result<()> {
        let declared = self
            .find_column(column)
            .ok_or_else(|| Error::UnknownColumn(column.to_string()))?;
        if value.column_type() != declared.ty {
            return Err(Error::TypeMismatch {
                column: column.to_string(),
                expected: declared.ty,
                found: value.column_type(),
            });
        }
        Ok(())
    }

    /// Append a row; every key must name a declared column and every value
    /// must match that column's type
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        for (column, value) in row.iter() {
            self.check_value(column, value)?;
        }
        self.rows.push(row);
        Ok(())
    }

    /// Overwrite one cell, returning the previous value
    pub fn set_cell(&mut self, row_index: usize, column: &str, value: Value) -> Result<Option<Value>> {
        self.check_value(column, &value)?;
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(row_index)
            .ok_or(Error::RowOutOfRange { index: row_index, len })?;
        Ok(row.insert(column, value))
    }

    pub fn remove_row(&mut self, row_index: usize) -> Result<Row> {
        if row_index >= self.rows.len() {
            return Err(Error::RowOutOfRange {
                index: row_index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(row_index))
    }

    /// Build a row from positional fields under the lenient coercion policy
    pub fn parse_row<S: AsRef<str>>(&self, fields: &[S]) -> Result<Row> {
        self.parse_row_with(fields, CoercionPolicy::DefaultZero)
    }

    /// Build a row from positional fields.
    ///
    /// Fields at positions without a declared column are ignored; a short
    /// record simply leaves its trailing columns out.
    pub fn parse_row_with<S: AsRef<str>>(&self, fields: &[S], policy: CoercionPolicy) -> Result<Row> {
        let mut row = Row::new();
        for (position, field) in fields.iter().enumerate() {
            if let Some(column) = self.columns.get(&position) {
                let value = convert_to_type_with(field.as_ref(), column.ty, policy)?;
                row.insert(column.name.clone(), value);
            }
        }
        Ok(row)
    }

    /// Materialize rows as caller-defined records, keeping only the rows the
    /// factory accepts
    pub fn project<T, F>(&self, factory: F) -> Vec<T>
    where
        F: FnMut(&Row) -> Option<T>,
    {
        self.rows.iter().filter_map(factory).collect()
    }

    /// [`Table::project`] through a [`FromRow`] implementation
    pub fn to_list<T: FromRow>(&self) -> Vec<T> {
        self.project(T::from_row)
    }
}

/// Convert a raw field under the lenient coercion policy
pub fn convert_to_type(value: &str, ty: ColumnType) -> Result<Value> {
    convert_to_type_with(value, ty, CoercionPolicy::DefaultZero)
}

/// Convert a raw field into a value of `ty`
pub fn convert_to_type_with(value: &str, ty: ColumnType, policy: CoercionPolicy) -> Result<Value> {
    match ty {
        ColumnType::Int => match value.trim().parse::<i32>() {
            Ok(i) => Ok(Value::Int(i)),
            Err(_) => coercion_fallback(value, ty, policy, Value::Int(0)),
        },
        ColumnType::Float => match value.trim().parse::<f32>() {
            Ok(f) => Ok(Value::Float(f)),
            Err(_) => coercion_fallback(value, ty, policy, Value::Float(0.0)),
        },
        ColumnType::String => Ok(Value::String(value.to_string())),
        ColumnType::CustomType => Err(Error::UnsupportedType { ty }),
    }
}

fn coercion_fallback(value: &str, ty: ColumnType, policy: CoercionPolicy, zero: Value) -> Result<Value> {
    match policy {
        CoercionPolicy::DefaultZero => {
            tracing::trace!(value, %ty, "unparsable field, substituting zero");
            Ok(zero)
        }
        CoercionPolicy::Fail => Err(Error::Coercion {
            value: value.to_string(),
            ty,
        }),
    }
}

/// Resolve a type row label
pub fn convert_to_column_type(label: &str) -> Result<ColumnType> {
    match label {
        "Int" | "int" => Ok(ColumnType::Int),
        "Float" | "float" => Ok(ColumnType::Float),
        "String" | "string" => Ok(ColumnType::String),
        _ => Err(Error::UnknownColumnType {
            label: label.to_string(),
        }),
    }
}
