//! Flattened asset projection of a table
//!
//! Editors display and persist a table as an ordered column list plus rows
//! of positional strings. This module maps between that shape and [`Table`],
//! and carries the row/cell edit helpers an inspector needs.

use crate::error::{Error, Result};
use crate::table::{convert_to_type, Column, Row, Table, FIRST_COLUMN};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One asset row: a value per column, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRow {
    pub values: Vec<String>,
}

impl AssetRow {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }
}

/// A table flattened to positional strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAsset {
    pub table_name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<AssetRow>,
}

impl TableAsset {
    /// Create an empty asset
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Flatten a table. Columns keep their order but lose their positions;
    /// a row without a value for a column gets an empty string.
    pub fn from_table(table: &Table) -> Self {
        let columns: Vec<Column> = table.columns().cloned().collect();
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                AssetRow::new(
                    columns
                        .iter()
                        .map(|c| row.get(&c.name).map(|v| v.to_string()).unwrap_or_default())
                        .collect(),
                )
            })
            .collect();

        Self {
            table_name: table.name.clone(),
            columns,
            rows,
        }
    }

    /// Rebuild a typed table; column `i` lands at position `FIRST_COLUMN + i`
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::new(self.table_name.clone());
        for (i, column) in self.columns.iter().enumerate() {
            table.insert_column(FIRST_COLUMN + i, column.name.clone(), column.ty)?;
        }

        for (index, asset_row) in self.rows.iter().enumerate() {
            if asset_row.values.len() > self.columns.len() {
                return Err(Error::RowWidth {
                    row: index,
                    values: asset_row.values.len(),
                    columns: self.columns.len(),
                });
            }
            let mut row = Row::new();
            for (value, column) in asset_row.values.iter().zip(&self.columns) {
                row.insert(column.name.clone(), convert_to_type(value, column.ty)?);
            }
            table.push_row(row)?;
        }

        Ok(table)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a row of empty values, one per column, returning its index
    pub fn add_row(&mut self) -> usize {
        self.rows
            .push(AssetRow::new(vec![String::new(); self.columns.len()]));
        self.rows.len() - 1
    }

    pub fn remove_row(&mut self, index: usize) -> Result<AssetRow> {
        if index >= self.rows.len() {
            return Err(Error::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Overwrite one cell. A short row is padded up to the column.
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) -> Result<()> {
        let columns = self.columns.len();
        if column >= columns {
            return Err(Error::ColumnOutOfRange {
                index: column,
                len: columns,
            });
        }
        let len = self.rows.len();
        let asset_row = self
            .rows
            .get_mut(row)
            .ok_or(Error::RowOutOfRange { index: row, len })?;
        if asset_row.values.len() <= column {
            asset_row.values.resize(column + 1, String::new());
        }
        asset_row.values[column] = value.into();
        Ok(())
    }

    /// Load an asset from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the asset as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl From<&Table> for TableAsset {
    fn from(table: &Table) -> Self {
        Self::from_table(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::table::{ColumnType, Value};

    fn sample() -> Table {
        decode("#MyTable\n#,Name,Age,Ratio\n#,String,Int,Float\n,Alice,30,0.5\n,Bob,41").unwrap()
    }

    #[test]
    fn test_from_table_flattens_in_column_order() {
        let asset = TableAsset::from_table(&sample());

        assert_eq!(asset.table_name, "MyTable");
        assert_eq!(
            asset.columns,
            vec![
                Column::new("Name", ColumnType::String),
                Column::new("Age", ColumnType::Int),
                Column::new("Ratio", ColumnType::Float),
            ]
        );
        assert_eq!(asset.rows[0].values, vec!["Alice", "30", "0.5"]);
        assert_eq!(asset.rows[1].values, vec!["Bob", "41", ""]);
    }

    #[test]
    fn test_to_table_round_trip() {
        let mut table = Table::new("T");
        table.add_column("Name", ColumnType::String).unwrap();
        table.add_column("Age", ColumnType::Int).unwrap();
        table.push_row(table.parse_row(&["", " Alice ", "30"]).unwrap()).unwrap();

        let rebuilt = TableAsset::from_table(&table).to_table().unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_decoded_table_survives_projection() {
        let decoded = decode("#T\n#,A,B\n#,Int,String\n,1,x\n,2").unwrap();
        let rebuilt = TableAsset::from_table(&decoded).to_table().unwrap();
        assert_eq!(rebuilt, decoded);
        assert_eq!(rebuilt.column_at(1).unwrap().name, "A");
        assert_eq!(rebuilt.column_at(2).unwrap().name, "B");
    }

    #[test]
    fn test_to_table_short_row_and_wide_row() {
        let mut asset = TableAsset::new("T");
        asset.columns.push(Column::new("A", ColumnType::Int));
        asset.columns.push(Column::new("B", ColumnType::String));
        asset.rows.push(AssetRow::new(vec!["7".to_string()]));

        let table = asset.to_table().unwrap();
        assert_eq!(table.rows()[0].get_int("A"), Some(7));
        assert!(!table.rows()[0].contains("B"));

        asset
            .rows
            .push(AssetRow::new(vec!["1".into(), "x".into(), "extra".into()]));
        assert!(matches!(
            asset.to_table(),
            Err(Error::RowWidth { row: 1, values: 3, columns: 2 })
        ));
    }

    #[test]
    fn test_to_table_custom_type_fails() {
        let mut asset = TableAsset::new("T");
        asset.columns.push(Column::new("Blob", ColumnType::CustomType));
        asset.rows.push(AssetRow::new(vec!["data".into()]));
        assert!(matches!(asset.to_table(), Err(Error::UnsupportedType { .. })));
    }

    #[test]
    fn test_row_edits() {
        let mut asset = TableAsset::from_table(&sample());

        let index = asset.add_row();
        assert_eq!(index, 2);
        assert_eq!(asset.rows[2].values, vec!["", "", ""]);

        asset.set_cell(2, 0, "Carol").unwrap();
        asset.set_cell(2, 1, "27").unwrap();
        assert!(matches!(
            asset.set_cell(2, 3, "x"),
            Err(Error::ColumnOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            asset.set_cell(5, 0, "x"),
            Err(Error::RowOutOfRange { index: 5, len: 3 })
        ));

        let removed = asset.remove_row(0).unwrap();
        assert_eq!(removed.values[0], "Alice");

        let table = asset.to_table().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1].get("Age"), Some(&Value::Int(27)));
        assert_eq!(table.rows()[1].get_float("Ratio"), Some(0.0));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");

        let asset = TableAsset::from_table(&sample());
        asset.save(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"type\": \"Int\""));

        let loaded = TableAsset::load(&path).unwrap();
        assert_eq!(loaded, asset);
    }

    #[test]
    fn test_load_missing_file() {
        let err = TableAsset::load("/nonexistent/table.json").unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
