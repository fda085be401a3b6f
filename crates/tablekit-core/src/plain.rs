//! Plain CSV export: one header record of column names, then the rows.
//!
//! Drops the name and type rows and the row-index placeholder column, for
//! tools that only understand a conventional header.

use crate::error::{Error, Result};
use crate::table::Table;

/// Write a table as conventional CSV
pub fn to_plain_csv(table: &Table) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.columns().map(|c| c.name.as_str()))?;

    for row in table.rows() {
        let cells: Vec<String> = table
            .columns()
            .map(|c| row.get(&c.name).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer.write_record(&cells)?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    #[test]
    fn test_plain_export() {
        let table = decode("#T\n#,Name,Age\n#,String,Int\n,\"Doe, Jane\",30\n,Bob\n").unwrap();
        let csv = to_plain_csv(&table).unwrap();
        assert_eq!(csv, "Name,Age\n\"Doe, Jane\",30\nBob,\n");
    }
}
