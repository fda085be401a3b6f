//! Table <-> CSV codec
//!
//! A table document starts with three marker rows followed by the data:
//!
//! ```text
//! #MyTable
//! #,Name,Age
//! #,String,Int
//! ,Alice,30
//! ```
//!
//! The leading field of the header, type and data rows is a row-index
//! placeholder; column values start at position 1.

use crate::error::{Error, Result};
use crate::line::{format_field, parse_line, split_records};
use crate::table::{convert_to_column_type, CoercionPolicy, Table};
use tracing::debug;

/// Handling of a document whose first record is not a `#` name row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingNameRow {
    /// Consume the record anyway and expect headers on the next one
    #[default]
    Consume,
    /// Leave the name empty and read the record as the header row
    AsHeader,
}

/// Decoder configuration
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Policy for unparsable numeric fields
    pub coercion: CoercionPolicy,
    /// Policy for a missing name row
    pub missing_name_row: MissingNameRow,
    /// Fail when the document ends before its header or type row
    pub strict_structure: bool,
}

impl DecodeOptions {
    /// Create lenient default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the numeric coercion policy
    pub fn with_coercion(mut self, policy: CoercionPolicy) -> Self {
        self.coercion = policy;
        self
    }

    /// Set the missing name row policy
    pub fn with_missing_name_row(mut self, policy: MissingNameRow) -> Self {
        self.missing_name_row = policy;
        self
    }

    /// Enable structural checks
    pub fn with_strict_structure(mut self, strict: bool) -> Self {
        self.strict_structure = strict;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Name,
    Headers,
    Types,
    Data,
}

/// Decode a table document with default options
pub fn decode(text: &str) -> Result<Table> {
    decode_with(text, &DecodeOptions::default())
}

/// Decode a table document.
///
/// Runs one forward pass over the records: name, headers, types, then data.
/// Each of the first three phases consumes exactly one record.
pub fn decode_with(text: &str, options: &DecodeOptions) -> Result<Table> {
    let mut table = Table::default();
    let mut phase = Phase::Name;

    for record in split_records(text) {
        let fields = parse_line(record);

        if phase == Phase::Name {
            phase = Phase::Headers;
            match fields[0].strip_prefix('#') {
                Some(name) => {
                    table.name = name.trim_start_matches('#').trim().to_string();
                    continue;
                }
                None if options.missing_name_row == MissingNameRow::Consume => {
                    debug!("first record has no '#' name marker, consuming it");
                    continue;
                }
                None => debug!("first record has no '#' name marker, reading it as headers"),
            }
        }

        match phase {
            Phase::Name => unreachable!("name phase always advances"),
            Phase::Headers => {
                register_headers(&mut table, &fields)?;
                phase = Phase::Types;
            }
            Phase::Types => {
                assign_types(&mut table, &fields)?;
                phase = Phase::Data;
            }
            Phase::Data => {
                let row = table.parse_row_with(&fields, options.coercion)?;
                table.push_row(row)?;
            }
        }
    }

    if options.strict_structure {
        match phase {
            Phase::Name | Phase::Headers => return Err(Error::MissingSection { section: "header" }),
            Phase::Types => return Err(Error::MissingSection { section: "type" }),
            Phase::Data => {}
        }
    }

    debug!(
        table = %table.name,
        columns = table.column_count(),
        rows = table.row_count(),
        "decoded table"
    );
    Ok(table)
}

fn register_headers(table: &mut Table, fields: &[String]) -> Result<()> {
    for (position, field) in fields.iter().enumerate() {
        let mut name = field.trim();
        if name.starts_with('#') {
            name = name.trim_start_matches('#').trim();
        }
        // Blank cells leave a gap in the position space.
        if name.is_empty() {
            continue;
        }
        table.insert_column(position, name, Default::default())?;
    }
    Ok(())
}

fn assign_types(table: &mut Table, fields: &[String]) -> Result<()> {
    for (position, field) in fields.iter().enumerate() {
        if table.column_at(position).is_some() {
            let ty = convert_to_column_type(field.trim())?;
            table.set_column_type(position, ty);
        }
    }
    Ok(())
}

/// Encode a table as a document, lines joined with `\n`, no trailing newline
pub fn encode(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.row_count() + 3);

    lines.push(format!("#{}", format_field(&table.name)));

    let names: Vec<_> = table.columns().map(|c| format_field(&c.name)).collect();
    lines.push(format!("#,{}", names.join(",")));

    let labels: Vec<&str> = table.columns().map(|c| c.ty.label()).collect();
    lines.push(format!("#,{}", labels.join(",")));

    for row in table.rows() {
        let cells: Vec<String> = table
            .columns()
            .map(|c| {
                row.get(&c.name)
                    .map(|v| format_field(&v.to_string()).into_owned())
                    .unwrap_or_default()
            })
            .collect();
        lines.push(format!(",{}", cells.join(",")));
    }

    lines.join("\n")
}
