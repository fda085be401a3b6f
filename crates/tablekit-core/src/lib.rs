//! tablekit-core: typed tables and their CSV form
//!
//! This library provides functionality to:
//! - Tokenize and escape CSV records
//! - Hold a typed, column-positioned table and coerce raw fields into it
//! - Decode and encode the three-header-row table document
//! - Flatten tables into positional asset rows and back
//! - Export plain CSV and batch-check directories of table files

pub mod asset;
pub mod codec;
pub mod error;
pub mod line;
pub mod plain;
pub mod scanner;
pub mod table;

pub use asset::{AssetRow, TableAsset};
pub use codec::{decode, decode_with, encode, DecodeOptions, MissingNameRow};
pub use error::{Error, Result};
pub use line::{format_field, parse_line, split_records};
pub use plain::to_plain_csv;
pub use scanner::{check_files, find_table_files, FileReport, TableSummary};
pub use table::{
    convert_to_column_type, convert_to_type, convert_to_type_with, CoercionPolicy, Column,
    ColumnType, FromRow, Row, Table, Value, FIRST_COLUMN,
};
