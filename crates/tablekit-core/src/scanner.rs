//! Directory scanner for discovering and batch-checking table CSV files

use crate::codec::{decode_with, DecodeOptions};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Headline numbers of a decoded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: usize,
    pub rows: usize,
}

/// Outcome of decoding a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// File that was checked
    pub path: PathBuf,
    /// Summary on success, error message on failure
    pub outcome: std::result::Result<TableSummary, String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Find every `.csv` file under the given roots, sorted by path
pub fn find_table_files<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in roots {
        let root = root.as_ref();
        debug!(root = %root.display(), "scanning for table files");

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Decode each file and report the result; one bad file does not stop the batch
pub fn check_files<P: AsRef<Path>>(paths: &[P], options: &DecodeOptions) -> Vec<FileReport> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let outcome = check_file(path, options).map_err(|e| {
                warn!(path = %path.display(), error = %e, "table file failed to decode");
                e.to_string()
            });
            FileReport {
                path: path.to_path_buf(),
                outcome,
            }
        })
        .collect()
}

fn check_file(path: &Path, options: &DecodeOptions) -> Result<TableSummary> {
    let text = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let table = decode_with(&text, options)?;
    Ok(TableSummary {
        columns: table.column_count(),
        rows: table.row_count(),
        name: table.name,
    })
}
