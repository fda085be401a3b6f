//! C FFI bindings for tablekit-core
//!
//! This crate provides a C-compatible API so engine editor plugins can decode
//! and encode table documents without their own CSV code.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use tablekit_core::{ColumnType, Table, TableAsset};

/// Opaque handle to a decoded table
pub struct TkTable {
    inner: Table,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(message: impl Into<String>) {
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(message.into()));
}

fn into_c_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            set_last_error(e.to_string());
            ptr::null_mut()
        }
    }
}

unsafe fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        set_last_error("null string argument");
        return None;
    }
    match CStr::from_ptr(s).to_str() {
        Ok(s) => Some(s),
        Err(_) => {
            set_last_error("string argument is not valid UTF-8");
            None
        }
    }
}

fn into_handle(result: tablekit_core::Result<Table>) -> *mut TkTable {
    match result {
        Ok(table) => Box::into_raw(Box::new(TkTable { inner: table })),
        Err(e) => {
            set_last_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Decode a table document
///
/// # Safety
/// - `text` must be a valid, NUL-terminated UTF-8 C string
/// - Returns null on error; see `tk_last_error`
#[no_mangle]
pub unsafe extern "C" fn tk_decode(text: *const c_char) -> *mut TkTable {
    match read_str(text) {
        Some(text) => into_handle(tablekit_core::decode(text)),
        None => ptr::null_mut(),
    }
}

/// Build a table from asset JSON
///
/// # Safety
/// - `json` must be a valid, NUL-terminated UTF-8 C string
/// - Returns null on error; see `tk_last_error`
#[no_mangle]
pub unsafe extern "C" fn tk_from_asset_json(json: *const c_char) -> *mut TkTable {
    let Some(json) = read_str(json) else {
        return ptr::null_mut();
    };
    let asset: TableAsset = match serde_json::from_str(json) {
        Ok(asset) => asset,
        Err(e) => {
            set_last_error(e.to_string());
            return ptr::null_mut();
        }
    };
    into_handle(asset.to_table())
}

/// Message of the most recent failure on this thread
///
/// # Safety
/// - Returns null if nothing has failed
/// - Caller must free the returned string with `tk_free_string`
#[no_mangle]
pub unsafe extern "C" fn tk_last_error() -> *mut c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_deref()
            .map(into_c_string)
            .unwrap_or(ptr::null_mut())
    })
}

/// Free a table
///
/// # Safety
/// - `table` must be a valid pointer returned by `tk_decode`/`tk_from_asset_json` or null
#[no_mangle]
pub unsafe extern "C" fn tk_free_table(table: *mut TkTable) {
    if !table.is_null() {
        drop(Box::from_raw(table));
    }
}

/// Encode a table as a document
///
/// # Safety
/// - `table` must be a valid table pointer
/// - Caller must free the returned string with `tk_free_string`
#[no_mangle]
pub unsafe extern "C" fn tk_encode(table: *const TkTable) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }
    into_c_string(&tablekit_core::encode(&(*table).inner))
}

/// Flatten a table to asset JSON
///
/// # Safety
/// - `table` must be a valid table pointer
/// - Caller must free the returned string with `tk_free_string`
#[no_mangle]
pub unsafe extern "C" fn tk_to_asset_json(table: *const TkTable) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }
    match serde_json::to_string(&TableAsset::from_table(&(*table).inner)) {
        Ok(json) => into_c_string(&json),
        Err(e) => {
            set_last_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the table name
///
/// # Safety
/// - `table` must be a valid table pointer
/// - Caller must free the returned string with `tk_free_string`
#[no_mangle]
pub unsafe extern "C" fn tk_table_name(table: *const TkTable) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }
    into_c_string(&(*table).inner.name)
}

/// Get the column count of a table
///
/// # Safety
/// - `table` must be a valid table pointer
#[no_mangle]
pub unsafe extern "C" fn tk_column_count(table: *const TkTable) -> usize {
    if table.is_null() {
        return 0;
    }
    (*table).inner.column_count()
}

/// Get the row count of a table
///
/// # Safety
/// - `table` must be a valid table pointer
#[no_mangle]
pub unsafe extern "C" fn tk_row_count(table: *const TkTable) -> usize {
    if table.is_null() {
        return 0;
    }
    (*table).inner.row_count()
}

/// Get a column name by index (position order, gaps skipped)
///
/// # Safety
/// - `table` must be a valid table pointer
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `tk_free_string`
#[no_mangle]
pub unsafe extern "C" fn tk_column_name(table: *const TkTable, index: usize) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }
    (*table)
        .inner
        .columns()
        .nth(index)
        .map(|c| into_c_string(&c.name))
        .unwrap_or(ptr::null_mut())
}

/// Get a column type by index: 0 CustomType, 1 Int, 2 Float, 3 String
///
/// # Safety
/// - `table` must be a valid table pointer
/// - Returns -1 if index is out of bounds
#[no_mangle]
pub unsafe extern "C" fn tk_column_type(table: *const TkTable, index: usize) -> i32 {
    if table.is_null() {
        return -1;
    }
    (*table)
        .inner
        .columns()
        .nth(index)
        .map(|c| match c.ty {
            ColumnType::CustomType => 0,
            ColumnType::Int => 1,
            ColumnType::Float => 2,
            ColumnType::String => 3,
        })
        .unwrap_or(-1)
}

/// Get a cell value as a string
///
/// # Safety
/// - `table` must be a valid table pointer
/// - Returns null if row or column is out of bounds, or the row has no value there
/// - Caller must free the returned string with `tk_free_string`
#[no_mangle]
pub unsafe extern "C" fn tk_cell(table: *const TkTable, row: usize, col: usize) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }
    let inner = &(*table).inner;
    inner
        .row(row)
        .zip(inner.columns().nth(col))
        .and_then(|(r, c)| r.get(&c.name))
        .map(|v| into_c_string(&v.to_string()))
        .unwrap_or(ptr::null_mut())
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a tk_* function or null
#[no_mangle]
pub unsafe extern "C" fn tk_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take_string(s: *mut c_char) -> Option<String> {
        if s.is_null() {
            return None;
        }
        let owned = CStr::from_ptr(s).to_str().unwrap().to_string();
        tk_free_string(s);
        Some(owned)
    }

    #[test]
    fn test_decode_and_inspect() {
        let text = CString::new("#MyTable\n#,Name,Age\n#,String,Int\n,Alice,30\n,Bob\n").unwrap();
        unsafe {
            let table = tk_decode(text.as_ptr());
            assert!(!table.is_null());

            assert_eq!(take_string(tk_table_name(table)).as_deref(), Some("MyTable"));
            assert_eq!(tk_column_count(table), 2);
            assert_eq!(tk_row_count(table), 2);
            assert_eq!(take_string(tk_column_name(table, 1)).as_deref(), Some("Age"));
            assert_eq!(tk_column_type(table, 0), 3);
            assert_eq!(tk_column_type(table, 1), 1);
            assert_eq!(tk_column_type(table, 2), -1);
            assert_eq!(take_string(tk_cell(table, 0, 1)).as_deref(), Some("30"));
            assert_eq!(take_string(tk_cell(table, 1, 1)), None);
            assert_eq!(take_string(tk_cell(table, 5, 0)), None);

            assert_eq!(
                take_string(tk_encode(table)).as_deref(),
                Some("#MyTable\n#,Name,Age\n#,String,Int\n,Alice,30\n,Bob,")
            );

            tk_free_table(table);
        }
    }

    #[test]
    fn test_decode_error_sets_last_error() {
        let text = CString::new("#T\n#,A\n#,bool\n").unwrap();
        unsafe {
            let table = tk_decode(text.as_ptr());
            assert!(table.is_null());
            let message = take_string(tk_last_error()).unwrap();
            assert!(message.contains("bool"));
        }
    }

    #[test]
    fn test_asset_json_round_trip() {
        let text = CString::new("#T\n#,A,B\n#,Int,Float\n,1,2.5\n").unwrap();
        unsafe {
            let table = tk_decode(text.as_ptr());
            let json = take_string(tk_to_asset_json(table)).unwrap();
            tk_free_table(table);

            let json = CString::new(json).unwrap();
            let rebuilt = tk_from_asset_json(json.as_ptr());
            assert!(!rebuilt.is_null());
            assert_eq!(take_string(tk_cell(rebuilt, 0, 1)).as_deref(), Some("2.5"));
            tk_free_table(rebuilt);
        }
    }

    #[test]
    fn test_interior_nul_sets_last_error() {
        let json = CString::new(
            r#"{"table_name":"T","columns":[{"name":"A","type":"String"}],"rows":[{"values":["a\u0000b"]}]}"#,
        )
        .unwrap();
        unsafe {
            let table = tk_from_asset_json(json.as_ptr());
            assert!(!table.is_null());

            assert!(tk_cell(table, 0, 0).is_null());
            let message = take_string(tk_last_error()).unwrap();
            assert!(message.contains("nul"));

            tk_free_table(table);
        }
    }

    #[test]
    fn test_null_arguments() {
        unsafe {
            assert!(tk_decode(ptr::null()).is_null());
            assert_eq!(tk_row_count(ptr::null()), 0);
            assert!(tk_encode(ptr::null()).is_null());
            tk_free_table(ptr::null_mut());
            tk_free_string(ptr::null_mut());
        }
    }
}
