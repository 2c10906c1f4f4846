//! # DuckDB Sheet Tables Extension
//!
//! Finds the tables laid out inside one sheet of a legacy Excel workbook
//! (`.xls`) and answers questions about them in SQL. Tables carry no explicit
//! markers: a table starts at an italic header text, spans the bordered cells
//! next to it and runs down to the first blank row or the next header.
//!
//! ## Table Functions
//!
//! - `sheet_tables(file)`: names of the tables found in the sheet
//! - `sheet_table_rows(file, table_name)`: row labels (first column) of a table
//! - `sheet_row_sum(file, table_name, row_name)`: sum of the numeric values of a row,
//!   understanding currency (`$1,200`) and percent (`12.5%`) texts
//!
//! Every function accepts a `sheet_name := '...'` named parameter; the first
//! worksheet is used otherwise. Files may be local paths or remote URLs.
extern crate duckdb;
extern crate duckdb_loadable_macros;
extern crate libduckdb_sys;

mod error;
mod extension;
mod helpers;
mod query;
mod spreadsheet;
mod tables;

use crate::extension::sheet_row_sum::SheetRowSumTableFunction;
use crate::extension::sheet_table_rows::SheetTableRowsTableFunction;
use crate::extension::sheet_tables::SheetTablesTableFunction;
use anyhow::{Context, Result};
use duckdb::Connection;
use duckdb_loadable_macros::duckdb_entrypoint_c_api;
use libduckdb_sys as ffi;

/// Extension entry point for DuckDB.
///
/// Registers `sheet_tables`, `sheet_table_rows` and `sheet_row_sum`.
///
/// # Errors
///
/// Returns an error if a table function fails to register with DuckDB.
#[duckdb_entrypoint_c_api()]
pub unsafe fn extension_entrypoint(connection: Connection) -> Result<()> {
    connection
        .register_table_function::<SheetTablesTableFunction>("sheet_tables")
        .context("Failed to register sheet_tables table function")?;
    connection
        .register_table_function::<SheetTableRowsTableFunction>("sheet_table_rows")
        .context("Failed to register sheet_table_rows table function")?;
    connection
        .register_table_function::<SheetRowSumTableFunction>("sheet_row_sum")
        .context("Failed to register sheet_row_sum table function")?;
    Ok(())
}
