//! # Spreadsheet Access
//!
//! Styled cell grids read from legacy Excel workbooks (.xls, BIFF8).
//! The table engine only sees the [`Grid`] capability: dimensions plus value,
//! type and style lookups per coordinate. [`MemoryGrid`] is the single
//! implementation, filled either by the BIFF8 reader or directly by tests.
pub(crate) mod cell;
#[cfg(test)]
pub(crate) mod fixture;
pub(crate) mod grid;
pub(crate) mod xls;

use crate::error::ResultMessage;
use crate::error::RustyTablesError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::grid::MemoryGrid;
use crate::spreadsheet::xls::XlsWorkbook;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum SpreadsheetError {
    #[error("Spreadsheet '{0}' is password protected")]
    SpreadsheetPasswordProtectedError(String),

    #[error("Spreadsheet '{0}' contains no worksheet")]
    SpreadsheetEmptyError(String),

    #[error("Sheet '{1}' not found in '{0}'")]
    SheetNotFoundError(String, String),
}

/// Read-only access to a rectangular grid of styled cells.
pub(crate) trait Grid {
    /// Returns `(nrows, ncols)`.
    fn dimensions(&self) -> (usize, usize);

    /// Returns the cell at `(row, col)`, or `None` when out of range.
    fn cell(&self, row: usize, col: usize) -> Option<&Cell>;

    fn cell_value(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cell(row, col).map(|cell| &cell.value)
    }

    fn cell_type(&self, row: usize, col: usize) -> CellType {
        self.cell(row, col).map(|cell| cell.kind).unwrap_or_default()
    }

    /// Positions outside the grid report the default (plain, borderless) style.
    fn cell_style(&self, row: usize, col: usize) -> CellStyle {
        self.cell(row, col).map(|cell| cell.style).unwrap_or_default()
    }
}

/// Anything that can produce a fresh grid for one query.
pub(crate) trait GridSource {
    type Grid: Grid;

    fn load(&self) -> Result<Self::Grid, RustyTablesError>;
}

/// Location of the sheet to analyse: a local path or remote URL, plus an
/// optional sheet name (the first worksheet when absent).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SheetSource {
    pub(crate) file_name: String,
    pub(crate) sheet_name: Option<String>,
}

impl SheetSource {
    pub(crate) fn new(file_name: &str, sheet_name: Option<&str>) -> Self {
        SheetSource {
            file_name: file_name.to_owned(),
            sheet_name: sheet_name.map(str::to_owned),
        }
    }
}

impl GridSource for SheetSource {
    type Grid = MemoryGrid;

    fn load(&self) -> Result<MemoryGrid, RustyTablesError> {
        let mut workbook = XlsWorkbook::open(&self.file_name).with_prefix(&self.file_name)?;
        workbook.read_sheet(self.sheet_name.as_deref()).with_prefix(&self.file_name)
    }
}

impl GridSource for MemoryGrid {
    type Grid = MemoryGrid;

    fn load(&self) -> Result<MemoryGrid, RustyTablesError> {
        Ok(self.clone())
    }
}
