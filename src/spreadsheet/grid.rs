use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::Grid;

/// Row-major grid of cells held in memory.
///
/// Rows may be ragged; `ncols` is the width of the widest row and positions
/// past the end of a shorter row are out of range.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MemoryGrid {
    rows: Vec<Vec<Cell>>,
    ncols: usize,
}

impl MemoryGrid {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);
        MemoryGrid { rows, ncols }
    }

    /// Stores a cell, growing the grid with empty cells as needed.
    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, Cell::default);
        }
        cells[col] = cell;
        self.ncols = self.ncols.max(col + 1);
    }

    /// Pads every row to the full width, making the grid rectangular.
    /// Positions without a cell take their style from `missing_style`.
    pub(crate) fn finish(mut self, missing_style: impl Fn(usize, usize) -> CellStyle) -> Self {
        let ncols = self.ncols;
        for (row, cells) in self.rows.iter_mut().enumerate() {
            cells.resize_with(ncols, Cell::default);
            for (col, cell) in cells.iter_mut().enumerate() {
                if cell.kind == CellType::Empty {
                    cell.style = missing_style(row, col);
                }
            }
        }
        self
    }

    /// Appends a row of cells below the current last row.
    #[cfg(test)]
    pub(crate) fn row(mut self, cells: Vec<Cell>) -> Self {
        self.ncols = self.ncols.max(cells.len());
        self.rows.push(cells);
        self
    }
}

impl Grid for MemoryGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.ncols)
    }

    fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }
}
