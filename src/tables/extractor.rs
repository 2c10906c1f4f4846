use crate::spreadsheet::Grid;
use crate::tables::Table;
use crate::tables::TableRegion;

/// Walks the rows below a header and collects the table body.
///
/// Extraction ends at the next header row or at the first row without any
/// data. Rows after the first may start left of the outline when their
/// left neighbours hold values (row labels spilling over); such rows are cut
/// to the outline width keeping the left-most entries.
pub(crate) fn extract_table<G: Grid + ?Sized>(grid: &G, region: &TableRegion) -> Table {
    let (nrows, ncols) = grid.dimensions();
    let expected = region.column_count();
    let mut rows = Vec::new();
    for (offset, row) in (region.header_row + 1..nrows).enumerate() {
        if has_header(grid, row, ncols) {
            break;
        }

        let start_col = if offset == 0 {
            region.start_col
        } else {
            extend_left(grid, row, region.start_col)
        };

        let mut values = Vec::with_capacity(region.end_col - start_col);
        let mut has_data = false;
        for col in start_col..region.end_col {
            if let Some(cell) = grid.cell(row, col) {
                values.push(cell.display_text());
                has_data |= cell.value.has_content();
            }
        }

        if has_data {
            if values.len() >= expected {
                values.truncate(expected);
                rows.push(values);
            } else {
                log::trace!("'{}': dropped row {} with {} of {} columns", region.name, row, values.len(), expected);
            }
        } else if !values.is_empty() && values.iter().all(|value| value.trim().is_empty()) {
            break;
        }
    }

    log::debug!("'{}': {} rows", region.name, rows.len());
    Table {
        name: region.name.to_owned(),
        rows,
    }
}

fn has_header<G: Grid + ?Sized>(grid: &G, row: usize, ncols: usize) -> bool {
    (0..ncols).any(|col| grid.cell(row, col).map(|cell| cell.is_header_candidate()).unwrap_or(false))
}

/// Moves the start column left while the neighbouring cell holds data.
fn extend_left<G: Grid + ?Sized>(grid: &G, row: usize, start_col: usize) -> usize {
    let mut col = start_col;
    while col > 0 {
        match grid.cell_value(row, col - 1) {
            Some(value) if value.has_content() => col -= 1,
            _ => break,
        }
    }
    col
}
