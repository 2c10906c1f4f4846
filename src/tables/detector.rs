use crate::spreadsheet::Grid;
use crate::tables::TableRegion;

/// Per-row header scanner state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ScanState {
    Idle,
    InHeader { start_col: usize },
}

/// Scans the grid row by row, left to right, for italic header texts and
/// returns their regions in scan order.
///
/// A header spans its own column plus every bordered column to its right.
/// Scanning resumes right after the header column, so several tables may
/// share a header row.
pub(crate) fn detect_regions<G: Grid + ?Sized>(grid: &G) -> Vec<TableRegion> {
    let (nrows, ncols) = grid.dimensions();
    let mut regions = Vec::new();
    for row in 0..nrows {
        let mut state = ScanState::Idle;
        for col in 0..ncols {
            let Some(cell) = grid.cell(row, col) else {
                continue;
            };
            if cell.is_header_candidate() {
                state = ScanState::InHeader { start_col: col };
            }
            if let ScanState::InHeader { start_col } = state {
                let end_col = outline_end(grid, row, start_col, ncols);
                if end_col > start_col {
                    let name = cell.value.as_text().unwrap_or_default().trim().replace('\n', " ");
                    log::info!(
                        "{}: {} columns (from col {} to {})",
                        name,
                        end_col - start_col,
                        start_col,
                        end_col - 1
                    );
                    regions.push(TableRegion {
                        name,
                        header_row: row,
                        start_col,
                        end_col,
                    });
                }
                state = ScanState::Idle;
            }
        }
    }
    regions
}

/// Exclusive end of the bordered run starting at the header column.
fn outline_end<G: Grid + ?Sized>(grid: &G, row: usize, start_col: usize, ncols: usize) -> usize {
    let mut end_col = start_col;
    while end_col < ncols {
        let Some(cell) = grid.cell(row, end_col) else {
            break;
        };
        if !cell.style.border.any() && end_col > start_col {
            break;
        }
        end_col += 1;
    }
    end_col
}
