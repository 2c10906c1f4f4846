//! # Table Extraction
//!
//! Finds tables that are delimited only by formatting: an italic header text
//! whose outlined (bordered) cells give the column span, followed by data rows
//! until the next header or the first blank row.
pub(crate) mod detector;
pub(crate) mod extractor;
pub(crate) mod normalize;

use crate::spreadsheet::Grid;

/// Location of a table header and the columns its outline covers.
/// `end_col` is exclusive and always greater than `start_col`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TableRegion {
    pub(crate) name: String,
    pub(crate) header_row: usize,
    pub(crate) start_col: usize,
    pub(crate) end_col: usize,
}

impl TableRegion {
    pub(crate) fn column_count(&self) -> usize {
        self.end_col - self.start_col
    }
}

/// A named table of display strings; every row has the same width.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Table {
    pub(crate) name: String,
    pub(crate) rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn is_empty(&self) -> bool {
        self.rows.first().map(Vec::is_empty).unwrap_or(true)
    }

    /// Trimmed first-column texts, skipping blank ones.
    pub(crate) fn row_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// First row whose trimmed label equals the trimmed `label`.
    pub(crate) fn find_row(&self, label: &str) -> Option<&[String]> {
        let label = label.trim();
        self.rows
            .iter()
            .find(|row| row.first().map(|first| first.trim() == label).unwrap_or(false))
            .map(Vec::as_slice)
    }
}

/// Tables of one sheet in discovery order, unique by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Tables {
    tables: Vec<Table>,
}

impl Tables {
    /// Runs detection and extraction over the whole grid.
    /// Empty tables are dropped.
    pub(crate) fn extract<G: Grid + ?Sized>(grid: &G) -> Tables {
        let mut tables = Tables::default();
        for region in detector::detect_regions(grid) {
            let table = extractor::extract_table(grid, &region);
            if table.is_empty() {
                log::debug!("table '{}' has no data rows", table.name);
            } else {
                tables.insert(table);
            }
        }
        tables
    }

    /// Adds a table; a table with an existing name replaces it in place.
    pub(crate) fn insert(&mut self, table: Table) {
        match self.tables.iter_mut().find(|it| it.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.name.to_owned()).collect()
    }
}
