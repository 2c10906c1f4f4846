//! # Query Engine
//!
//! The three read operations over the tables of one sheet. Every call loads
//! the grid again and runs detection and extraction from scratch.
use crate::error::RustyTablesError;
use crate::spreadsheet::GridSource;
use crate::tables::normalize::normalize;
use crate::tables::Table;
use crate::tables::Tables;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum QueryError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[from] RustyTablesError),

    #[error("Table '{table_name}' not found. Available tables: {available:?}")]
    TableNotFound { table_name: String, available: Vec<String> },

    #[error("Row name '{row_name}' not found in table '{table_name}'")]
    RowNotFound { table_name: String, row_name: String },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TableList {
    pub(crate) tables: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TableRowLabels {
    pub(crate) table_name: String,
    pub(crate) row_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RowSum {
    pub(crate) table_name: String,
    pub(crate) row_name: String,
    pub(crate) sum: f64,
}

pub(crate) struct QueryEngine<S: GridSource> {
    source: S,
}

impl<S: GridSource> QueryEngine<S> {
    pub(crate) fn new(source: S) -> Self {
        QueryEngine { source }
    }

    fn tables(&self) -> Result<Tables, QueryError> {
        let grid = self.source.load()?;
        Ok(Tables::extract(&grid))
    }

    /// Names of all non-empty tables in discovery order.
    pub(crate) fn list_tables(&self) -> Result<TableList, QueryError> {
        Ok(TableList {
            tables: self.tables()?.names(),
        })
    }

    /// Trimmed, non-blank first-column labels of a table.
    pub(crate) fn table_row_labels(&self, table_name: &str) -> Result<TableRowLabels, QueryError> {
        let tables = self.tables()?;
        let table = find_table(&tables, table_name)?;
        Ok(TableRowLabels {
            table_name: table_name.to_owned(),
            row_names: table.row_labels(),
        })
    }

    /// Sum of the numeric values right of the first row labelled `row_name`.
    /// Values that do not normalize to a number are skipped.
    pub(crate) fn row_sum(&self, table_name: &str, row_name: &str) -> Result<RowSum, QueryError> {
        let tables = self.tables()?;
        let table = find_table(&tables, table_name)?;
        let row = table.find_row(row_name).ok_or_else(|| QueryError::RowNotFound {
            table_name: table_name.to_owned(),
            row_name: row_name.to_owned(),
        })?;
        // fold from +0.0: an empty f64 `sum()` is -0.0
        let sum = row
            .iter()
            .skip(1)
            .filter_map(|value| normalize(value.as_str()))
            .fold(0.0, |sum, value| sum + value);
        Ok(RowSum {
            table_name: table_name.to_owned(),
            row_name: row_name.to_owned(),
            sum,
        })
    }
}

fn find_table<'a>(tables: &'a Tables, table_name: &str) -> Result<&'a Table, QueryError> {
    tables.get(table_name).ok_or_else(|| QueryError::TableNotFound {
        table_name: table_name.to_owned(),
        available: tables.names(),
    })
}
