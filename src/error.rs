use thiserror::Error;

/// Main error type for reading a sheet into a grid.
/// Aggregates errors from the standard library, dependencies, and the reader modules.
#[derive(Error, Debug)]
pub(crate) enum RustyTablesError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors (the `cfb` container reports through `std::io::Error` too)
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    DuckDBError(#[from] duckdb::Error),

    // Helper module errors
    #[error("{0}")]
    Biff8HelperError(#[from] crate::helpers::biff8::Biff8Error),

    #[error("{0}")]
    UnifiedReaderError(#[from] crate::helpers::reader::UnifiedReaderError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    XlsError(#[from] crate::spreadsheet::xls::XlsError),
}

pub(crate) trait ResultOptionChain {
    fn ok_none_else<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Self;
}

impl<T, E> ResultOptionChain for Result<Option<T>, E> {
    fn ok_none_else<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Self,
    {
        match self {
            Ok(None) => f(),
            _ => self,
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyTablesError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyTablesError::WithContextError(format!("{}: {}", message, e)))
    }
}
