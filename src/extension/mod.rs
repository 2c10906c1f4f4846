//! # Extension Core Module
//!
//! Parameter handling and errors shared by the table functions.
use crate::query::QueryError;
use crate::spreadsheet::SheetSource;
use duckdb::core::FlatVector;
use duckdb::core::LogicalTypeHandle;
use duckdb::core::LogicalTypeId;
use duckdb::vtab::BindInfo;
use std::ops::Range;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use thiserror::Error;

pub(crate) mod sheet_row_sum;
pub(crate) mod sheet_table_rows;
pub(crate) mod sheet_tables;

/// Rows emitted per output chunk.
const CHUNK_SIZE: usize = 2048;

#[derive(Error, Debug)]
pub(crate) enum ExtensionError {
    #[error("{0}")]
    QueryError(#[from] QueryError),

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },
}

/// Positional parameter of a table function.
pub(crate) trait Param<T> {
    fn name() -> &'static str;

    fn kind() -> LogicalTypeHandle;

    fn read(bind: &BindInfo, index: u64) -> Result<T, ExtensionError>;
}

/// Named (`name := value`) parameter of a table function.
pub(crate) trait NamedParam<T> {
    fn name() -> &'static str;

    fn kind() -> LogicalTypeHandle;

    fn definition() -> (String, LogicalTypeHandle) {
        (Self::name().to_string(), Self::kind())
    }

    /// `None` when the parameter is not given.
    fn read(bind: &BindInfo) -> Result<Option<T>, ExtensionError>;
}

pub(crate) struct FileParam;

pub(crate) struct TableNameParam;

pub(crate) struct RowNameParam;

pub(crate) struct SheetNameParam;

impl Param<String> for FileParam {
    fn name() -> &'static str {
        "file"
    }

    fn kind() -> LogicalTypeHandle {
        LogicalTypeHandle::from(LogicalTypeId::Varchar)
    }

    fn read(bind: &BindInfo, index: u64) -> Result<String, ExtensionError> {
        let file_name = bind.get_parameter(index).to_string();
        if file_name.trim().is_empty() {
            Err(ExtensionError::InvalidParameter {
                name: Self::name().to_owned(),
                message: "must not be empty".to_owned(),
            })
        } else {
            Ok(file_name)
        }
    }
}

impl Param<String> for TableNameParam {
    fn name() -> &'static str {
        "table_name"
    }

    fn kind() -> LogicalTypeHandle {
        LogicalTypeHandle::from(LogicalTypeId::Varchar)
    }

    /// Passed through as given; blank names are looked up like any other.
    fn read(bind: &BindInfo, index: u64) -> Result<String, ExtensionError> {
        Ok(bind.get_parameter(index).to_string())
    }
}

impl Param<String> for RowNameParam {
    fn name() -> &'static str {
        "row_name"
    }

    fn kind() -> LogicalTypeHandle {
        LogicalTypeHandle::from(LogicalTypeId::Varchar)
    }

    fn read(bind: &BindInfo, index: u64) -> Result<String, ExtensionError> {
        Ok(bind.get_parameter(index).to_string())
    }
}

impl NamedParam<String> for SheetNameParam {
    fn name() -> &'static str {
        "sheet_name"
    }

    fn kind() -> LogicalTypeHandle {
        LogicalTypeHandle::from(LogicalTypeId::Varchar)
    }

    fn read(bind: &BindInfo) -> Result<Option<String>, ExtensionError> {
        match bind.get_named_parameter(Self::name()) {
            Some(value) => {
                let sheet_name = value.to_string();
                if sheet_name.is_empty() {
                    Err(ExtensionError::InvalidParameter {
                        name: Self::name().to_owned(),
                        message: "must not be empty".to_owned(),
                    })
                } else {
                    Ok(Some(sheet_name))
                }
            }
            None => Ok(None),
        }
    }
}

/// Sheet named by the first positional argument and `sheet_name`.
fn read_source(bind: &BindInfo) -> Result<SheetSource, ExtensionError> {
    let file_name = FileParam::read(bind, 0)?;
    let sheet_name = SheetNameParam::read(bind)?;
    Ok(SheetSource::new(&file_name, sheet_name.as_deref()))
}

/// Writes a primitive value directly to a vector using pointer arithmetic.
fn write_primitive<T>(vector: &mut FlatVector, index: usize, value: T) {
    unsafe {
        let pointer: *mut T = vector.as_mut_ptr();
        std::ptr::write(pointer.add(index), value);
    }
}

/// Bounds of the next output chunk, `None` once every row was emitted.
fn next_chunk(cursor: &AtomicUsize, len: usize) -> Option<Range<usize>> {
    let lower = cursor.fetch_add(CHUNK_SIZE, Ordering::Relaxed);
    let upper = len.min(lower + CHUNK_SIZE);
    if lower < upper {
        Some(lower..upper)
    } else {
        None
    }
}
