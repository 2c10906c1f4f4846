//! Low-level readers shared by the spreadsheet module.
pub(crate) mod biff8;
pub(crate) mod bytes;
pub(crate) mod reader;
