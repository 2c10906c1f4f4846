use crate::error::RustyTablesError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub(crate) enum UnifiedReaderError {
    #[error("No data from remote file: '{0}'")]
    RemoteFileNoDataError(String),
}

/// Byte source of a workbook: a local file or a remote object fetched into memory
pub(crate) enum UnifiedReader {
    Local(BufReader<File>),
    Remote(Cursor<Vec<u8>>),
}

impl UnifiedReader {
    /// Opens a workbook from a local path or a remote URL
    ///
    /// Remote objects (http, https, s3, gs, hf, ...) are fetched through DuckDB's
    /// `read_blob`, which resolves credentials configured in the host database.
    pub(crate) fn new(file_name: &str) -> Result<UnifiedReader, RustyTablesError> {
        if Self::is_remote_url(file_name) {
            Self::read_blob_with_duckdb(file_name)
        } else {
            let file = File::open(file_name)?;
            Ok(UnifiedReader::Local(BufReader::new(file)))
        }
    }

    /// Checks if a file name is a URL with a non-`file` scheme.
    /// Windows drive letters parse as one-letter schemes and stay local.
    pub(crate) fn is_remote_url(file_name: &str) -> bool {
        match Url::parse(file_name) {
            Ok(url) => url.scheme() != "file" && url.scheme().len() > 1,
            Err(_) => false,
        }
    }

    fn read_blob_with_duckdb(file_name: &str) -> Result<UnifiedReader, RustyTablesError> {
        let connection = duckdb::Connection::open_in_memory()?;
        let result: Result<Vec<u8>, _> = connection.query_row("SELECT content FROM read_blob(?)", [file_name], |row| row.get(0));
        connection.close().map_err(|(_, e)| e)?;

        let bytes = result?;
        if bytes.is_empty() {
            Err(UnifiedReaderError::RemoteFileNoDataError(file_name.to_owned()))?;
        }
        log::debug!("fetched {} bytes from '{}'", bytes.len(), file_name);
        Ok(UnifiedReader::Remote(Cursor::new(bytes)))
    }
}

impl Read for UnifiedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            UnifiedReader::Local(reader) => reader.read(buf),
            UnifiedReader::Remote(reader) => reader.read(buf),
        }
    }
}

impl Seek for UnifiedReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            UnifiedReader::Local(reader) => reader.seek(pos),
            UnifiedReader::Remote(reader) => reader.seek(pos),
        }
    }
}
