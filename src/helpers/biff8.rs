//! Microsoft Office Binary Interchange File Format (BIFF8)
//! Record reader for the `Workbook` stream of Excel 97-2003 files (.xls).
//! CONTINUE records are joined onto the record they extend, so string payloads
//! that straddle a record boundary decode transparently.

use crate::error::RustyTablesError;
use crate::helpers::bytes::LittleEndian;
use encoding_rs::UTF_16LE;
use std::ops::Range;
use thiserror::Error;

const CONTINUE: u16 = 60;

/// Errors specific to BIFF8 format parsing
#[derive(Error, Debug)]
pub(crate) enum Biff8Error {
    #[error("Fewer than {0} bytes remaining")]
    NoEnoughDataError(usize),
}

/// Reader for BIFF8 (Excel 97-2003) binary format
/// Handles the record-based structure with continuation records
pub(crate) struct Biff8Reader {
    buffer: Vec<u8>,
    pointer: usize,            // Offset of the next record header
    chunks: Vec<Range<usize>>, // Payloads of the current record and its CONTINUE records
    index: usize,              // Current chunk index
    offset: usize,             // Offset within current chunk
}

impl Biff8Reader {
    /// Creates a new BIFF8 reader over a whole workbook stream
    pub(crate) fn new(data: Vec<u8>) -> Biff8Reader {
        Biff8Reader {
            buffer: data,
            pointer: 0,
            chunks: Vec::new(),
            index: 0,
            offset: 0,
        }
    }

    /// Advances to the next record and returns its type
    /// Returns None when the stream is exhausted
    pub(crate) fn next(&mut self) -> Result<Option<u16>, RustyTablesError> {
        let Some(kind) = self.buffer.le_u16(self.pointer) else {
            return Ok(None);
        };
        self.chunks.clear();
        self.index = 0;
        self.offset = 0;
        self.push_chunk()?;
        while self.buffer.le_u16(self.pointer) == Some(CONTINUE) {
            self.push_chunk()?;
        }
        Ok(Some(kind))
    }

    /// Registers the payload of the record whose header sits at `pointer`
    fn push_chunk(&mut self) -> Result<(), RustyTablesError> {
        let size = match self.buffer.le_u16(self.pointer + 2) {
            Some(size) => size as usize,
            None => Err(Biff8Error::NoEnoughDataError(4))?,
        };
        let lower = self.pointer + 4;
        let upper = lower + size;
        // A truncated final record keeps whatever bytes are present
        self.chunks.push(lower..upper.min(self.buffer.len()));
        self.pointer = upper;
        Ok(())
    }

    /// Sets the reader pointer to a specific stream offset
    pub(crate) fn goto(&mut self, pointer: usize) {
        self.pointer = pointer;
        self.chunks.clear();
    }

    /// Number of unread payload bytes left in the current record
    pub(crate) fn remaining(&self) -> usize {
        self.chunks
            .iter()
            .enumerate()
            .skip(self.index)
            .map(|(index, chunk)| if index == self.index { chunk.len() - self.offset.min(chunk.len()) } else { chunk.len() })
            .sum()
    }

    /// Consumes up to `length` bytes without crossing into the next chunk
    /// Returns the consumed buffer range
    fn advance(&mut self, length: usize) -> Range<usize> {
        let Some(chunk) = self.chunks.get(self.index).cloned() else {
            return 0..0;
        };
        let source = chunk.end.min(chunk.start + self.offset);
        let target = chunk.end.min(source + length);
        if target == chunk.end {
            self.index += 1;
            self.offset = 0;
        } else {
            self.offset += target - source;
        }
        source..target
    }

    /// Reads exactly `size` bytes and decodes them
    fn read_field<T>(&mut self, size: usize, decode: impl Fn(&[u8]) -> Option<T>) -> Result<T, RustyTablesError> {
        let range = self.advance(size);
        match decode(&self.buffer[range.clone()]).filter(|_| range.len() == size) {
            Some(value) => Ok(value),
            None => Err(Biff8Error::NoEnoughDataError(size))?,
        }
    }

    /// Skips `length` bytes, following continuation chunks
    pub(crate) fn skip(&mut self, length: usize) -> Result<(), RustyTablesError> {
        let mut remaining = length;
        while remaining > 0 {
            if self.index >= self.chunks.len() {
                Err(Biff8Error::NoEnoughDataError(remaining))?
            }
            remaining -= self.advance(remaining).len();
        }
        Ok(())
    }

    /// Reads a single byte
    pub(crate) fn read_u8(&mut self) -> Result<u8, RustyTablesError> {
        self.read_field(1, |bytes| bytes.first().copied())
    }

    /// Reads a 16-bit unsigned integer
    pub(crate) fn read_u16(&mut self) -> Result<u16, RustyTablesError> {
        self.read_field(2, |bytes| bytes.le_u16(0))
    }

    /// Reads a 32-bit unsigned integer
    pub(crate) fn read_u32(&mut self) -> Result<u32, RustyTablesError> {
        self.read_field(4, |bytes| bytes.le_u32(0))
    }

    /// Reads a 64-bit unsigned integer
    pub(crate) fn read_u64(&mut self) -> Result<u64, RustyTablesError> {
        self.read_field(8, |bytes| bytes.le_u64(0))
    }

    /// Reads a 64-bit floating point number
    pub(crate) fn read_f64(&mut self) -> Result<f64, RustyTablesError> {
        self.read_field(8, |bytes| bytes.le_f64(0))
    }

    /// Reads an RK number (compressed numeric format used in Excel)
    pub(crate) fn read_rk_number(&mut self) -> Result<f64, RustyTablesError> {
        self.read_u32().map(decode_rk_number)
    }

    /// Reads a short Unicode string (1-byte length prefix)
    pub(crate) fn read_short_xl_unicode_string(&mut self) -> Result<String, RustyTablesError> {
        let chars = self.read_u8()? as usize;
        let flags = self.read_u8()?;
        self.read_characters(chars, flags)
    }

    /// Reads a Unicode string (2-byte length prefix)
    pub(crate) fn read_xl_unicode_string(&mut self) -> Result<String, RustyTablesError> {
        let chars = self.read_u16()? as usize;
        let flags = self.read_u8()?;
        self.read_characters(chars, flags)
    }

    /// Reads a rich extended Unicode string, discarding formatting runs and phonetic data
    pub(crate) fn read_xl_unicode_rich_extended_string(&mut self) -> Result<String, RustyTablesError> {
        let chars = self.read_u16()? as usize;
        let flags = self.read_u8()?;
        let runs = if (flags & 0x8) > 0 { // fRichSt
            self.read_u16()? as usize
        } else {
            0
        };
        let phonetic = if (flags & 0x4) > 0 { // fExtSt
            self.read_u32()? as usize
        } else {
            0
        };
        let string = self.read_characters(chars, flags)?;
        // rgRun, then ExtRst
        self.skip(4 * runs + phonetic)?;
        Ok(string)
    }

    /// Reads `chars` characters; a string cut by a CONTINUE record resumes
    /// behind a fresh option byte that may switch the character width
    fn read_characters(&mut self, chars: usize, flags: u8) -> Result<String, RustyTablesError> {
        let mut content = String::with_capacity(chars);
        let mut remaining = chars;
        let mut is_high_byte = (flags & 0x1) > 0;
        while remaining > 0 {
            let range = self.advance(if is_high_byte { remaining << 1 } else { remaining });
            let bytes = &self.buffer[range];
            if is_high_byte {
                let (string, _) = UTF_16LE.decode_without_bom_handling(bytes);
                content.push_str(&string);
                remaining -= bytes.len() >> 1;
            } else {
                // Compressed strings hold the low byte of each UTF-16 code unit
                content.extend(bytes.iter().map(|byte| char::from(*byte)));
                remaining -= bytes.len();
            }
            if remaining > 0 {
                if self.index >= self.chunks.len() {
                    Err(Biff8Error::NoEnoughDataError(remaining))?
                }
                is_high_byte = (self.read_u8()? & 0x1) > 0;
            }
        }
        Ok(content)
    }
}

/// Decodes an RK value: a 30-bit integer or the high bits of an IEEE double,
/// optionally scaled by 100
pub(crate) fn decode_rk_number(value: u32) -> f64 {
    let is_scaled = (value & 0x01) != 0;
    let is_integer = (value & 0x02) != 0;
    let number = if is_integer {
        ((value as i32) >> 2) as f64
    } else {
        f64::from_bits(((value & 0xFFFF_FFFC) as u64) << 32)
    };
    if is_scaled {
        number / 100.0
    } else {
        number
    }
}

#[macro_export]
macro_rules! match_biff8_record {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(kind) = $reader.next()? {
            match kind {
                $($arms)*
                _ => (),
            }
        }
    };
}
