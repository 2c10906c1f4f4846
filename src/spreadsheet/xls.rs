use crate::error::ResultOptionChain;
use crate::error::RustyTablesError;
use crate::helpers::biff8::Biff8Reader;
use crate::helpers::reader::UnifiedReader;
use crate::match_biff8_record;
use crate::spreadsheet::cell::Borders;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::grid::MemoryGrid;
use crate::spreadsheet::Grid;
use crate::spreadsheet::SpreadsheetError;
use either::Either;
use std::collections::HashMap;
use std::io::Read;
use thiserror::Error;

// BIFF8 record type identifiers
const FORMULA: u16 = 6;        // Formula cell with its cached result
const EOF: u16 = 10;           // End of a substream
const FILE_PASS: u16 = 47;     // Workbook encryption / password protection
const FONT: u16 = 49;          // Font definition referenced by XF records
const COL_INFO: u16 = 125;     // Column range width and default format
const BOUND_SHEET8: u16 = 133; // Sheet name, type and stream position
const MUL_RK: u16 = 189;       // Run of RK numbers in one row
const MUL_BLANK: u16 = 190;    // Run of styled blank cells in one row
const RSTRING: u16 = 214;      // Rich text label with inline value
const XF: u16 = 224;           // Extended format: font, number format, borders
const SST: u16 = 252;          // Shared string table
const LABEL_SST: u16 = 253;    // Label referencing the shared string table
const BLANK: u16 = 513;        // Styled cell without value
const NUMBER: u16 = 515;       // IEEE double cell
const LABEL: u16 = 516;        // Text label with inline value
const BOOL_ERR: u16 = 517;     // Boolean or error cell
const STRING: u16 = 519;       // String result of the preceding formula
const ROW: u16 = 520;          // Row height and default format
const RK: u16 = 638;           // Compressed number cell
const FORMAT: u16 = 1054;      // Custom number format definition
const BOF: u16 = 2057;         // Beginning of a substream

const SHEET_TYPE_WORKSHEET: u8 = 0;
const FONT_ITALIC: u16 = 0x0002;
const ROW_HAS_DEFAULT_FORMAT: u16 = 0x0080;
const LAST_COLUMN: usize = 255;
/// Format of cells with neither a record nor a row or column format
const DEFAULT_CELL_XF: usize = 15;

#[derive(Error, Debug)]
pub(crate) enum XlsError {
    #[error("Invalid XF index '{0}'")]
    StyleIndexError(u16),

    #[error("Invalid font index '{0}'")]
    FontIndexError(u16),

    #[error("Invalid shared string index '{0}'")]
    SharedStringIndexError(usize),

    #[error("Invalid Formula value '{0}'")]
    FormulaValueError(u64),
}

/// Resolved cell format: the style facts plus whether numbers are dates.
#[derive(Copy, Clone, Debug, Default)]
struct XfStyle {
    style: CellStyle,
    is_date: bool,
}

/// Excel 97-2003 workbook with its globals loaded.
pub(crate) struct XlsWorkbook {
    name: String,
    reader: Biff8Reader,
    shared_strings: Vec<String>,
    styles: Vec<XfStyle>,
    /// Worksheets with their substream positions
    sheets: Vec<(String, usize)>,
}

impl XlsWorkbook {
    /// Opens a workbook and reads its global substream.
    pub(crate) fn open(file_name: &str) -> Result<XlsWorkbook, RustyTablesError> {
        let mut cfb = cfb::CompoundFile::open(UnifiedReader::new(file_name)?)?;
        let stream = read_stream(&mut cfb, "Workbook")
            .ok_none_else(|| read_stream(&mut cfb, "Book"))?
            .ok_or_else(|| SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?;
        let mut reader = Biff8Reader::new(stream);

        let mut fonts: Vec<bool> = Vec::new();
        let mut custom_formats: HashMap<u16, bool> = HashMap::new();
        let mut formats: Vec<(u16, u16, u32)> = Vec::new();
        let mut shared_strings = Vec::new();
        let mut sheets: Vec<(String, usize)> = Vec::new();
        match_biff8_record!(reader => {
            EOF => break,
            FILE_PASS => Err(SpreadsheetError::SpreadsheetPasswordProtectedError(file_name.to_owned()))?,
            FONT => {
                // Font index 4 is never written
                if fonts.len() == 4 {
                    fonts.push(false);
                }
                reader.skip(2)?;
                let flags = reader.read_u16()?;
                fonts.push((flags & FONT_ITALIC) != 0);
            }
            FORMAT => {
                let id = reader.read_u16()?;
                let format = reader.read_xl_unicode_string()?;
                custom_formats.insert(id, CellType::is_date_format(&format));
            }
            XF => {
                let font = reader.read_u16()?;
                let format = reader.read_u16()?;
                reader.skip(6)?;
                let border = reader.read_u32()?;
                formats.push((font, format, border));
            }
            SST => shared_strings = load_shared_strings(&mut reader)?,
            BOUND_SHEET8 => {
                let pointer = reader.read_u32()? as usize;
                reader.skip(1)?;
                let kind = reader.read_u8()?;
                let sheet_name = reader.read_short_xl_unicode_string()?;
                if kind == SHEET_TYPE_WORKSHEET {
                    sheets.push((sheet_name, pointer));
                }
            }
        });
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
        }

        let styles = formats
            .into_iter()
            .map(|(font, format, border)| {
                let italic = *fonts.get(font as usize).ok_or(XlsError::FontIndexError(font))?;
                let is_date = custom_formats
                    .get(&format)
                    .copied()
                    .unwrap_or_else(|| CellType::is_builtin_date_format(format));
                Ok(XfStyle {
                    style: CellStyle {
                        italic,
                        border: Borders::from_line_styles(
                            ((border >> 8) & 0xF) as u8,
                            ((border >> 12) & 0xF) as u8,
                            (border & 0xF) as u8,
                            ((border >> 4) & 0xF) as u8,
                        ),
                    },
                    is_date,
                })
            })
            .collect::<Result<Vec<_>, RustyTablesError>>()?;

        log::debug!(
            "opened '{}': {} fonts, {} XF records, {} shared strings, sheets {:?}",
            file_name,
            fonts.len(),
            styles.len(),
            shared_strings.len(),
            sheets.iter().map(|(name, _)| name).collect::<Vec<_>>(),
        );

        Ok(XlsWorkbook {
            name: file_name.to_owned(),
            reader,
            shared_strings,
            styles,
            sheets,
        })
    }

    /// Reads one worksheet into a rectangular grid.
    /// Without a sheet name the first worksheet is read.
    pub(crate) fn read_sheet(&mut self, sheet_name: Option<&str>) -> Result<MemoryGrid, RustyTablesError> {
        let (name, pointer) = match sheet_name {
            Some(sheet_name) => self.sheets.iter().find(|(name, _)| name == sheet_name),
            None => self.sheets.first(),
        }
        .cloned()
        .ok_or_else(|| SpreadsheetError::SheetNotFoundError(self.name.to_owned(), sheet_name.unwrap_or_default().to_owned()))?;

        self.reader.goto(pointer);
        self.reader.next()?;
        let mut grid = MemoryGrid::new();
        let mut row_styles: HashMap<usize, CellStyle> = HashMap::new();
        let mut column_styles: HashMap<usize, CellStyle> = HashMap::new();
        // FORMULA cell waiting for the STRING record holding its text result
        let mut pending: Option<(usize, usize, CellStyle)> = None;
        while let Some(tag) = self.reader.next()? {
            match tag {
                BOF | EOF => break,
                COL_INFO => {
                    let first = self.reader.read_u16()? as usize;
                    let last = self.reader.read_u16()? as usize;
                    self.reader.skip(2)?;
                    let index = self.reader.read_u16()?;
                    let format = self.style(index)?;
                    for col in first..=last.min(LAST_COLUMN) {
                        column_styles.insert(col, format.style);
                    }
                }
                ROW => {
                    let row = self.reader.read_u16()? as usize;
                    self.reader.skip(10)?;
                    let options = self.reader.read_u16()?;
                    let index = self.reader.read_u16()? & 0x0FFF;
                    if (options & ROW_HAS_DEFAULT_FORMAT) != 0 {
                        row_styles.insert(row, self.style(index)?.style);
                    }
                }
                MUL_RK => {
                    let row = self.reader.read_u16()? as usize;
                    let col_lower_bound = self.reader.read_u16()? as usize;
                    let count = self.reader.remaining().saturating_sub(2) / 6;
                    for col in col_lower_bound..col_lower_bound + count {
                        let index = self.reader.read_u16()?;
                        let format = self.style(index)?;
                        let value = self.reader.read_rk_number()?;
                        grid.set(row, col, number_cell(value, format));
                    }
                }
                MUL_BLANK => {
                    let row = self.reader.read_u16()? as usize;
                    let col_lower_bound = self.reader.read_u16()? as usize;
                    let count = self.reader.remaining().saturating_sub(2) / 2;
                    for col in col_lower_bound..col_lower_bound + count {
                        let index = self.reader.read_u16()?;
                        grid.set(row, col, blank_cell(self.style(index)?));
                    }
                }
                STRING => {
                    if let Some((row, col, style)) = pending.take() {
                        let value = self.reader.read_xl_unicode_string()?;
                        grid.set(row, col, Cell { value: CellValue::Text(value), kind: CellType::Text, style });
                    }
                }
                BLANK | BOOL_ERR | NUMBER | RK | LABEL_SST | LABEL | RSTRING | FORMULA => {
                    let row = self.reader.read_u16()? as usize;
                    let col = self.reader.read_u16()? as usize;
                    let index = self.reader.read_u16()?;
                    let format = self.style(index)?;
                    let cell = match tag {
                        BLANK => Either::Left(blank_cell(format)),
                        BOOL_ERR => Either::Left(read_bool_or_error_cell(&mut self.reader, format)?),
                        NUMBER => Either::Right(self.reader.read_f64()?),
                        RK => Either::Right(self.reader.read_rk_number()?),
                        LABEL_SST => Either::Left(read_label_sst_cell(&mut self.reader, &self.shared_strings, format)?),
                        LABEL | RSTRING => Either::Left(read_label_cell(&mut self.reader, format)?),
                        _ => match read_formula_cell(&mut self.reader, format)? {
                            Some(cell) => cell,
                            None => {
                                pending = Some((row, col, format.style));
                                continue;
                            }
                        },
                    };
                    let cell = cell.left_or_else(|value| number_cell(value, format));
                    grid.set(row, col, cell);
                }
                _ => (),
            }
        }

        // Row format first, then column format, then the default cell format
        let default_style = self.styles.get(DEFAULT_CELL_XF).map(|format| format.style).unwrap_or_default();
        let grid = grid.finish(|row, col| {
            row_styles
                .get(&row)
                .or_else(|| column_styles.get(&col))
                .copied()
                .unwrap_or(default_style)
        });
        log::debug!("read sheet '{}' of '{}': {:?}", name, self.name, grid.dimensions());
        Ok(grid)
    }

    fn style(&self, index: u16) -> Result<XfStyle, RustyTablesError> {
        Ok(*self.styles.get(index as usize).ok_or(XlsError::StyleIndexError(index))?)
    }
}

/// Reads a whole stream of the compound file, `None` when it does not exist.
fn read_stream<F: std::io::Read + std::io::Seek>(
    cfb: &mut cfb::CompoundFile<F>,
    name: &str,
) -> Result<Option<Vec<u8>>, RustyTablesError> {
    if !cfb.exists(name) {
        return Ok(None);
    }
    let mut stream = cfb.open_stream(name)?;
    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer)?;
    Ok(Some(buffer))
}

/// Loads the shared string table from the SST record.
fn load_shared_strings(reader: &mut Biff8Reader) -> Result<Vec<String>, RustyTablesError> {
    reader.skip(4)?;
    let count = reader.read_u32()? as usize;
    let mut shared_strings = Vec::with_capacity(count.min(u16::MAX as usize));
    for _ in 0..count {
        shared_strings.push(reader.read_xl_unicode_rich_extended_string()?);
    }
    Ok(shared_strings)
}

fn number_cell(value: f64, format: XfStyle) -> Cell {
    Cell {
        value: CellValue::Number(value),
        kind: CellType::for_number(format.is_date),
        style: format.style,
    }
}

fn blank_cell(format: XfStyle) -> Cell {
    Cell {
        value: CellValue::Empty,
        kind: CellType::Blank,
        style: format.style,
    }
}

/// Booleans keep 0/1 and errors keep their code, both as numbers.
fn read_bool_or_error_cell(reader: &mut Biff8Reader, format: XfStyle) -> Result<Cell, RustyTablesError> {
    let value = reader.read_u8()?;
    let flag = reader.read_u8()?;
    let kind = if flag == 0 {
        CellType::Boolean
    } else {
        CellType::Error
    };
    Ok(Cell {
        value: CellValue::Number(value as f64),
        kind,
        style: format.style,
    })
}

fn read_label_sst_cell(reader: &mut Biff8Reader, shared_strings: &[String], format: XfStyle) -> Result<Cell, RustyTablesError> {
    let index = reader.read_u32()? as usize;
    let value = shared_strings.get(index).ok_or(XlsError::SharedStringIndexError(index))?;
    Ok(text_cell(value.to_owned(), format))
}

fn read_label_cell(reader: &mut Biff8Reader, format: XfStyle) -> Result<Cell, RustyTablesError> {
    let value = reader.read_xl_unicode_string()?;
    Ok(text_cell(value, format))
}

fn text_cell(value: String, format: XfStyle) -> Cell {
    Cell {
        value: CellValue::Text(value),
        kind: CellType::Text,
        style: format.style,
    }
}

/// Reads the cached result of a FORMULA record.
/// Returns `None` for string results, whose text follows in a STRING record.
fn read_formula_cell(reader: &mut Biff8Reader, format: XfStyle) -> Result<Option<Either<Cell, f64>>, RustyTablesError> {
    let formula = reader.read_u64()?;
    let is_number = (formula & 0xFFFF000000000000) != 0xFFFF000000000000;
    let flag = formula & 0xFF;
    let cell = if is_number {
        Either::Right(f64::from_bits(formula))
    } else if flag == 0 {
        return Ok(None);
    } else if flag == 1 {
        let value = if (formula & 0xFF0000) > 0 { 1.0 } else { 0.0 };
        Either::Left(Cell { value: CellValue::Number(value), kind: CellType::Boolean, style: format.style })
    } else if flag == 2 {
        let code = ((formula >> 16) & 0xFF) as f64;
        Either::Left(Cell { value: CellValue::Number(code), kind: CellType::Error, style: format.style })
    } else if flag == 3 {
        Either::Left(text_cell(String::new(), format))
    } else {
        Err(XlsError::FormulaValueError(formula))?
    };
    Ok(Some(cell))
}
