//! Minimal BIFF8 workbook writer for tests.
//!
//! Just enough CFB + BIFF8 to drive the reader: a fixed font and XF table
//! (plain, italic, bordered, italic+bordered, date), a shared string table
//! and one substream per worksheet with optional row and column formats.
use std::io::Cursor;
use std::io::Write;

const RECORD_FORMULA: u16 = 0x0006;
const RECORD_EOF: u16 = 0x000A;
const RECORD_FILEPASS: u16 = 0x002F;
const RECORD_FONT: u16 = 0x0031;
const RECORD_COLINFO: u16 = 0x007D;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_MULRK: u16 = 0x00BD;
const RECORD_MULBLANK: u16 = 0x00BE;
const RECORD_XF: u16 = 0x00E0;
const RECORD_SST: u16 = 0x00FC;
const RECORD_LABELSST: u16 = 0x00FD;
const RECORD_BLANK: u16 = 0x0201;
const RECORD_NUMBER: u16 = 0x0203;
const RECORD_LABEL: u16 = 0x0204;
const RECORD_BOOLERR: u16 = 0x0205;
const RECORD_STRING: u16 = 0x0207;
const RECORD_ROW: u16 = 0x0208;
const RECORD_RK: u16 = 0x027E;
const RECORD_FORMAT: u16 = 0x041E;
const RECORD_BOF: u16 = 0x0809;

const BOF_VERSION_BIFF8: u16 = 0x0600;
const BOF_DT_WORKBOOK_GLOBALS: u16 = 0x0005;
const BOF_DT_WORKSHEET: u16 = 0x0010;

const FMT_DATE: u16 = 0x00A4;
const FONT_ITALIC_INDEX: u16 = 5;
const BORDER_THIN_ALL: u32 = 0x1111;
const ROW_GHOST_DIRTY: u16 = 0x0080;

pub(crate) const XF_PLAIN: u16 = 16;
pub(crate) const XF_ITALIC: u16 = 17;
pub(crate) const XF_BORDERED: u16 = 18;
pub(crate) const XF_ITALIC_BORDERED: u16 = 19;
pub(crate) const XF_DATE: u16 = 20;

/// Cell payloads the fixture can write.
#[derive(Clone, Debug)]
pub(crate) enum FixtureCell {
    Number(f64),
    /// Integer stored as an RK value
    Rk(i32),
    /// Text stored in the shared string table
    Shared(String),
    /// Text stored inline as UTF-16
    Label(String),
    Bool(bool),
    /// Formula whose cached result is a string
    FormulaText(String),
    Blank,
    /// Integers stored in one MULRK record starting at the cell column
    MulRk(Vec<i32>),
    /// Styled blanks over this many columns starting at the cell column
    MulBlank(u16),
}

#[derive(Default)]
struct FixtureSheet {
    name: String,
    /// `(first, last, xf)` column ranges written as COLINFO records
    columns: Vec<(u16, u16, u16)>,
    /// `(row, xf)` default row formats written as ROW records
    rows: Vec<(u16, u16)>,
    cells: Vec<(u16, u16, u16, FixtureCell)>,
}

#[derive(Default)]
pub(crate) struct XlsFixture {
    encrypted: bool,
    sheets: Vec<FixtureSheet>,
}

impl XlsFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Starts a new worksheet; following cells are written to it.
    pub(crate) fn sheet(mut self, name: &str) -> Self {
        self.sheets.push(FixtureSheet {
            name: name.to_owned(),
            ..FixtureSheet::default()
        });
        self
    }

    /// Formats the columns `first..=last` of the current worksheet.
    pub(crate) fn column_format(mut self, first: u16, last: u16, xf: u16) -> Self {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.columns.push((first, last, xf));
        }
        self
    }

    /// Gives a row of the current worksheet a default format.
    pub(crate) fn row_format(mut self, row: u16, xf: u16) -> Self {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.rows.push((row, xf));
        }
        self
    }

    pub(crate) fn cell(mut self, row: u16, col: u16, xf: u16, cell: FixtureCell) -> Self {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.cells.push((row, col, xf, cell));
        }
        self
    }

    /// Serializes the workbook into the bytes of an OLE compound file.
    pub(crate) fn build(&self) -> Vec<u8> {
        let workbook_stream = self.build_workbook_stream();
        let cursor = Cursor::new(Vec::new());
        let mut ole = cfb::CompoundFile::create(cursor).expect("create cfb");
        {
            let mut stream = ole.create_stream("Workbook").expect("Workbook stream");
            stream.write_all(&workbook_stream).expect("write Workbook stream");
        }
        ole.into_inner().into_inner()
    }

    pub(crate) fn write_temp(&self) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xls").tempfile().expect("temp file");
        file.write_all(&self.build()).expect("write fixture");
        file.flush().expect("flush fixture");
        file
    }

    fn build_workbook_stream(&self) -> Vec<u8> {
        let mut shared_strings: Vec<String> = Vec::new();
        for sheet in &self.sheets {
            for (_, _, _, cell) in &sheet.cells {
                if let FixtureCell::Shared(text) = cell {
                    if !shared_strings.contains(text) {
                        shared_strings.push(text.to_owned());
                    }
                }
            }
        }

        // -- Globals -------------------------------------------------------------
        let mut globals = Vec::<u8>::new();
        push_record(&mut globals, RECORD_BOF, &bof(BOF_DT_WORKBOOK_GLOBALS));
        if self.encrypted {
            push_record(&mut globals, RECORD_FILEPASS, &[0, 0, 0x34, 0x12, 0x78, 0x56]);
        }

        // Four plain fonts fill indexes 0-3; the fifth record becomes index 5.
        for _ in 0..4 {
            push_record(&mut globals, RECORD_FONT, &font("Arial", false));
        }
        push_record(&mut globals, RECORD_FONT, &font("Arial", true));

        push_record(&mut globals, RECORD_FORMAT, &format_record(FMT_DATE, "yyyy-mm-dd"));

        for _ in 0..16 {
            push_record(&mut globals, RECORD_XF, &xf_record(0, 0, 0));
        }
        push_record(&mut globals, RECORD_XF, &xf_record(0, 0, 0)); // XF_PLAIN
        push_record(&mut globals, RECORD_XF, &xf_record(FONT_ITALIC_INDEX, 0, 0)); // XF_ITALIC
        push_record(&mut globals, RECORD_XF, &xf_record(0, 0, BORDER_THIN_ALL)); // XF_BORDERED
        push_record(&mut globals, RECORD_XF, &xf_record(FONT_ITALIC_INDEX, 0, BORDER_THIN_ALL)); // XF_ITALIC_BORDERED
        push_record(&mut globals, RECORD_XF, &xf_record(0, FMT_DATE, 0)); // XF_DATE

        if !shared_strings.is_empty() {
            push_record(&mut globals, RECORD_SST, &sst(&shared_strings));
        }

        let mut boundsheet_offsets = Vec::new();
        for sheet in &self.sheets {
            let mut boundsheet = Vec::<u8>::new();
            boundsheet.extend_from_slice(&0u32.to_le_bytes()); // placeholder lbPlyPos
            boundsheet.extend_from_slice(&0u16.to_le_bytes()); // visible worksheet
            write_short_unicode_string(&mut boundsheet, &sheet.name);
            boundsheet_offsets.push(globals.len() + 4);
            push_record(&mut globals, RECORD_BOUNDSHEET, &boundsheet);
        }
        push_record(&mut globals, RECORD_EOF, &[]);

        // -- Sheets --------------------------------------------------------------
        let mut stream = globals;
        for (sheet, offset) in self.sheets.iter().zip(boundsheet_offsets) {
            let sheet_offset = stream.len() as u32;
            stream[offset..offset + 4].copy_from_slice(&sheet_offset.to_le_bytes());

            push_record(&mut stream, RECORD_BOF, &bof(BOF_DT_WORKSHEET));
            for (first, last, xf) in &sheet.columns {
                push_record(&mut stream, RECORD_COLINFO, &colinfo(*first, *last, *xf));
            }
            for (row, xf) in &sheet.rows {
                push_record(&mut stream, RECORD_ROW, &row_record(*row, *xf));
            }
            for (row, col, xf, cell) in &sheet.cells {
                write_cell(&mut stream, *row, *col, *xf, cell, &shared_strings);
            }
            push_record(&mut stream, RECORD_EOF, &[]);
        }
        stream
    }
}

fn write_cell(out: &mut Vec<u8>, row: u16, col: u16, xf: u16, cell: &FixtureCell, shared_strings: &[String]) {
    let mut data = Vec::<u8>::new();
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&col.to_le_bytes());
    match cell {
        FixtureCell::Number(value) => {
            data.extend_from_slice(&xf.to_le_bytes());
            data.extend_from_slice(&value.to_le_bytes());
            push_record(out, RECORD_NUMBER, &data);
        }
        FixtureCell::Rk(value) => {
            data.extend_from_slice(&xf.to_le_bytes());
            data.extend_from_slice(&rk_integer(*value).to_le_bytes());
            push_record(out, RECORD_RK, &data);
        }
        FixtureCell::Shared(text) => {
            let index = shared_strings.iter().position(|it| it == text).unwrap_or_default() as u32;
            data.extend_from_slice(&xf.to_le_bytes());
            data.extend_from_slice(&index.to_le_bytes());
            push_record(out, RECORD_LABELSST, &data);
        }
        FixtureCell::Label(text) => {
            data.extend_from_slice(&xf.to_le_bytes());
            let units: Vec<u16> = text.encode_utf16().collect();
            data.extend_from_slice(&(units.len() as u16).to_le_bytes());
            data.push(1); // fHighByte
            for unit in units {
                data.extend_from_slice(&unit.to_le_bytes());
            }
            push_record(out, RECORD_LABEL, &data);
        }
        FixtureCell::Bool(value) => {
            data.extend_from_slice(&xf.to_le_bytes());
            data.push(u8::from(*value));
            data.push(0); // fError
            push_record(out, RECORD_BOOLERR, &data);
        }
        FixtureCell::FormulaText(text) => {
            data.extend_from_slice(&xf.to_le_bytes());
            data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0xFF, 0xFF]); // string result
            data.extend_from_slice(&0u16.to_le_bytes()); // grbit
            data.extend_from_slice(&0u32.to_le_bytes()); // chn
            data.extend_from_slice(&0u16.to_le_bytes()); // cce
            push_record(out, RECORD_FORMULA, &data);

            let mut string = Vec::<u8>::new();
            write_unicode_string(&mut string, text);
            push_record(out, RECORD_STRING, &string);
        }
        FixtureCell::Blank => {
            data.extend_from_slice(&xf.to_le_bytes());
            push_record(out, RECORD_BLANK, &data);
        }
        FixtureCell::MulRk(values) => {
            for value in values {
                data.extend_from_slice(&xf.to_le_bytes());
                data.extend_from_slice(&rk_integer(*value).to_le_bytes());
            }
            let last = col + values.len() as u16 - 1;
            data.extend_from_slice(&last.to_le_bytes());
            push_record(out, RECORD_MULRK, &data);
        }
        FixtureCell::MulBlank(count) => {
            for _ in 0..*count {
                data.extend_from_slice(&xf.to_le_bytes());
            }
            let last = col + count - 1;
            data.extend_from_slice(&last.to_le_bytes());
            push_record(out, RECORD_MULBLANK, &data);
        }
    }
}

fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

fn bof(dt: u16) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..2].copy_from_slice(&BOF_VERSION_BIFF8.to_le_bytes());
    out[2..4].copy_from_slice(&dt.to_le_bytes());
    out[4..6].copy_from_slice(&0x0DBBu16.to_le_bytes()); // build
    out[6..8].copy_from_slice(&0x07CCu16.to_le_bytes()); // year (1996)
    out
}

fn font(name: &str, italic: bool) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    out.extend_from_slice(&200u16.to_le_bytes()); // height (10pt)
    let flags: u16 = if italic { 0x0002 } else { 0 };
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&0x7FFFu16.to_le_bytes()); // automatic color
    out.extend_from_slice(&400u16.to_le_bytes()); // weight
    out.extend_from_slice(&0u16.to_le_bytes()); // escapement
    out.extend_from_slice(&[0, 0, 0, 0]); // underline, family, charset, reserved
    write_short_unicode_string(&mut out, name);
    out
}

fn format_record(id: u16, code: &str) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    out.extend_from_slice(&id.to_le_bytes());
    write_unicode_string(&mut out, code);
    out
}

fn xf_record(font_idx: u16, fmt_idx: u16, border: u32) -> [u8; 20] {
    let mut out = [0u8; 20];
    out[0..2].copy_from_slice(&font_idx.to_le_bytes());
    out[2..4].copy_from_slice(&fmt_idx.to_le_bytes());
    out[4..6].copy_from_slice(&0x0001u16.to_le_bytes()); // locked cell XF
    out[6] = 0x20; // General + Bottom
    out[9] = 0x3F;
    out[10..14].copy_from_slice(&border.to_le_bytes());
    out
}

fn colinfo(first: u16, last: u16, xf: u16) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[0..2].copy_from_slice(&first.to_le_bytes());
    out[2..4].copy_from_slice(&last.to_le_bytes());
    out[4..6].copy_from_slice(&0x0900u16.to_le_bytes()); // width
    out[6..8].copy_from_slice(&xf.to_le_bytes());
    out
}

fn row_record(row: u16, xf: u16) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..2].copy_from_slice(&row.to_le_bytes());
    out[6..8].copy_from_slice(&0x00FFu16.to_le_bytes()); // height
    out[12..14].copy_from_slice(&(0x0100 | ROW_GHOST_DIRTY).to_le_bytes());
    out[14..16].copy_from_slice(&(xf & 0x0FFF).to_le_bytes());
    out
}

fn sst(strings: &[String]) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    out.extend_from_slice(&(strings.len() as u32).to_le_bytes()); // cstTotal
    out.extend_from_slice(&(strings.len() as u32).to_le_bytes()); // cstUnique
    for string in strings {
        write_unicode_string(&mut out, string);
    }
    out
}

fn rk_integer(value: i32) -> u32 {
    ((value << 2) as u32) | 0x02
}

fn write_short_unicode_string(out: &mut Vec<u8>, s: &str) {
    out.push(s.len() as u8);
    out.push(0); // compressed
    out.extend_from_slice(s.as_bytes());
}

fn write_unicode_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_le_bytes());
    out.push(0); // compressed
    out.extend_from_slice(s.as_bytes());
}
