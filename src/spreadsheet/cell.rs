/// Header texts must be longer than this many characters (after trimming).
pub(crate) const HEADER_MIN_LENGTH: usize = 5;

/// Types of cell data in a legacy worksheet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum CellType {
    /// No record for this position
    #[default]
    Empty,
    /// Formatted cell without a value (BLANK / MULBLANK)
    Blank,
    /// Text values (inline or shared)
    Text,
    /// Numeric values
    Number,
    /// Numeric values carrying a date/time number format
    Date,
    /// Boolean values, stored as 0 or 1
    Boolean,
    /// Error codes, stored as their numeric code
    Error,
}

impl CellType {
    /// Checks built-in Excel number format IDs for date/time formats.
    pub(crate) fn is_builtin_date_format(id: u16) -> bool {
        matches!(id, 14..=22 | 45..=47)
    }

    /// Scans a custom number format code for date or time tokens,
    /// ignoring escaped characters, quoted literals and bracketed sections.
    pub(crate) fn is_date_format(format: &str) -> bool {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' | 'H' | 'h' | 'S' | 's' => return true,
                _ => (),
            }
        }
        false
    }

    /// Numeric type for a value stored under a given number format.
    pub(crate) fn for_number(is_date: bool) -> Self {
        if is_date {
            Self::Date
        } else {
            Self::Number
        }
    }
}

/// Raw cell value: number, text or nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Truthiness of the raw value: non-zero numbers and non-empty text.
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Number(value) => *value != 0.0,
            Self::Text(text) => !text.is_empty(),
        }
    }

    /// A value that counts as data: a non-zero number or non-blank text.
    pub(crate) fn has_content(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Number(value) => *value != 0.0,
            Self::Text(text) => !text.trim().is_empty(),
        }
    }

    pub(crate) fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Presence of a visible border line on each edge of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Borders {
    pub(crate) top: bool,
    pub(crate) bottom: bool,
    pub(crate) left: bool,
    pub(crate) right: bool,
}

impl Borders {
    /// Builds border flags from BIFF line-style codes (0 means no line).
    pub(crate) fn from_line_styles(top: u8, bottom: u8, left: u8, right: u8) -> Self {
        Borders {
            top: top > 0,
            bottom: bottom > 0,
            left: left > 0,
            right: right > 0,
        }
    }

    pub(crate) fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

/// The style facts table detection relies on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CellStyle {
    pub(crate) italic: bool,
    pub(crate) border: Borders,
}

/// Immutable snapshot of one grid position.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Cell {
    pub(crate) value: CellValue,
    pub(crate) kind: CellType,
    pub(crate) style: CellStyle,
}

impl Cell {
    /// Italic text longer than [`HEADER_MIN_LENGTH`] characters once trimmed.
    pub(crate) fn is_header_candidate(&self) -> bool {
        self.style.italic
            && self
                .value
                .as_text()
                .map(|text| text.trim().chars().count() > HEADER_MIN_LENGTH)
                .unwrap_or(false)
    }

    /// Display form used when a row is collected into a table.
    ///
    /// Plain numbers in `(0, 1]` are shown as percentages with two decimals.
    /// Falsy values (empty, zero, empty text) become the empty string.
    pub(crate) fn display_text(&self) -> String {
        match &self.value {
            CellValue::Number(value) if self.kind == CellType::Number && *value > 0.0 && *value <= 1.0 => {
                format!("{:.2}%", value * 100.0)
            }
            value if !value.is_truthy() => String::new(),
            CellValue::Number(value) => match self.kind {
                CellType::Boolean | CellType::Error => format!("{}", *value as i64),
                _ => format_number(*value),
            },
            CellValue::Text(text) => text.to_owned(),
            CellValue::Empty => String::new(),
        }
    }
}

#[cfg(test)]
impl Cell {
    pub(crate) fn number(value: f64) -> Self {
        Cell {
            value: CellValue::Number(value),
            kind: CellType::Number,
            style: CellStyle::default(),
        }
    }

    pub(crate) fn text(value: &str) -> Self {
        Cell {
            value: CellValue::Text(value.to_owned()),
            kind: CellType::Text,
            style: CellStyle::default(),
        }
    }

    pub(crate) fn blank() -> Self {
        Cell {
            value: CellValue::Empty,
            kind: CellType::Blank,
            style: CellStyle::default(),
        }
    }

    pub(crate) fn italic(mut self) -> Self {
        self.style.italic = true;
        self
    }

    pub(crate) fn bordered(mut self) -> Self {
        self.style.border = Borders::from_line_styles(1, 1, 1, 1);
        self
    }
}

/// Shortest round-trip rendering that keeps a decimal point on integral
/// values (`50000.0`, `3.5`, `-2.0`). Exponents carry a sign and at least
/// two digits (`1e+16`, `1.5e-05`).
pub(crate) fn format_number(value: f64) -> String {
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}
