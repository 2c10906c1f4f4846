use crate::spreadsheet::cell::CellValue;
use regex::Regex;
use std::sync::LazyLock;

static CURRENCY_SYMBOLS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[$,]").expect("Hardcode regex pattern"));

/// Input of [`normalize`]: a raw number, a display text or anything else.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum RawValue<'a> {
    Number(f64),
    Text(&'a str),
    Other,
}

impl From<f64> for RawValue<'_> {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(value: &'a str) -> Self {
        RawValue::Text(value)
    }
}

impl<'a> From<&'a CellValue> for RawValue<'a> {
    fn from(value: &'a CellValue) -> Self {
        match value {
            CellValue::Number(number) => RawValue::Number(*number),
            CellValue::Text(text) => RawValue::Text(text),
            CellValue::Empty => RawValue::Other,
        }
    }
}

/// Converts a value to a number, understanding `$1,234` and `12.5%`.
///
/// Percent texts keep their scale: `"10%"` is `10.0`, matching the
/// percentage display of fractions in extracted tables.
/// NaN, blank text and anything unparsable are `None`.
pub(crate) fn normalize<'a>(raw: impl Into<RawValue<'a>>) -> Option<f64> {
    let value = match raw.into() {
        RawValue::Number(number) => Some(number),
        RawValue::Text(text) if !text.trim().is_empty() => {
            let cleaned = CURRENCY_SYMBOLS.replace_all(text.trim(), "");
            cleaned.trim_end_matches('%').trim().parse::<f64>().ok()
        }
        _ => None,
    };
    value.filter(|number| !number.is_nan())
}
