//! Lenient per-field parsers.
//!
//! None of these functions fail: a garbled or missing cell resolves to
//! [`FieldValue::Absent`] or [`FieldValue::Unparseable`] and the row-level filter in
//! [`crate::canonicalize`] decides whether the row survives.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;

static RATE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid rate regex"));

static THOUSANDS_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d{1,3}\.\d{3}$").expect("valid thousands regex"));

/// Outcome of parsing one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<T> {
    Parsed(T),
    /// The cell was empty.
    Absent,
    /// The cell had text that could not be read as the expected type.
    Unparseable,
}

impl<T> FieldValue<T> {
    pub fn value(self) -> Option<T> {
        match self {
            FieldValue::Parsed(v) => Some(v),
            FieldValue::Absent | FieldValue::Unparseable => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, FieldValue::Parsed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldValue<U> {
        match self {
            FieldValue::Parsed(v) => FieldValue::Parsed(f(v)),
            FieldValue::Absent => FieldValue::Absent,
            FieldValue::Unparseable => FieldValue::Unparseable,
        }
    }
}

/// Parses Brazilian-style currency text: "R$ 1.500,00" -> 1500.0.
pub fn parse_money(raw: &str) -> FieldValue<f64> {
    let s = raw.replace("R$", "").replace('$', "");
    parse_decimal(&s)
}

/// Parses a percentage into a fraction.
///
/// Values above 1 are taken to be written in percent and divided by 100, so both
/// "12,5%" and "0,125" come out as 0.125. A value of exactly 1 stays 1.
pub fn parse_percent(raw: &str) -> FieldValue<f64> {
    let s = raw.replace('%', "");
    parse_decimal(&s).map(|n| if n > 1.0 { n / 100.0 } else { n })
}

/// First numeral anywhere in free-form rate text: "110% do CDI" -> 110.0.
pub fn parse_rate_value(raw: &str) -> FieldValue<f64> {
    if raw.trim().is_empty() {
        return FieldValue::Absent;
    }
    match RATE_NUMBER_RE.find(raw) {
        Some(m) => match m.as_str().replace(',', ".").parse::<f64>() {
            Ok(v) => FieldValue::Parsed(v),
            Err(_) => FieldValue::Unparseable,
        },
        None => FieldValue::Unparseable,
    }
}

/// Parses a maturity cell.
///
/// Handles:
/// - ISO dates, optionally with a time part ("2026-05-10 00:00:00")
/// - day-first dates ("10/05/2026"), then month-first ("05/30/2026")
/// - Excel serial numbers (days since 1899-12-30)
pub fn parse_date(raw: &str) -> FieldValue<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return FieldValue::Absent;
    }

    // A bare four-digit number is a year, never a serial date
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return FieldValue::Unparseable;
    }

    if let Ok(serial) = s.parse::<f64>() {
        return match excel_serial_to_date(serial) {
            Some(d) => FieldValue::Parsed(d),
            None => FieldValue::Unparseable,
        };
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return FieldValue::Parsed(dt.date());
        }
    }

    // Drop a trailing time component for the date-only formats.
    let date_part = s.split_whitespace().next().unwrap_or(s);

    const ISO: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    const DAY_FIRST: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y"];
    const MONTH_FIRST: [&str; 2] = ["%m/%d/%Y", "%m-%d-%Y"];

    for fmt in ISO.iter().chain(DAY_FIRST.iter()).chain(MONTH_FIRST.iter()) {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
            return FieldValue::Parsed(d);
        }
    }

    FieldValue::Unparseable
}

/// Excel serial date conversion using the 1899-12-30 base.
pub fn excel_serial_to_date(v: f64) -> Option<NaiveDate> {
    if !v.is_finite() || !(1.0..100000.0).contains(&v) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(v.floor() as i64))
}

/// Shared numeric cleanup for money and percentages.
fn parse_decimal(raw: &str) -> FieldValue<f64> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{00a0}')
        .collect();

    if cleaned.is_empty() || cleaned == "-" || cleaned == "--" {
        return FieldValue::Absent;
    }

    if cleaned.contains(',') {
        // "1.234,56": dots group thousands, comma is the decimal mark
        cleaned = cleaned.replace('.', "").replace(',', ".");
    } else if cleaned.matches('.').count() > 1 || THOUSANDS_GROUP_RE.is_match(&cleaned) {
        // "1.500" or "1.500.000"
        cleaned = cleaned.replace('.', "");
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => FieldValue::Parsed(v),
        _ => FieldValue::Unparseable,
    }
}
