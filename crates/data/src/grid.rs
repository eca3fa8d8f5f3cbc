use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use data_normalization::fields::excel_serial_to_date;

use crate::ImportError;

/// A header-less sheet: every cell as trimmed text, blanks as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Option<String>>>,
}

impl Grid {
    /// Builds a grid from literal rows. Empty strings become blank cells.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| clean(c.as_ref())).collect())
            .collect();
        Self { rows }
    }

    /// Loads the first sheet of a workbook, or a whole CSV file.
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let grid = match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path)?,
            "csv" => load_csv(path)?,
            _ => return Err(ImportError::UnsupportedFile(path.display().to_string())),
        };

        if grid.is_blank() {
            return Err(ImportError::EmptyWorkbook(path.display().to_string()));
        }
        Ok(grid)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn row(&self, r: usize) -> &[Option<String>] {
        self.rows.get(r).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn cell(&self, r: usize, c: usize) -> Option<&str> {
        self.rows.get(r)?.get(c)?.as_deref()
    }

    /// All non-blank cells joined by spaces, row by row.
    pub fn flattened_text(&self) -> String {
        self.rows
            .iter()
            .flatten()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_none)
    }
}

fn load_workbook(path: &Path) -> Result<Grid, ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(ImportError::EmptyWorkbook(path.display().to_string())),
    };

    let rows = range
        .rows()
        .map(|row| row.iter().map(|c| cell_str(Some(c))).collect())
        .collect();
    Ok(Grid { rows })
}

fn load_csv(path: &Path) -> Result<Grid, ImportError> {
    let content = fs::read_to_string(path)?;
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(clean).collect());
    }
    Ok(Grid { rows })
}

/// Text form of a workbook cell.
///
/// Integral floats lose their ".0" and date cells come out as
/// "YYYY-MM-DD 00:00:00", the same shape text exports use.
fn cell_str(cell: Option<&Data>) -> Option<String> {
    let c = cell?;
    let s = match c {
        Data::Empty => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(d) => d.format("%Y-%m-%d 00:00:00").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => return None,
    };
    clean(&s)
}

fn clean(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
