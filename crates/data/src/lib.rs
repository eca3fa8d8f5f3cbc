pub mod data_parsers;
pub mod dispatcher;
pub mod grid;
pub mod sniffer;
pub mod table;

use models::{FormatFamily, RawRecord};
use thiserror::Error;

pub use dispatcher::{dispatch, import_file, probe_family, Dispatched};
pub use grid::Grid;
pub use sniffer::{Sheet, SnifferConfig};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no header row found in the first {scanned} rows")]
    HeaderNotFound { scanned: usize },
    #[error("not a {family} sheet: {reason}")]
    FormatNotApplicable { family: FormatFamily, reason: String },
    #[error("no extractor accepts this sheet")]
    NoApplicableFormat,
    #[error("{family} sheet has no {column} column")]
    MissingRequiredColumn {
        family: FormatFamily,
        column: &'static str,
    },
    #[error("unsupported file: {0}")]
    UnsupportedFile(String),
    #[error("workbook has no data: {0}")]
    EmptyWorkbook(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
}

/// One institutional export layout.
pub trait Extractor {
    fn family(&self) -> FormatFamily;
    /// Checks the family signature. Rejects with [`ImportError::FormatNotApplicable`].
    fn applicable(&self, sheet: &Sheet) -> Result<(), ImportError>;
    /// Maps the header and rebuilds raw records from the data rows.
    fn extract(&self, sheet: &Sheet) -> Result<Vec<RawRecord>, ImportError>;
}
