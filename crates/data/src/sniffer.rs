use data_normalization::text::{keyword_matches, normalize_label};
use models::Settings;
use tracing::debug;

use crate::grid::Grid;
use crate::ImportError;

/// Labels that show up in the header row of every known export layout.
pub const HEADER_VOCABULARY: &[&str] = &[
    "produto",
    "risco",
    "taxa",
    "prazo",
    "vencimento",
    "rentabilidade",
    "precounitario",
    "aplicacaominima",
    "ativo",
    "ir",
    "roa",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnifferConfig {
    pub scan_rows: usize,
    pub min_hits: usize,
}

impl Default for SnifferConfig {
    fn default() -> Self {
        Self {
            scan_rows: 20,
            min_hits: 2,
        }
    }
}

impl From<&Settings> for SnifferConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            scan_rows: settings.header_scan_rows,
            min_hits: settings.header_min_hits,
        }
    }
}

/// Number of distinct vocabulary keywords found among the row's cells.
pub fn header_score(row: &[Option<String>]) -> usize {
    let labels: Vec<String> = row
        .iter()
        .flatten()
        .map(|c| normalize_label(c))
        .filter(|l| !l.is_empty())
        .collect();

    HEADER_VOCABULARY
        .iter()
        .filter(|kw| labels.iter().any(|l| keyword_matches(l, kw)))
        .count()
}

/// Finds the first row within the scan window that scores enough hits.
pub fn find_header_row(grid: &Grid, config: &SnifferConfig) -> Result<usize, ImportError> {
    let scanned = grid.height().min(config.scan_rows);
    for r in 0..scanned {
        let score = header_score(grid.row(r));
        if score >= config.min_hits {
            debug!(row = r, score, "header row found");
            return Ok(r);
        }
    }
    Err(ImportError::HeaderNotFound { scanned })
}

/// A grid together with the row its header sits on.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub grid: Grid,
    pub header_row: usize,
}

impl Sheet {
    pub fn sniff(grid: Grid, config: &SnifferConfig) -> Result<Self, ImportError> {
        let header_row = find_header_row(&grid, config)?;
        Ok(Self { grid, header_row })
    }

    pub fn header(&self) -> &[Option<String>] {
        self.grid.row(self.header_row)
    }

    /// Row indices strictly below the header.
    pub fn data_rows(&self) -> std::ops::Range<usize> {
        (self.header_row + 1)..self.grid.height()
    }

    /// Upper-cased text of the whole sheet, used for family signatures.
    pub fn upper_text(&self) -> String {
        self.grid.flattened_text().to_uppercase()
    }
}
