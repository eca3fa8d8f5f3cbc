//! Bank credit exports (CDB, LCI, LCA, LF).
//!
//! Each offer spans two physical rows: the product line carries the text
//! columns and the line right below it carries the maturity date, in whatever
//! cell it happens to land.

use std::sync::LazyLock;

use models::{FormatFamily, RawRecord};
use regex::Regex;

use super::{not_applicable, token_regex};
use crate::sniffer::Sheet;
use crate::table::{Column, ColumnMap};
use crate::{Extractor, ImportError};

pub const KEYWORDS: &[(&str, Column)] = &[
    ("produto", Column::Product),
    ("prazo", Column::Term),
    ("taxa", Column::Rate),
    ("aplicacaominima", Column::MinInvestment),
    ("roa", Column::Roa),
    ("ir", Column::Tax),
];

pub const REQUIRED: &[Column] = &[Column::Product, Column::Rate];

/// Tax label when the sheet has no IR column.
pub const DEFAULT_TAX: &str = "Isento";

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| token_regex(&["CDB", "LCI", "LCA", "LF"]));

static LEADING_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date regex"));

pub struct BankingExtractor;

impl Extractor for BankingExtractor {
    fn family(&self) -> FormatFamily {
        FormatFamily::Banking
    }

    fn applicable(&self, sheet: &Sheet) -> Result<(), ImportError> {
        if SIGNATURE_RE.is_match(&sheet.upper_text()) {
            Ok(())
        } else {
            Err(not_applicable(self.family(), "no CDB/LCI/LCA/LF product"))
        }
    }

    fn extract(&self, sheet: &Sheet) -> Result<Vec<RawRecord>, ImportError> {
        let map = ColumnMap::from_header(sheet.header(), KEYWORDS);
        map.require(self.family(), REQUIRED)?;

        let grid = &sheet.grid;
        let mut out = Vec::new();

        for r in sheet.data_rows() {
            let row = grid.row(r);
            let Some(product) = map.cell(row, Column::Product) else {
                continue;
            };
            // The last product line has no partner row.
            if r + 1 >= grid.height() {
                continue;
            }
            let Some(maturity) = maturity_cell(grid.row(r + 1)) else {
                continue;
            };
            let Some(mut record) = RawRecord::new(product) else {
                continue;
            };

            record.term_text = map.cell(row, Column::Term).map(str::to_string);
            record.rate_text = map.text(row, Column::Rate);
            record.maturity_raw = maturity;
            record.min_investment_raw = map.text(row, Column::MinInvestment);
            record.roa_raw = map.cell(row, Column::Roa).map(str::to_string);
            record.tax_label = if map.has(Column::Tax) {
                map.text(row, Column::Tax)
            } else {
                DEFAULT_TAX.to_string()
            };
            out.push(record);
        }

        Ok(out)
    }
}

/// First cell, left to right, that starts with an ISO date. The time part is dropped.
fn maturity_cell(row: &[Option<String>]) -> Option<String> {
    row.iter()
        .flatten()
        .find(|c| LEADING_DATE_RE.is_match(c))
        .and_then(|c| c.split_whitespace().next())
        .map(str::to_string)
}
