//! Treasury bond exports.
//!
//! These sheets often carry leading empty columns under the data while the
//! header starts at column A, so labels are realigned onto the first data
//! column before mapping.

use std::sync::LazyLock;

use data_normalization::text::normalize_label;
use models::{FormatFamily, RawRecord};
use regex::Regex;

use super::{not_applicable, token_regex};
use crate::sniffer::Sheet;
use crate::table::{Column, ColumnMap};
use crate::{Extractor, ImportError};

pub const KEYWORDS: &[(&str, Column)] = &[
    ("produto", Column::Product),
    ("vencimento", Column::Maturity),
    ("rentabilidade", Column::Rate),
    ("precounitario", Column::MinInvestment),
];

pub const REQUIRED: &[Column] = &[
    Column::Product,
    Column::Maturity,
    Column::Rate,
    Column::MinInvestment,
];

pub const ISSUER_SUFFIX: &str = "Tesouro Nacional";
pub const TAX_LABEL: &str = "Tabela Regressiva";

/// How many leading columns are searched for the first data column.
const REALIGN_WINDOW: usize = 10;

static SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| token_regex(&["TESOURO", "LFT", "LTN", "NTN"]));

pub struct PublicBondsExtractor;

impl Extractor for PublicBondsExtractor {
    fn family(&self) -> FormatFamily {
        FormatFamily::PublicBonds
    }

    fn applicable(&self, sheet: &Sheet) -> Result<(), ImportError> {
        let unit_price_label = sheet
            .header()
            .iter()
            .flatten()
            .any(|label| normalize_label(label).contains("precounitario"));

        if unit_price_label || SIGNATURE_RE.is_match(&sheet.upper_text()) {
            Ok(())
        } else {
            Err(not_applicable(self.family(), "no treasury bond or unit price column"))
        }
    }

    fn extract(&self, sheet: &Sheet) -> Result<Vec<RawRecord>, ImportError> {
        let header = realigned_header(sheet);
        let map = ColumnMap::from_header(&header, KEYWORDS);
        map.require(self.family(), REQUIRED)?;

        let mut out = Vec::new();
        for r in sheet.data_rows() {
            let row = sheet.grid.row(r);
            let Some(product) = map.cell(row, Column::Product) else {
                continue;
            };
            let Some(mut record) = RawRecord::new(format!("{} {}", product, ISSUER_SUFFIX)) else {
                continue;
            };
            record.rate_text = map.text(row, Column::Rate);
            record.maturity_raw = map.text(row, Column::Maturity);
            record.min_investment_raw = map.text(row, Column::MinInvestment);
            record.tax_label = TAX_LABEL.to_string();
            out.push(record);
        }
        Ok(out)
    }
}

/// First column, within the window, holding any cell below the header.
fn first_data_column(sheet: &Sheet) -> usize {
    let width = sheet.grid.width().min(REALIGN_WINDOW);
    (0..width)
        .find(|&c| sheet.data_rows().any(|r| sheet.grid.cell(r, c).is_some()))
        .unwrap_or(0)
}

/// Binds the non-blank header labels, in order, to the columns starting at
/// the first data column.
fn realigned_header(sheet: &Sheet) -> Vec<Option<String>> {
    let labels: Vec<&String> = sheet.header().iter().flatten().collect();
    let start = first_data_column(sheet);

    let mut header = vec![None; sheet.grid.width().max(start + labels.len())];
    for (k, label) in labels.into_iter().enumerate() {
        header[start + k] = Some(label.clone());
    }
    header
}
