//! Repurchase agreement ("compromissada") exports. One row per offer.

use std::sync::LazyLock;

use models::{FormatFamily, RawRecord};
use regex::Regex;

use super::{not_applicable, single_row_record, token_regex};
use crate::sniffer::Sheet;
use crate::table::{Column, ColumnMap};
use crate::{Extractor, ImportError};

pub const KEYWORDS: &[(&str, Column)] = &[
    ("produto", Column::Product),
    ("vencimento", Column::Maturity),
    ("rentabilidade", Column::Rate),
    ("taxa", Column::Rate),
    ("ir", Column::Tax),
    ("aplicacaominima", Column::MinInvestment),
];

pub const REQUIRED: &[Column] = &[Column::Product, Column::Rate, Column::Maturity];

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| token_regex(&["COMPROMISSADA"]));

pub struct RepoExtractor;

impl Extractor for RepoExtractor {
    fn family(&self) -> FormatFamily {
        FormatFamily::Repo
    }

    fn applicable(&self, sheet: &Sheet) -> Result<(), ImportError> {
        if SIGNATURE_RE.is_match(&sheet.upper_text()) {
            Ok(())
        } else {
            Err(not_applicable(self.family(), "no COMPROMISSADA product"))
        }
    }

    fn extract(&self, sheet: &Sheet) -> Result<Vec<RawRecord>, ImportError> {
        let map = ColumnMap::from_header(sheet.header(), KEYWORDS);
        map.require(self.family(), REQUIRED)?;

        let records = sheet
            .data_rows()
            .filter_map(|r| single_row_record(&map, sheet.grid.row(r)))
            .map(|mut record| {
                // ROA is never published for repos.
                record.roa_raw = None;
                record
            })
            .collect();
        Ok(records)
    }
}
