pub mod banking;
pub mod debenture;
pub mod private_credit;
pub mod public_bonds;
pub mod repo;

use models::{FormatFamily, RawRecord};
use regex::Regex;

use crate::table::{Column, ColumnMap};
use crate::ImportError;

pub use banking::BankingExtractor;
pub use debenture::DebentureExtractor;
pub use private_credit::PrivateCreditExtractor;
pub use public_bonds::PublicBondsExtractor;
pub use repo::RepoExtractor;

pub(crate) fn not_applicable(family: FormatFamily, reason: impl Into<String>) -> ImportError {
    ImportError::FormatNotApplicable {
        family,
        reason: reason.into(),
    }
}

/// Whole-word alternation over upper-case tokens.
pub(crate) fn token_regex(tokens: &[&str]) -> Regex {
    let pattern = format!(r"\b(?:{})\b", tokens.join("|"));
    Regex::new(&pattern).expect("valid token regex")
}

/// Reads a one-row record from whatever columns the family mapped.
pub(crate) fn single_row_record(map: &ColumnMap, row: &[Option<String>]) -> Option<RawRecord> {
    let product = map.cell(row, Column::Product)?;
    let mut record = RawRecord::new(product)?;
    record.term_text = map.cell(row, Column::Term).map(str::to_string);
    record.rate_text = map.text(row, Column::Rate);
    record.maturity_raw = map.text(row, Column::Maturity);
    record.min_investment_raw = map.text(row, Column::MinInvestment);
    record.roa_raw = map.cell(row, Column::Roa).map(str::to_string);
    if let Some(tax) = map.cell(row, Column::Tax) {
        record.tax_label = tax.to_string();
    }
    Some(record)
}
