//! Private credit exports (CRA, CRI, CDCA).

use std::sync::LazyLock;

use models::{FormatFamily, RawRecord};
use regex::Regex;

use super::{not_applicable, single_row_record, token_regex};
use crate::sniffer::Sheet;
use crate::table::{Column, ColumnMap};
use crate::{Extractor, ImportError};

pub const KEYWORDS: &[(&str, Column)] = &[
    ("produto", Column::Product),
    ("ativo", Column::Product),
    ("vencimento", Column::Maturity),
    ("rentabilidade", Column::Rate),
    ("taxa", Column::Rate),
    ("ir", Column::Tax),
    ("aplicacaominima", Column::MinInvestment),
    ("roa", Column::Roa),
];

pub const REQUIRED: &[Column] = &[Column::Product, Column::Rate, Column::Maturity];

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| token_regex(&["CRA", "CRI", "CDCA"]));

pub struct PrivateCreditExtractor;

impl Extractor for PrivateCreditExtractor {
    fn family(&self) -> FormatFamily {
        FormatFamily::PrivateCredit
    }

    fn applicable(&self, sheet: &Sheet) -> Result<(), ImportError> {
        if SIGNATURE_RE.is_match(&sheet.upper_text()) {
            Ok(())
        } else {
            Err(not_applicable(self.family(), "no CRA/CRI/CDCA product"))
        }
    }

    fn extract(&self, sheet: &Sheet) -> Result<Vec<RawRecord>, ImportError> {
        let map = ColumnMap::from_header(sheet.header(), KEYWORDS);
        map.require(self.family(), REQUIRED)?;

        let records = sheet
            .data_rows()
            .filter_map(|r| single_row_record(&map, sheet.grid.row(r)))
            .filter(|record| !record.rate_text.is_empty())
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::sniffer::SnifferConfig;

    #[test]
    fn test_rows_without_rate_are_skipped() {
        let grid = Grid::from_rows(vec![
            vec!["Produto e Ativo", "Vencimento", "Rentabilidade Anual", "IR", "Aplicação Mínima", "ROA"],
            vec!["CRA – Raízen Energia 3ª Série", "2030-07-15", "IPCA + 6,10%", "Isento", "1000", "1,2%"],
            vec!["CRI - Direcional Engenharia", "2029-01-10", "", "Isento", "1000", ""],
        ]);
        let sheet = Sheet::sniff(grid, &SnifferConfig::default()).unwrap();
        assert!(PrivateCreditExtractor.applicable(&sheet).is_ok());

        let records = PrivateCreditExtractor.extract(&sheet).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_full_text, "CRA – Raízen Energia 3ª Série");
        assert_eq!(records[0].roa_raw.as_deref(), Some("1,2%"));
        assert_eq!(records[0].tax_label, "Isento");
    }

    #[test]
    fn test_missing_maturity_column() {
        let grid = Grid::from_rows(vec![
            vec!["Ativo", "Taxa"],
            vec!["CRI - Direcional", "IPCA + 7%"],
        ]);
        let sheet = Sheet::sniff(grid, &SnifferConfig::default()).unwrap();
        assert!(matches!(
            PrivateCreditExtractor.extract(&sheet),
            Err(ImportError::MissingRequiredColumn {
                family: FormatFamily::PrivateCredit,
                column: "maturity"
            })
        ));
    }
}
