//! Debenture exports. Offers are identified by the "S.A." company suffix
//! in the product column ("Eletrobras S.A. ELET23").

use data_normalization::taxonomy::has_debenture_suffix;
use models::{FormatFamily, RawRecord};

use super::{not_applicable, single_row_record};
use crate::sniffer::Sheet;
use crate::table::{Column, ColumnMap};
use crate::{Extractor, ImportError};

pub const KEYWORDS: &[(&str, Column)] = &[
    ("ativo", Column::Product),
    ("produto", Column::Product),
    ("vencimento", Column::Maturity),
    ("rentabilidade", Column::Rate),
    ("taxa", Column::Rate),
    ("ir", Column::Tax),
    ("aplicacaominima", Column::MinInvestment),
    ("roa", Column::Roa),
];

pub const REQUIRED: &[Column] = &[Column::Product, Column::Rate, Column::Maturity];

pub struct DebentureExtractor;

impl Extractor for DebentureExtractor {
    fn family(&self) -> FormatFamily {
        FormatFamily::Debenture
    }

    fn applicable(&self, sheet: &Sheet) -> Result<(), ImportError> {
        let map = ColumnMap::from_header(sheet.header(), KEYWORDS);
        let has_suffix = sheet
            .data_rows()
            .filter_map(|r| map.cell(sheet.grid.row(r), Column::Product))
            .any(has_debenture_suffix);

        if has_suffix {
            Ok(())
        } else {
            Err(not_applicable(self.family(), "no S.A issuer in the product column"))
        }
    }

    fn extract(&self, sheet: &Sheet) -> Result<Vec<RawRecord>, ImportError> {
        let map = ColumnMap::from_header(sheet.header(), KEYWORDS);
        map.require(self.family(), REQUIRED)?;

        let records = sheet
            .data_rows()
            .filter_map(|r| single_row_record(&map, sheet.grid.row(r)))
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::sniffer::SnifferConfig;

    fn sheet(rows: Vec<Vec<&str>>) -> Sheet {
        Sheet::sniff(Grid::from_rows(rows), &SnifferConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_debentures() {
        let sheet = sheet(vec![
            vec!["Ativo", "Vencimento", "Taxa", "IR", "Aplicação Mínima", "ROA"],
            vec!["Eletrobras S.A. ELET23", "15/09/2031", "IPCA + 6,5%", "Isento", "1.000,00", "1,5%"],
            vec!["Vale S/A VALE38", "2033-03-01", "CDI + 1,2%", "Isento", "1.000,00", ""],
        ]);
        assert!(DebentureExtractor.applicable(&sheet).is_ok());

        let records = DebentureExtractor.extract(&sheet).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].product_full_text, "Vale S/A VALE38");
        assert_eq!(records[1].roa_raw, None);
    }

    #[test]
    fn test_requires_company_suffix_in_product_cells() {
        // The suffix elsewhere in the sheet does not count
        let sheet = sheet(vec![
            vec!["Emitido por XYZ S.A.", "", ""],
            vec!["Produto", "Vencimento", "Taxa"],
            vec!["Fundo ABC", "2030-01-01", "12% a.a."],
        ]);
        assert!(DebentureExtractor.applicable(&sheet).is_err());
    }
}
