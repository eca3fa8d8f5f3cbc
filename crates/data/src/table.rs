use std::collections::HashMap;
use std::fmt;

use data_normalization::text::{keyword_matches, normalize_label};
use models::FormatFamily;

use crate::ImportError;

/// Canonical column a header label can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Product,
    Term,
    Rate,
    Maturity,
    MinInvestment,
    Roa,
    Tax,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Product => "product",
            Column::Term => "term",
            Column::Rate => "rate",
            Column::Maturity => "maturity",
            Column::MinInvestment => "min_investment",
            Column::Roa => "roa",
            Column::Tax => "tax",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header positions resolved against one family's keyword table.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: HashMap<Column, usize>,
}

impl ColumnMap {
    /// Maps each header label to the first keyword it contains whose column is
    /// still free. Labels are visited left to right, blanks are skipped.
    pub fn from_header(header: &[Option<String>], keywords: &[(&str, Column)]) -> Self {
        let mut positions = HashMap::new();

        for (idx, label) in header.iter().enumerate() {
            let Some(label) = label else { continue };
            let normalized = normalize_label(label);
            if normalized.is_empty() {
                continue;
            }

            let hit = keywords.iter().find(|(kw, col)| {
                !positions.contains_key(col) && keyword_matches(&normalized, kw)
            });
            if let Some((_, col)) = hit {
                positions.insert(*col, idx);
            }
        }

        Self { positions }
    }

    pub fn get(&self, col: Column) -> Option<usize> {
        self.positions.get(&col).copied()
    }

    pub fn has(&self, col: Column) -> bool {
        self.positions.contains_key(&col)
    }

    /// Fails on the first missing required column.
    pub fn require(&self, family: FormatFamily, required: &[Column]) -> Result<(), ImportError> {
        match required.iter().find(|c| !self.has(**c)) {
            Some(col) => Err(ImportError::MissingRequiredColumn {
                family,
                column: col.as_str(),
            }),
            None => Ok(()),
        }
    }

    /// Cell under `col` in `row`, if the column is mapped and the cell is not blank.
    pub fn cell<'a>(&self, row: &'a [Option<String>], col: Column) -> Option<&'a str> {
        let idx = self.get(col)?;
        row.get(idx)?.as_deref()
    }

    /// Like [`ColumnMap::cell`] but blank or unmapped cells become "".
    pub fn text(&self, row: &[Option<String>], col: Column) -> String {
        self.cell(row, col).unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(labels: &[&str]) -> Vec<Option<String>> {
        labels
            .iter()
            .map(|l| if l.is_empty() { None } else { Some(l.to_string()) })
            .collect()
    }

    const KEYWORDS: &[(&str, Column)] = &[
        ("produto", Column::Product),
        ("vencimento", Column::Maturity),
        ("rentabilidade", Column::Rate),
        ("taxa", Column::Rate),
        ("ir", Column::Tax),
    ];

    #[test]
    fn test_first_label_wins_a_column() {
        let map = ColumnMap::from_header(
            &header(&["Produto", "", "Taxa", "Rentabilidade Anual", "Vencimento", "IR"]),
            KEYWORDS,
        );
        assert_eq!(map.get(Column::Product), Some(0));
        assert_eq!(map.get(Column::Rate), Some(2));
        assert_eq!(map.get(Column::Maturity), Some(4));
        assert_eq!(map.get(Column::Tax), Some(5));
    }

    #[test]
    fn test_require_reports_missing_column() {
        let map = ColumnMap::from_header(&header(&["Produto", "Taxa"]), KEYWORDS);
        let err = map
            .require(FormatFamily::Repo, &[Column::Product, Column::Rate, Column::Maturity])
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingRequiredColumn {
                family: FormatFamily::Repo,
                column: "maturity"
            }
        ));
    }

    #[test]
    fn test_cell_lookup() {
        let map = ColumnMap::from_header(&header(&["Produto", "Taxa"]), KEYWORDS);
        let row = header(&["CDB Banco XYZ", ""]);
        assert_eq!(map.cell(&row, Column::Product), Some("CDB Banco XYZ"));
        assert_eq!(map.cell(&row, Column::Rate), None);
        assert_eq!(map.text(&row, Column::Maturity), "");
    }
}
