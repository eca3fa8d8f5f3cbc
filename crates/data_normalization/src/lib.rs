//! Turns extractor output into canonical assets.
//!
//! Field parsing is lenient (see [`fields`]) but the row filter is strict: a
//! record without a rate value or a valid maturity never becomes a
//! [`CanonicalAsset`].

pub mod fields;
pub mod issuer;
pub mod taxonomy;
pub mod text;

use chrono::Datelike;
use models::{CanonicalAsset, RawRecord, UNKNOWN_TAX};
use thiserror::Error;

use crate::fields::{parse_date, parse_money, parse_percent, parse_rate_value};
use crate::issuer::split_product_and_issuer;
use crate::taxonomy::{classify_product, classify_rate, liquidity_flags};

/// Why a record was dropped during canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("product text is empty")]
    EmptyProduct,
    #[error("no numeric rate in {0:?}")]
    MissingRate(String),
    #[error("no valid maturity in {0:?}")]
    MissingMaturity(String),
    #[error("maturity year {0} is not four digits")]
    InvalidMaturityYear(i32),
}

/// Converts one raw record into a canonical asset, or says why it cannot.
pub fn canonicalize(record: &RawRecord) -> Result<CanonicalAsset, Rejection> {
    let full_text = text::squash_spaces(&record.product_full_text);
    if full_text.is_empty() {
        return Err(Rejection::EmptyProduct);
    }

    let rate_value = parse_rate_value(&record.rate_text)
        .value()
        .ok_or_else(|| Rejection::MissingRate(record.rate_text.clone()))?;

    let maturity = parse_date(&record.maturity_raw)
        .value()
        .ok_or_else(|| Rejection::MissingMaturity(record.maturity_raw.clone()))?;
    let maturity_year = maturity.year();
    if !(1000..=9999).contains(&maturity_year) {
        return Err(Rejection::InvalidMaturityYear(maturity_year));
    }

    let split = split_product_and_issuer(&full_text);
    let product_type = classify_product(&split.product, &full_text);
    let liquidity = liquidity_flags(record.term_text.as_deref(), &full_text);

    let tax_treatment = match record.tax_label.trim() {
        "" => UNKNOWN_TAX.to_string(),
        label => label.to_string(),
    };

    Ok(CanonicalAsset {
        issuer_display: split.display(),
        product: split.product,
        issuer: split.issuer,
        product_type,
        category: product_type.category(),
        rate_text: record.rate_text.trim().to_string(),
        rate_value,
        rate_kind: classify_rate(&record.rate_text),
        maturity,
        maturity_year,
        min_investment: parse_money(&record.min_investment_raw).value(),
        roa: record
            .roa_raw
            .as_deref()
            .and_then(|raw| parse_percent(raw).value()),
        tax_treatment,
        is_daily_liquid: liquidity.is_daily_liquid,
        is_grace_free: liquidity.is_grace_free,
    })
}

/// Canonicalizes every record, silently dropping the ones that fail.
pub fn canonicalize_all(records: &[RawRecord]) -> Vec<CanonicalAsset> {
    records.iter().filter_map(|r| canonicalize(r).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use models::{AssetCategory, ProductType, RateKind, UNKNOWN_ISSUER};

    fn record(text: &str, rate: &str, maturity: &str) -> RawRecord {
        RawRecord {
            product_full_text: text.to_string(),
            term_text: None,
            rate_text: rate.to_string(),
            maturity_raw: maturity.to_string(),
            min_investment_raw: String::new(),
            roa_raw: None,
            tax_label: String::new(),
        }
    }

    #[test]
    fn test_banking_pair_record() {
        let mut rec = record("CDB Banco XYZ", "110% do CDI", "2026-05-10");
        rec.min_investment_raw = "R$ 1.000,00".to_string();
        rec.roa_raw = Some("2%".to_string());
        rec.tax_label = "Isento".to_string();

        let asset = canonicalize(&rec).unwrap();
        assert_eq!(asset.product, "CDB");
        assert_eq!(asset.issuer, "XYZ");
        assert_eq!(asset.product_type, ProductType::Cdb);
        assert_eq!(asset.category, AssetCategory::CreditoBancario);
        assert_eq!(asset.rate_value, 110.0);
        assert_eq!(asset.rate_kind, RateKind::PosCdi);
        assert_eq!(asset.maturity, NaiveDate::from_ymd_opt(2026, 5, 10).unwrap());
        assert_eq!(asset.maturity_year, 2026);
        assert_eq!(asset.min_investment, Some(1000.0));
        assert_eq!(asset.roa, Some(0.02));
        assert_eq!(asset.tax_treatment, "Isento");
        assert!(!asset.is_daily_liquid);
    }

    #[test]
    fn test_roa_above_one_is_read_as_percent() {
        let mut rec = record("CDB Banco XYZ", "110% do CDI", "2026-05-10");
        rec.roa_raw = Some("1,5%".to_string());
        assert_eq!(canonicalize(&rec).unwrap().roa, Some(0.015));
    }

    #[test]
    fn test_rows_without_rate_or_maturity_are_dropped() {
        assert_eq!(
            canonicalize(&record("CDB Banco XYZ", "CDI", "2026-05-10")),
            Err(Rejection::MissingRate("CDI".to_string()))
        );
        assert!(matches!(
            canonicalize(&record("CDB Banco XYZ", "110%", "no vencimento")),
            Err(Rejection::MissingMaturity(_))
        ));
        assert_eq!(
            canonicalize(&record("   ", "110%", "2026-05-10")),
            Err(Rejection::EmptyProduct)
        );
    }

    #[test]
    fn test_tax_defaults_to_unknown() {
        let asset = canonicalize(&record("LCI Pós", "95% CDI", "10/05/2027")).unwrap();
        assert_eq!(asset.tax_treatment, UNKNOWN_TAX);
        assert_eq!(asset.issuer, UNKNOWN_ISSUER);
        assert_eq!(asset.product_type, ProductType::Lci);
    }

    #[test]
    fn test_daily_note_flags_and_display() {
        let rec = record(
            "CDB Liquidez Master Diária com carência de 30 dias",
            "100% CDI",
            "2027-01-04",
        );
        let asset = canonicalize(&rec).unwrap();
        assert_eq!(asset.issuer, "Master");
        assert_eq!(asset.issuer_display, "Master (Diária com carência de 30 dias)");
        assert!(asset.is_daily_liquid);
        assert!(!asset.is_grace_free);
    }

    #[test]
    fn test_bank_offers_from_sa_issuers_stay_bank_credit() {
        let cases = [
            ("CDB Banco Master S.A. Diária", "CDB", "Master S.A.", ProductType::Cdb),
            ("LCA Banco BTG Pactual S.A. No vencimento", "LCA", "BTG Pactual S.A.", ProductType::Lca),
            ("CDB Banco Daycoval S/A", "CDB", "Daycoval S/A", ProductType::Cdb),
        ];
        for (text, product, issuer, product_type) in cases {
            let asset = canonicalize(&record(text, "110% do CDI", "2027-01-04")).unwrap();
            assert_eq!(asset.product, product);
            assert_eq!(asset.issuer, issuer);
            assert_eq!(asset.product_type, product_type);
            assert_eq!(asset.category, AssetCategory::CreditoBancario);
        }

        let daily = canonicalize(&record(cases[0].0, "100% CDI", "2027-01-04")).unwrap();
        assert_eq!(daily.issuer_display, "Master S.A. (Diária)");
        assert!(daily.is_grace_free);
    }

    #[test]
    fn test_bare_year_is_not_a_maturity() {
        assert_eq!(
            canonicalize(&record("CDB Banco XYZ", "110% do CDI", "2029")),
            Err(Rejection::MissingMaturity("2029".to_string()))
        );
    }

    #[test]
    fn test_invariants_hold_for_every_kept_row() {
        let records = vec![
            record("CDB Banco XYZ", "110% do CDI", "2026-05-10"),
            record("LCA Banco Pine Diária", "92% CDI", "2026-12-01"),
            record("Tesouro Selic 2029 Tesouro Nacional", "SELIC + 0,1%", "01/03/2029"),
            record("CRA - Raízen 1ª Série", "IPCA + 6%", "45894"),
            record("CDB Banco Master", "", "2026-05-10"),
        ];
        let assets = canonicalize_all(&records);
        assert_eq!(assets.len(), 4);
        for a in &assets {
            assert_eq!(a.category, a.product_type.category());
            assert!((1000..=9999).contains(&a.maturity_year));
            assert!(!a.is_grace_free || a.is_daily_liquid);
        }
    }
}
