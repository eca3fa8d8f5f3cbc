use std::collections::BTreeSet;

use models::{AssetCategory, CanonicalAsset, ProductType, RateKind, UNKNOWN_ISSUER};
use serde::{Deserialize, Serialize};

/// Values available for each filter, sorted and unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<AssetCategory>,
    /// Maturity years of term assets only.
    pub years: Vec<i32>,
    pub product_types: Vec<ProductType>,
    pub rate_kinds: Vec<RateKind>,
    pub issuers: Vec<String>,
    pub tax_treatments: Vec<String>,
}

impl FilterOptions {
    pub fn from_assets(assets: &[CanonicalAsset]) -> Self {
        fn sorted<T: Ord>(it: impl Iterator<Item = T>) -> Vec<T> {
            it.collect::<BTreeSet<_>>().into_iter().collect()
        }

        Self {
            categories: sorted(assets.iter().map(|a| a.category)),
            years: sorted(
                assets
                    .iter()
                    .filter(|a| !a.is_daily_liquid)
                    .map(|a| a.maturity_year),
            ),
            product_types: sorted(assets.iter().map(|a| a.product_type)),
            rate_kinds: sorted(assets.iter().map(|a| a.rate_kind)),
            issuers: sorted(
                assets
                    .iter()
                    .filter(|a| a.issuer != UNKNOWN_ISSUER)
                    .map(|a| a.issuer.clone()),
            ),
            tax_treatments: sorted(assets.iter().map(|a| a.tax_treatment.clone())),
        }
    }
}

/// User selection applied before ranking. Empty lists mean "any".
///
/// `daily_liquid` switches between the two views: on keeps only daily-liquid
/// assets, off keeps only term assets and honours the year filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetFilter {
    pub years: Vec<i32>,
    pub product_types: Vec<ProductType>,
    pub rate_kinds: Vec<RateKind>,
    pub issuers: Vec<String>,
    pub tax_treatments: Vec<String>,
    pub daily_liquid: bool,
}

impl AssetFilter {
    pub fn matches(&self, asset: &CanonicalAsset) -> bool {
        if self.daily_liquid != asset.is_daily_liquid {
            return false;
        }
        if !self.daily_liquid && !allows(&self.years, &asset.maturity_year) {
            return false;
        }
        allows(&self.tax_treatments, &asset.tax_treatment)
            && allows(&self.product_types, &asset.product_type)
            && allows(&self.rate_kinds, &asset.rate_kind)
            && allows(&self.issuers, &asset.issuer)
    }

    pub fn apply(&self, assets: &[CanonicalAsset]) -> Vec<CanonicalAsset> {
        assets.iter().filter(|a| self.matches(a)).cloned().collect()
    }
}

fn allows<T: PartialEq>(wanted: &[T], value: &T) -> bool {
    wanted.is_empty() || wanted.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn asset(issuer: &str, year: i32, daily: bool, kind: RateKind) -> CanonicalAsset {
        CanonicalAsset {
            product: "CDB".to_string(),
            issuer: issuer.to_string(),
            issuer_display: issuer.to_string(),
            product_type: ProductType::Cdb,
            category: AssetCategory::CreditoBancario,
            rate_text: "110% CDI".to_string(),
            rate_value: 110.0,
            rate_kind: kind,
            maturity: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            maturity_year: year,
            min_investment: None,
            roa: None,
            tax_treatment: "Isento".to_string(),
            is_daily_liquid: daily,
            is_grace_free: false,
        }
    }

    fn sample() -> Vec<CanonicalAsset> {
        vec![
            asset("XYZ", 2027, false, RateKind::PosCdi),
            asset("Pine", 2026, false, RateKind::HibridoIpca),
            asset("N/A", 2030, true, RateKind::PosCdi),
            asset("XYZ", 2026, false, RateKind::PosCdi),
        ]
    }

    #[test]
    fn test_filter_options() {
        let opts = FilterOptions::from_assets(&sample());
        assert_eq!(opts.years, vec![2026, 2027]);
        assert_eq!(opts.issuers, vec!["Pine", "XYZ"]);
        assert_eq!(opts.rate_kinds, vec![RateKind::PosCdi, RateKind::HibridoIpca]);
        assert_eq!(opts.tax_treatments, vec!["Isento"]);
        assert_eq!(opts.categories, vec![AssetCategory::CreditoBancario]);
    }

    #[test]
    fn test_default_filter_keeps_term_assets() {
        let kept = AssetFilter::default().apply(&sample());
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|a| !a.is_daily_liquid));
    }

    #[test]
    fn test_daily_liquid_view_ignores_years() {
        let filter = AssetFilter {
            daily_liquid: true,
            years: vec![2026],
            ..Default::default()
        };
        let kept = filter.apply(&sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].maturity_year, 2030);
    }

    #[test]
    fn test_combined_filters() {
        let filter = AssetFilter {
            years: vec![2026],
            issuers: vec!["XYZ".to_string()],
            rate_kinds: vec![RateKind::PosCdi],
            ..Default::default()
        };
        let kept = filter.apply(&sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].issuer, "XYZ");
        assert_eq!(kept[0].maturity_year, 2026);
    }
}
