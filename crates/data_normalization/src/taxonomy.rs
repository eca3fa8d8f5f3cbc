use std::sync::LazyLock;

use models::{ProductType, RateKind};
use regex::Regex;

use crate::text::fold_diacritics;

static PUBLIC_BOND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:TESOURO|LFT|LTN|NTN)\b").expect("valid public bond regex"));

static DEBENTURE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bS\s?[./]\s?A(?:\.|\b)").expect("valid S.A regex"));

static CODED_PRODUCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:CDB|LCA|LCI|LF|CRA|CRI|CDCA)\b").expect("valid product code regex")
});

static TERM_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\sS$").expect("valid term suffix regex"));

/// Whole-word product codes, checked in this order.
static PRODUCT_TOKENS: LazyLock<Vec<(Regex, ProductType)>> = LazyLock::new(|| {
    [
        ("LCA", ProductType::Lca),
        ("LCI", ProductType::Lci),
        ("CDB", ProductType::Cdb),
        ("CRA", ProductType::Cra),
        ("CRI", ProductType::Cri),
        ("CDCA", ProductType::Cdca),
        ("LF", ProductType::Lf),
    ]
    .into_iter()
    .map(|(token, kind)| {
        let re = Regex::new(&format!(r"\b{}\b", token)).expect("valid product token regex");
        (re, kind)
    })
    .collect()
});

/// True when the text carries an "S.A" / "S/A" company suffix.
pub fn has_debenture_suffix(text: &str) -> bool {
    DEBENTURE_SUFFIX_RE.is_match(text)
}

/// Maps a product to its type code.
///
/// Public bonds win over everything, then debentures (by company suffix or by
/// name), repos, and finally the plain product codes. A CDB or CRA issued by an
/// S.A. company keeps its code.
pub fn classify_product(product: &str, full_text: &str) -> ProductType {
    let product_up = fold_diacritics(product).to_uppercase();
    let full_up = fold_diacritics(full_text).to_uppercase();

    if PUBLIC_BOND_RE.is_match(&product_up) || PUBLIC_BOND_RE.is_match(&full_up) {
        return ProductType::TituloPublico;
    }

    let coded_product = CODED_PRODUCT_RE.is_match(&product_up);
    if !coded_product
        && (has_debenture_suffix(full_text)
            || product_up.contains("DEBENTURE")
            || full_up.contains("DEBENTURE"))
    {
        return ProductType::Debenture;
    }

    if product_up.contains("COMPROMISSADA") || full_up.contains("COMPROMISSADA") {
        return ProductType::Compromissada;
    }

    for (re, kind) in PRODUCT_TOKENS.iter() {
        if re.is_match(&product_up) {
            return *kind;
        }
    }
    for (re, kind) in PRODUCT_TOKENS.iter() {
        if re.is_match(&full_up) {
            return *kind;
        }
    }

    ProductType::Outros
}

/// Rate indexer read from the free-form rate text.
pub fn classify_rate(rate_text: &str) -> RateKind {
    let s = fold_diacritics(rate_text).to_lowercase();
    if s.contains("cdi") {
        RateKind::PosCdi
    } else if s.contains("ipca") {
        RateKind::HibridoIpca
    } else if s.contains("% a.a") || s.contains("prefixado") || s.contains("pre-fixado") {
        RateKind::PreFixado
    } else {
        RateKind::Outros
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Liquidity {
    pub is_daily_liquid: bool,
    pub is_grace_free: bool,
}

/// Derives the liquidity flags from the term cell and the full product text.
///
/// "d+" marks an asset as daily-liquid and, at the same time, rules out
/// grace-free. Grace-free always implies daily-liquid.
pub fn liquidity_flags(term: Option<&str>, full_text: &str) -> Liquidity {
    let term = term.unwrap_or("");
    let term_lc = term.to_lowercase();
    let full_lc = full_text.to_lowercase();
    let either = |needle: &str| term_lc.contains(needle) || full_lc.contains(needle);

    let is_daily_liquid = ["diaria", "diária", "d+"].iter().any(|k| either(k))
        || TERM_SUFFIX_RE.is_match(term.trim());

    let has_grace = ["carência", "carencia", "d+"].iter().any(|k| either(k));

    Liquidity {
        is_daily_liquid,
        is_grace_free: is_daily_liquid && !has_grace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_bonds_first() {
        assert_eq!(
            classify_product("Tesouro IPCA+ 2029", "Tesouro IPCA+ 2029 Tesouro Nacional"),
            ProductType::TituloPublico
        );
        assert_eq!(classify_product("LFT 2027", "LFT 2027"), ProductType::TituloPublico);
    }

    #[test]
    fn test_debenture_by_suffix_or_name() {
        assert_eq!(classify_product("ELET23", "Eletrobras S.A. ELET23"), ProductType::Debenture);
        assert_eq!(classify_product("Debênture VALE", "Debênture VALE"), ProductType::Debenture);
    }

    #[test]
    fn test_private_credit_code_beats_company_suffix() {
        assert_eq!(
            classify_product("CRA 3ª Série", "CRA - Raízen Energia S.A. 3ª Série"),
            ProductType::Cra
        );
    }

    #[test]
    fn test_bank_code_beats_company_suffix() {
        assert_eq!(classify_product("CDB", "CDB Banco Master S.A. Diária"), ProductType::Cdb);
        assert_eq!(
            classify_product("LCA", "LCA Banco BTG Pactual S.A. No vencimento"),
            ProductType::Lca
        );
        assert_eq!(classify_product("CDB", "CDB Banco Daycoval S/A"), ProductType::Cdb);
    }

    #[test]
    fn test_product_codes() {
        assert_eq!(classify_product("CDB", "CDB Banco XYZ"), ProductType::Cdb);
        assert_eq!(classify_product("LCA", "LCA - Banco BTG Pactual"), ProductType::Lca);
        assert_eq!(classify_product("LF Sub", "LF Sub Banco Pine"), ProductType::Lf);
        assert_eq!(classify_product("Compromissada", "Compromissada XP"), ProductType::Compromissada);
        assert_eq!(classify_product("Fundo X", "Fundo X"), ProductType::Outros);
    }

    #[test]
    fn test_codes_need_whole_words() {
        // "LF" inside "SELF" is not a financial letter
        assert_eq!(classify_product("SELF", "SELF"), ProductType::Outros);
    }

    #[test]
    fn test_rate_kind() {
        assert_eq!(classify_rate("110% do CDI"), RateKind::PosCdi);
        assert_eq!(classify_rate("IPCA + 6,25%"), RateKind::HibridoIpca);
        assert_eq!(classify_rate("13,4% a.a."), RateKind::PreFixado);
        assert_eq!(classify_rate("Pré-fixado"), RateKind::PreFixado);
        assert_eq!(classify_rate("Selic"), RateKind::Outros);
    }

    #[test]
    fn test_liquidity_daily_with_grace() {
        let flags = liquidity_flags(None, "CDB Liquidez Master Diária com carência de 30 dias");
        assert!(flags.is_daily_liquid);
        assert!(!flags.is_grace_free);
    }

    #[test]
    fn test_liquidity_grace_free() {
        let flags = liquidity_flags(Some("Diária"), "CDB Banco XYZ");
        assert_eq!(
            flags,
            Liquidity {
                is_daily_liquid: true,
                is_grace_free: true
            }
        );
    }

    #[test]
    fn test_liquidity_d_plus_is_daily_but_never_grace_free() {
        let flags = liquidity_flags(Some("D+1"), "CDB Banco XYZ");
        assert!(flags.is_daily_liquid);
        assert!(!flags.is_grace_free);
    }

    #[test]
    fn test_liquidity_term_suffix() {
        assert!(liquidity_flags(Some("Liquidez S"), "CDB").is_daily_liquid);
        assert!(!liquidity_flags(Some("720 dias"), "CDB").is_daily_liquid);
    }
}
