use std::sync::LazyLock;

use models::UNKNOWN_ISSUER;
use regex::Regex;

use crate::text::squash_spaces;

/// Institution names and abbreviations that mark where the issuer starts.
pub const ISSUER_KEYWORDS: &[&str] = &[
    "Banco",
    "Agibank",
    "BDMG",
    "Genial",
    "XP",
    "BTG",
    "Daycoval",
    "C6",
    "Bmg",
    "Fibra",
    "Haitong",
    "Master",
    "Omni",
    "Pine",
    "Rodobens",
    "Voiter",
    "Digimais",
    "Facta",
    "Agrolend",
    "Tesouro Nacional",
];

/// Verbose issuer names and their canonical short form.
pub const ISSUER_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Banco BTG Pactual", "BTG Pactual"),
    ("Banco Daycoval", "Daycoval"),
    ("Banco C6 Consignado", "C6"),
    ("Banco BMG", "BMG"),
    ("Banco Agibank", "Agibank"),
];

static ISSUER_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = ISSUER_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})", alternatives)).expect("valid issuer keyword regex")
});

static PRIVATE_CREDIT_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(CRA|CRI|CDCA)\s*[-–—:]\s*(.+?)\s*$").expect("valid private credit regex")
});

static SERIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+((?:\d+\s*[ªºa°]?\s*)?s[ée]rie\b.*)$").expect("valid series regex")
});

static DEBENTURE_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.+?\bS\s?[./]\s?A(?:\.|\b))\s+(\S.*?)\s*$").expect("valid debenture regex")
});

/// Bank and private credit codes that open an offer text. Such texts are never
/// debenture tickers, even when the issuer carries an S.A. suffix.
static LEADING_PRODUCT_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:CDB|LCA|LCI|LF|CRA|CRI|CDCA)\b").expect("valid product code regex")
});

static NO_VENCIMENTO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)no vencimento").expect("valid boilerplate regex"));

static DAILY_NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdi[aá]ria.*$").expect("valid daily note regex"));

/// Product and issuer recovered from a combined text cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerSplit {
    pub product: String,
    pub issuer: String,
    /// Liquidity note cut from the issuer text ("Diária com carência de 90 dias").
    pub annotation: Option<String>,
}

impl IssuerSplit {
    fn unknown(product: String) -> Self {
        Self {
            product,
            issuer: UNKNOWN_ISSUER.to_string(),
            annotation: None,
        }
    }

    /// Issuer with its liquidity note, for display only.
    pub fn display(&self) -> String {
        match &self.annotation {
            Some(note) => format!("{} ({})", self.issuer, note),
            None => self.issuer.clone(),
        }
    }
}

/// Splits "product + issuer" free text into its two parts.
///
/// Shape rules for private credit ("CRA - ISSUER SÉRIE") and debentures
/// ("ISSUER S.A. TICKER") run before the generic keyword search.
pub fn split_product_and_issuer(full: &str) -> IssuerSplit {
    let full = squash_spaces(full);

    if let Some(split) = split_private_credit(&full) {
        return split;
    }
    if let Some(split) = split_debenture(&full) {
        return split;
    }

    let Some(m) = ISSUER_KEYWORD_RE.find(&full) else {
        let product = squash_spaces(&NO_VENCIMENTO_RE.replace_all(&full, ""));
        return IssuerSplit::unknown(product);
    };

    let product = trim_trailing_dash(full[..m.start()].trim());
    let raw_issuer = NO_VENCIMENTO_RE.replace_all(&full[m.start()..], "");
    let (issuer, annotation) = canonicalize_issuer(&raw_issuer);

    IssuerSplit {
        product,
        issuer,
        annotation,
    }
}

fn split_private_credit(full: &str) -> Option<IssuerSplit> {
    let caps = PRIVATE_CREDIT_SHAPE_RE.captures(full)?;
    let code = caps.get(1)?.as_str().to_uppercase();
    let rest = caps.get(2)?.as_str();

    let (issuer_text, product) = match SERIES_RE.captures(rest) {
        Some(series) => {
            let whole = series.get(0)?;
            let series_text = series.get(1)?.as_str().trim();
            (&rest[..whole.start()], format!("{} {}", code, series_text))
        }
        None => (rest, code),
    };

    let (issuer, annotation) = canonicalize_issuer(issuer_text);
    Some(IssuerSplit {
        product,
        issuer,
        annotation,
    })
}

fn split_debenture(full: &str) -> Option<IssuerSplit> {
    if LEADING_PRODUCT_CODE_RE.is_match(full) {
        return None;
    }
    let caps = DEBENTURE_SHAPE_RE.captures(full)?;
    let issuer_text = caps.get(1)?.as_str();
    let product = squash_spaces(&NO_VENCIMENTO_RE.replace_all(caps.get(2)?.as_str(), ""));
    if product.is_empty() {
        return None;
    }

    let (issuer, annotation) = canonicalize_issuer(issuer_text);
    Some(IssuerSplit {
        product,
        issuer,
        annotation,
    })
}

/// Applies the abbreviation table, strips a leading "Banco " and cuts the
/// trailing daily-liquidity note.
pub fn canonicalize_issuer(raw: &str) -> (String, Option<String>) {
    let mut issuer = squash_spaces(raw);

    let mut annotation = None;
    if let Some(m) = DAILY_NOTE_RE.find(&issuer) {
        annotation = Some(m.as_str().trim().to_string());
        let cut = m.start();
        issuer.truncate(cut);
    }

    for (full, abbr) in ISSUER_ABBREVIATIONS {
        if issuer.contains(full) {
            issuer = issuer.replace(full, abbr);
        }
    }

    let issuer = trim_trailing_dash(issuer.trim());
    let issuer = match issuer.strip_prefix("Banco ") {
        Some(rest) if !rest.trim().is_empty() => rest.trim().to_string(),
        _ => issuer,
    };

    if issuer.is_empty() {
        (UNKNOWN_ISSUER.to_string(), annotation)
    } else {
        (issuer, annotation)
    }
}

fn trim_trailing_dash(s: &str) -> String {
    s.trim_end_matches(['-', '–', '—']).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_split_strips_banco_prefix() {
        let split = split_product_and_issuer("CDB Banco XYZ");
        assert_eq!(split.product, "CDB");
        assert_eq!(split.issuer, "XYZ");
        assert_eq!(split.display(), "XYZ");
    }

    #[test]
    fn test_abbreviation_table() {
        let split = split_product_and_issuer("LCA - Banco BTG Pactual No vencimento");
        assert_eq!(split.product, "LCA");
        assert_eq!(split.issuer, "BTG Pactual");

        let split = split_product_and_issuer("CDB Banco C6 Consignado");
        assert_eq!(split.issuer, "C6");
    }

    #[test]
    fn test_daily_note_becomes_annotation() {
        let split = split_product_and_issuer("CDB Liquidez Master Diária com carência de 30 dias");
        assert_eq!(split.product, "CDB Liquidez");
        assert_eq!(split.issuer, "Master");
        assert_eq!(split.annotation.as_deref(), Some("Diária com carência de 30 dias"));
        assert_eq!(split.display(), "Master (Diária com carência de 30 dias)");
    }

    #[test]
    fn test_no_keyword_means_unknown_issuer() {
        let split = split_product_and_issuer("LCI Pós No vencimento");
        assert_eq!(split.issuer, UNKNOWN_ISSUER);
        assert_eq!(split.product, "LCI Pós");
    }

    #[test]
    fn test_keyword_needs_word_start() {
        // "XP" inside "EXPORT" must not split the text
        let split = split_product_and_issuer("CDB EXPORT");
        assert_eq!(split.issuer, UNKNOWN_ISSUER);
    }

    #[test]
    fn test_private_credit_shape() {
        let split = split_product_and_issuer("CRA – Raízen Energia 3ª Série");
        assert_eq!(split.product, "CRA 3ª Série");
        assert_eq!(split.issuer, "Raízen Energia");

        let split = split_product_and_issuer("CRI - Direcional Engenharia");
        assert_eq!(split.product, "CRI");
        assert_eq!(split.issuer, "Direcional Engenharia");
    }

    #[test]
    fn test_debenture_shape() {
        let split = split_product_and_issuer("Eletrobras S.A. ELET23");
        assert_eq!(split.issuer, "Eletrobras S.A.");
        assert_eq!(split.product, "ELET23");

        let split = split_product_and_issuer("Vale S/A VALE38 IPCA");
        assert_eq!(split.issuer, "Vale S/A");
        assert_eq!(split.product, "VALE38 IPCA");
    }

    #[test]
    fn test_bank_offer_with_company_suffix_is_not_a_debenture() {
        let split = split_product_and_issuer("CDB Banco Master S.A. Diária");
        assert_eq!(split.product, "CDB");
        assert_eq!(split.issuer, "Master S.A.");
        assert_eq!(split.annotation.as_deref(), Some("Diária"));

        let split = split_product_and_issuer("LCA Banco BTG Pactual S.A. No vencimento");
        assert_eq!(split.product, "LCA");
        assert_eq!(split.issuer, "BTG Pactual S.A.");

        let split = split_product_and_issuer("CDB Banco Daycoval S/A");
        assert_eq!(split.product, "CDB");
        assert_eq!(split.issuer, "Daycoval S/A");
    }

    #[test]
    fn test_debenture_ticker_drops_boilerplate() {
        let split = split_product_and_issuer("Eletrobras S.A. ELET23 No vencimento");
        assert_eq!(split.issuer, "Eletrobras S.A.");
        assert_eq!(split.product, "ELET23");
    }

    #[test]
    fn test_public_bond_issuer() {
        let split = split_product_and_issuer("Tesouro IPCA+ 2029 Tesouro Nacional");
        assert_eq!(split.product, "Tesouro IPCA+ 2029");
        assert_eq!(split.issuer, "Tesouro Nacional");
    }
}
