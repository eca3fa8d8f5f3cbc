use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lower-cases, folds diacritics and drops every non-alphanumeric character.
///
/// "Preço Unitário" -> "precounitario", "Prazo/Vencimento" -> "prazovencimento".
pub fn normalize_label(s: &str) -> String {
    fold_diacritics(s)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Removes combining marks after canonical decomposition ("Diária" -> "Diaria").
pub fn fold_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Matches a vocabulary keyword against a normalized label.
///
/// Short keywords ("ir", "roa") only match a whole label, otherwise "ir" would
/// hit any header that happens to contain those letters.
pub fn keyword_matches(normalized: &str, keyword: &str) -> bool {
    if keyword.len() <= 3 {
        normalized == keyword
    } else {
        normalized.contains(keyword)
    }
}

/// Collapses internal runs of whitespace.
pub fn squash_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
