use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$[\d,]+").unwrap());
static NON_ALNUM_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Compatibility-normalized, whitespace-collapsed text, so full-width or
/// otherwise decorated characters read like their plain forms.
pub fn normalize_text(text: &str) -> String {
    clean_text(&text.nfkc().collect::<String>())
}

/// Upper-cased form used for substring matching.
pub fn match_key(text: &str) -> String {
    normalize_text(text).to_uppercase()
}

/// First dollar amount in `text`, e.g. `$350,000`.
pub fn extract_price(text: &str) -> Option<String> {
    PRICE_PATTERN.find(text).map(|m| m.as_str().to_string())
}

/// Unit number from an address: the text after the last `#`, up to the
/// first comma, trimmed. Addresses without `#` have no unit, even when they
/// end in a bare number.
pub fn derive_unit(address: &str) -> String {
    match address.rsplit_once('#') {
        Some((_, tail)) => tail.split(',').next().unwrap_or_default().trim().to_string(),
        None => String::new(),
    }
}

/// "The Iron Lung" -> "the-iron-lung"
pub fn slugify(text: &str) -> String {
    NON_ALNUM_RUNS
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Cuts `text` to `max` characters, ending in "..." when anything was dropped.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
