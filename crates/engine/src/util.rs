//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{Amount, EngineError, ResultEngine};

/// Trim a required text field and reject it when blank.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Comparison key for names: accents stripped, lowercase, punctuation and
/// whitespace collapsed to single spaces.
pub(crate) fn normalize_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Case-insensitive substring match used by list searches.
pub(crate) fn matches_search(needle: Option<&str>, haystacks: &[Option<&str>]) -> bool {
    let Some(needle) = needle.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    haystacks
        .iter()
        .flatten()
        .any(|hay| hay.to_lowercase().contains(&needle))
}

/// Reject zero, negative and non-finite amounts.
pub(crate) fn ensure_positive(value: f64, label: &str) -> ResultEngine<f64> {
    if !Amount::new(value).is_positive() {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(value)
}

/// Reject negative and non-finite amounts.
pub(crate) fn ensure_non_negative(value: f64, label: &str) -> ResultEngine<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be >= 0")));
    }
    Ok(value)
}

/// Fresh identifier, unique across every stored collection.
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_ignores_case_accents_and_spacing() {
        assert_eq!(normalize_key("  José   Pérez "), "jose perez");
        assert_eq!(normalize_key("JOSE-PEREZ"), "jose perez");
        assert_eq!(normalize_key("محمد"), "محمد");
    }

    #[test]
    fn search_matches_any_field() {
        assert!(matches_search(None, &[Some("Ali")]));
        assert!(matches_search(Some("  "), &[None]));
        assert!(matches_search(Some("al"), &[Some("Ali"), None]));
        assert!(matches_search(Some("0100"), &[Some("Ali"), Some("+20 0100")]));
        assert!(!matches_search(Some("zed"), &[Some("Ali"), None]));
    }

    #[test]
    fn amount_guards() {
        assert!(ensure_positive(0.0, "amount").is_err());
        assert!(ensure_positive(-2.0, "amount").is_err());
        assert!(ensure_positive(f64::NAN, "amount").is_err());
        assert!(ensure_positive(f64::INFINITY, "amount").is_err());
        assert_eq!(ensure_positive(1.5, "amount").unwrap(), 1.5);
        assert_eq!(ensure_non_negative(0.0, "price").unwrap(), 0.0);
        assert!(ensure_non_negative(-0.1, "price").is_err());
    }

    #[test]
    fn ids_carry_prefix_and_differ() {
        let a = new_id("trans");
        let b = new_id("trans");
        assert!(a.starts_with("trans-"));
        assert_ne!(a, b);
    }
}
