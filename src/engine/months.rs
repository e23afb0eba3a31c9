//! Calendar-month resolution
//!
//! Month parameters arrive as whatever the classifier extracted from the
//! user's message: a number, or a Spanish or English month name, full or
//! abbreviated. Resolution is case-insensitive and fails explicitly for
//! anything unrecognized.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref MONTH_NAMES: HashMap<&'static str, u32> = {
        let mut map = HashMap::new();

        // Spanish months
        map.insert("enero", 1);
        map.insert("febrero", 2);
        map.insert("marzo", 3);
        map.insert("abril", 4);
        map.insert("mayo", 5);
        map.insert("junio", 6);
        map.insert("julio", 7);
        map.insert("agosto", 8);
        map.insert("septiembre", 9);
        map.insert("octubre", 10);
        map.insert("noviembre", 11);
        map.insert("diciembre", 12);

        // English months
        map.insert("january", 1);
        map.insert("february", 2);
        map.insert("march", 3);
        map.insert("april", 4);
        map.insert("may", 5);
        map.insert("june", 6);
        map.insert("july", 7);
        map.insert("august", 8);
        map.insert("september", 9);
        map.insert("october", 10);
        map.insert("november", 11);
        map.insert("december", 12);

        // Short forms (both languages)
        map.insert("ene", 1);
        map.insert("feb", 2);
        map.insert("mar", 3);
        map.insert("abr", 4);
        map.insert("jun", 6);
        map.insert("jul", 7);
        map.insert("ago", 8);
        map.insert("sep", 9);
        map.insert("sept", 9);
        map.insert("oct", 10);
        map.insert("nov", 11);
        map.insert("dic", 12);
        map.insert("jan", 1);
        map.insert("apr", 4);
        map.insert("aug", 8);
        map.insert("dec", 12);

        map
    };
}

/// Resolve a month reference to its calendar number.
///
/// Accepts `1..=12` as digits or a known month name; anything else is `None`
/// so callers can produce a parameter-specific failure instead of silently
/// defaulting.
pub fn resolve_month(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(number) = trimmed.parse::<u32>() {
        return (1..=12).contains(&number).then_some(number);
    }

    MONTH_NAMES.get(trimmed.to_lowercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_months() {
        assert_eq!(resolve_month("1"), Some(1));
        assert_eq!(resolve_month("12"), Some(12));
        assert_eq!(resolve_month(" 8 "), Some(8));
    }

    #[test]
    fn test_numeric_out_of_range_fails() {
        assert_eq!(resolve_month("0"), None);
        assert_eq!(resolve_month("13"), None);
    }

    #[test]
    fn test_spanish_names() {
        assert_eq!(resolve_month("agosto"), Some(8));
        assert_eq!(resolve_month("ENERO"), Some(1));
        assert_eq!(resolve_month("Diciembre"), Some(12));
    }

    #[test]
    fn test_english_names() {
        assert_eq!(resolve_month("august"), Some(8));
        assert_eq!(resolve_month("January"), Some(1));
    }

    #[test]
    fn test_abbreviations_in_both_languages() {
        assert_eq!(resolve_month("ago"), Some(8));
        assert_eq!(resolve_month("aug"), Some(8));
        assert_eq!(resolve_month("dic"), Some(12));
        assert_eq!(resolve_month("dec"), Some(12));
        assert_eq!(resolve_month("sept"), Some(9));
    }

    #[test]
    fn test_name_and_number_agree() {
        assert_eq!(resolve_month("september"), resolve_month("9"));
        assert_eq!(resolve_month("septiembre"), resolve_month("9"));
    }

    #[test]
    fn test_unknown_input_fails_explicitly() {
        assert_eq!(resolve_month("sometime"), None);
        assert_eq!(resolve_month("augustus"), None);
        assert_eq!(resolve_month(""), None);
    }
}
