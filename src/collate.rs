//! Locale-aware ordering for contact names and categories.
//!
//! Names are compared on a folded key: accents are stripped, non-Latin
//! scripts are transliterated to Latin, case is ignored and runs of
//! whitespace are collapsed. Two strings with the same key fall back to a
//! plain comparison so the resulting order is total.

use std::cmp::Ordering;

use deunicode::deunicode;
use unicode_script::{Script, UnicodeScript};

/// Check if a string contains only Latin characters (plus common punctuation/digits).
pub fn is_all_latin(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii()
            || c.script() == Script::Latin
            || c.script() == Script::Common
            || c.script() == Script::Inherited
    })
}

/// Check if transliteration would produce a meaningfully different result.
/// Returns false if the string is already Latin or would transliterate to itself.
pub fn needs_transliteration(s: &str) -> bool {
    if is_all_latin(s) {
        return false;
    }
    let transliterated = transliterate(s);
    !transliterated.is_empty() && transliterated != s
}

/// Transliterate a string to ASCII/Latin, collapsing whitespace.
pub fn transliterate(s: &str) -> String {
    let result = deunicode(s);
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Folded comparison key.
pub fn collation_key(s: &str) -> String {
    if s.is_ascii() {
        return s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    }
    transliterate(s).to_lowercase()
}

pub fn compare(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_all_latin() {
        assert!(is_all_latin("Ana Maria"));
        assert!(is_all_latin("Família"));
        assert!(is_all_latin("+55 11 9999-0000"));
        assert!(!is_all_latin("Иван Петров"));
        assert!(!is_all_latin("Ana Иванова"));
    }

    #[test]
    fn test_needs_transliteration() {
        assert!(!needs_transliteration("João"));
        assert!(needs_transliteration("Иван"));
        assert!(needs_transliteration("田中"));
    }

    #[test]
    fn test_collation_key_folds_case_and_accents() {
        assert_eq!(collation_key("Álvaro"), "alvaro");
        assert_eq!(collation_key("  Ana   Maria "), "ana maria");
        assert_eq!(collation_key("Иван"), "ivan");
    }

    #[test]
    fn test_accents_sort_with_base_letter() {
        // Byte order would put "É" after "Z".
        assert_eq!(compare("Érica", "Zeca"), Ordering::Less);
        assert_eq!(compare("álvaro", "Bruno"), Ordering::Less);
        assert_eq!(compare("Família", "Personal"), Ordering::Less);
    }

    #[test]
    fn test_case_is_ignored_before_tiebreak() {
        assert_eq!(compare("ana", "Bruno"), Ordering::Less);
        assert_eq!(compare("Bruno", "ana"), Ordering::Greater);
        // Same key, ordering decided by the raw strings.
        assert_eq!(compare("Ana", "ana"), Ordering::Less);
        assert_eq!(compare("Ana", "Ana"), Ordering::Equal);
    }
}
