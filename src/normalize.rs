//! Canonical textual form of a candidate address.
//!
//! [`normalize_address`] is total and idempotent: it never rejects input, it
//! only strips diacritics, edge noise and case. Whatever residue remains is
//! judged by [`crate::validator::validate_format`].

use unicode_general_category::{GeneralCategory, get_general_category};
use unicode_normalization::UnicodeNormalization;

/// Returns the canonical form of `input`.
///
/// Decomposes to NFD, drops nonspacing marks (`Mn`), recomposes to NFC, trims
/// whitespace and `.` from both ends, then folds to lowercase.
///
/// ```
/// assert_eq!(mailfix::normalize_address("Ñoño@gmail.com."), "nono@gmail.com");
/// ```
pub fn normalize_address(input: &str) -> String {
    let stripped = strip_marks(input);
    // " a. " et "a ." doivent converger: on retire espaces et points ensemble.
    let trimmed = stripped.trim_matches(is_edge_noise);
    let lowered = trimmed.to_lowercase();

    // certaines minuscules réintroduisent une marque combinante
    if lowered.chars().any(is_nonspacing_mark) {
        strip_marks(&lowered)
    } else {
        lowered
    }
}

fn strip_marks(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_nonspacing_mark(*c))
        .nfc()
        .collect()
}

fn is_nonspacing_mark(c: char) -> bool {
    get_general_category(c) == GeneralCategory::NonspacingMark
}

fn is_edge_noise(c: char) -> bool {
    c == '.' || c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_diacritics_and_case() {
        let cases = [
            ("Rocío.sylvester@gmail.com", "rocio.sylvester@gmail.com"),
            ("sylvester@gmail.com.", "sylvester@gmail.com"),
            (
                "UPPER_EMAIL_IS_INVALID@gmail.com",
                "upper_email_is_invalid@gmail.com",
            ),
            (".dontstartwithdot@gmail.com", "dontstartwithdot@gmail.com"),
            ("Ñooo@gmail.com", "nooo@gmail.com"),
            ("Ñoño@gmail.com", "nono@gmail.com"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_address(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn decomposed_input_matches_composed() {
        // "i" + U+0301 COMBINING ACUTE ACCENT
        assert_eq!(normalize_address("Roci\u{301}o@x.com"), "rocio@x.com");
    }

    #[test]
    fn trims_mixed_edge_noise() {
        assert_eq!(normalize_address("  ..a@b.com . "), "a@b.com");
        assert_eq!(normalize_address("a@b.com ."), "a@b.com");
        assert_eq!(normalize_address(" . "), "");
    }

    #[test]
    fn only_nonspacing_marks_are_dropped() {
        // U+20DD COMBINING ENCLOSING CIRCLE (Me), U+0903 DEVANAGARI SIGN VISARGA (Mc)
        let enclosed = normalize_address("ab\u{20DD}cd@gmail.com");
        assert_eq!(enclosed, "ab\u{20DD}cd@gmail.com");
        assert_eq!(
            crate::validate_format(&enclosed).map_err(|err| err.kind()),
            Err("bad-user-format")
        );
        assert_eq!(normalize_address("a\u{903}b@x.com"), "a\u{903}b@x.com");
    }

    #[test]
    fn dotted_capital_i_folds_to_plain_i() {
        assert_eq!(normalize_address("\u{130}nes@x.com"), "ines@x.com");
    }

    proptest! {
        #[test]
        fn idempotent(input in "[ .a-zA-Z0-9@_+ÑñíÍéÉüÜçÇøØİ\\x{0301}\\x{0303}\\x{20DD}\t-]{0,40}") {
            let once = normalize_address(&input);
            prop_assert_eq!(normalize_address(&once), once);
        }

        #[test]
        fn never_keeps_uppercase_ascii(input in "[ .A-Za-z0-9@]{0,40}") {
            let out = normalize_address(&input);
            prop_assert!(!out.chars().any(|c| c.is_ascii_uppercase()));
        }
    }
}
