//! Numeric literal parsing and key validation, shared by every parse path.

use ngc_core::constants::NGC_WORD_MAX;
use ngc_core::Word;

use crate::model::KEY_LEN_MAX;

/// Parse a numeric literal token: an optional `0x`/`0X`/`0b`/`0B` base
/// prefix (default decimal), underscores permitted as digit separators
/// only when a prefix is present, result constrained to `[0, NGC_WORD_MAX]`.
pub fn parse_number(tok: &str) -> Option<Word> {
    if tok.is_empty() {
        return None;
    }

    let (digits, radix, strip_underscores) = if let Some(rest) = strip_prefix_ci(tok, "0x") {
        (rest, 16, true)
    } else if let Some(rest) = strip_prefix_ci(tok, "0b") {
        (rest, 2, true)
    } else {
        (tok, 10, false)
    };

    let cleaned;
    let digits = if strip_underscores {
        cleaned = digits.chars().filter(|&c| c != '_').collect::<String>();
        cleaned.as_str()
    } else {
        digits
    };

    if digits.is_empty() {
        return None;
    }

    let value = i64::from_str_radix(digits, radix).ok()?;

    if value < 0 || value > i64::from(NGC_WORD_MAX) {
        return None;
    }

    Some(value as Word)
}

fn strip_prefix_ci<'a>(tok: &'a str, prefix: &str) -> Option<&'a str> {
    if tok.len() >= prefix.len() && tok[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&tok[prefix.len()..])
    } else {
        None
    }
}

/// Whether `tok` is a valid key: starts with a letter or `.`, subsequent
/// chars alphanumeric/`_`/`.`, length within bound, and not the reserved
/// single-char names `A`/`D`.
pub fn key_valid(tok: &str) -> bool {
    let mut chars = tok.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };

    if !first.is_ascii_alphabetic() && first != '.' {
        return false;
    }

    if tok.len() > KEY_LEN_MAX {
        return false;
    }

    if tok.len() == 1 && (first == 'A' || first == 'D') {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decimal_literal() {
        assert_eq!(parse_number("42"), Some(42));
    }

    #[test]
    fn hex_literal_with_underscores() {
        assert_eq!(parse_number("0xFF_FF"), None); // out of range (65535 > 32767)
        assert_eq!(parse_number("0x7F_FF"), Some(32767));
    }

    #[test]
    fn binary_literal() {
        assert_eq!(parse_number("0b1010"), Some(10));
    }

    #[test]
    fn underscore_without_prefix_is_rejected() {
        assert_eq!(parse_number("1_000"), None);
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(parse_number("32768"), None);
        assert_eq!(parse_number("-1"), None);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert_eq!(parse_number("42x"), None);
    }

    #[test]
    fn reserved_single_char_keys_are_invalid() {
        assert!(!key_valid("A"));
        assert!(!key_valid("D"));
        assert!(key_valid("a_long_name"));
        assert!(key_valid(".local"));
    }

    #[test]
    fn keys_must_start_with_letter_or_dot() {
        assert!(!key_valid("1abc"));
        assert!(!key_valid("_abc"));
    }

    #[test]
    fn keys_over_length_bound_are_invalid() {
        let long_key: String = std::iter::repeat('a').take(KEY_LEN_MAX + 1).collect();
        assert!(!key_valid(&long_key));
    }
}
