/// Number of digits in a CEP
pub const POSTAL_CODE_LEN: usize = 8;

/// True iff `code` is exactly 8 ASCII decimal digits.
///
/// Whitespace, separators and non-ASCII digits are all rejected.
pub fn is_valid_postal_code(code: &str) -> bool {
    code.len() == POSTAL_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// Remove the `-` and ` ` formatting characters clients commonly type
/// (`01001-000`, `01001 000`). Nothing else is touched.
pub fn strip_formatting(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '-' | ' ')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_eight_ascii_digits() {
        for code in ["01001000", "00000000", "99999999", "12345678"] {
            assert!(is_valid_postal_code(code), "{code} should be valid");
        }
    }

    #[test]
    fn test_rejects_wrong_length() {
        for code in ["", "1234567", "123456789", "0"] {
            assert!(!is_valid_postal_code(code), "{code:?} should be invalid");
        }
    }

    #[test]
    fn test_rejects_separators_and_whitespace() {
        for code in ["01001-000", "01001 000", " 01001000", "01001000\n", "0100.1000"] {
            assert!(!is_valid_postal_code(code), "{code:?} should be invalid");
        }
    }

    #[test]
    fn test_rejects_letters_and_unicode_digits() {
        // Arabic-Indic and fullwidth digits are digits to Unicode, not to us
        for code in ["0100100a", "abcdefgh", "٠١٠٠١٠٠٠", "０１００１０００", "0100100١"] {
            assert!(!is_valid_postal_code(code), "{code:?} should be invalid");
        }
    }

    #[test]
    fn test_strip_formatting() {
        assert_eq!(strip_formatting("01001-000"), "01001000");
        assert_eq!(strip_formatting(" 01001 000 "), "01001000");
        assert_eq!(strip_formatting("01001.000"), "01001.000");
    }

    #[test]
    fn test_stripped_input_validates() {
        assert!(is_valid_postal_code(&strip_formatting("01001-000")));
        assert!(!is_valid_postal_code(&strip_formatting("0100-100")));
    }
}
