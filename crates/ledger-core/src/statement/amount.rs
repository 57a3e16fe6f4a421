//! Monetary amount token detection and normalization

/// A currency-prefixed number (decimals optional) or a bare number with two
/// decimals, either optionally followed by a debit/credit marker.
///
/// Group 1 holds the currency-prefixed number, group 2 the bare number.
pub(crate) const AMOUNT_PATTERN: &str = concat!(
    r"(?i)(?:",
    r"(?:₹|INR|Rs\.?|USD|\$|EUR|€)\s*(\d+(?:,\d+)*(?:\.\d{2})?)",
    r"|(\d+(?:,\d+)*\.\d{2})",
    r")(?:\s*(?:dr|cr|db)\b)?",
);

/// Parse an amount token's numeric text into a positive magnitude
///
/// Thousands separators are stripped. Zero, negative and non-finite values
/// yield `None`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    let value: f64 = cleaned.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn amount_re() -> Regex {
        Regex::new(AMOUNT_PATTERN).unwrap()
    }

    /// Numeric text of every amount token on a line
    fn numbers(line: &str) -> Vec<String> {
        amount_re()
            .captures_iter(line)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("50000"), Some(50000.0));
        assert_eq!(parse_amount("0.00"), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_currency_prefixed_tokens() {
        assert_eq!(numbers("paid Rs.450.00 Dr"), vec!["450.00"]);
        assert_eq!(numbers("paid Rs 450 Dr"), vec!["450"]);
        assert_eq!(numbers("INR 50000 Cr"), vec!["50000"]);
        assert_eq!(numbers("₹1,20,000.50"), vec!["1,20,000.50"]);
        assert_eq!(numbers("USD 12"), vec!["12"]);
        assert_eq!(numbers("$9.99"), vec!["9.99"]);
        assert_eq!(numbers("€ 15"), vec!["15"]);
        assert_eq!(numbers("inr 75"), vec!["75"]);
    }

    #[test]
    fn test_bare_numbers_need_two_decimals() {
        assert_eq!(numbers("Amazon 1,299.00 Dr"), vec!["1,299.00"]);
        assert!(numbers("Ref 123456 at 2024").is_empty());
        assert!(numbers("12/01/2024").is_empty());
    }

    #[test]
    fn test_marker_is_part_of_token() {
        let re = amount_re();
        let m = re.find("Zomato Rs.450.00 Dr").unwrap();
        assert_eq!(m.as_str(), "Rs.450.00 Dr");

        let m = re.find("refund 20.00CR").unwrap();
        assert_eq!(m.as_str(), "20.00CR");

        // A word that merely starts with "cr" is not a marker
        let m = re.find("20.00 Crossword").unwrap();
        assert_eq!(m.as_str(), "20.00");
    }

    #[test]
    fn test_multiple_tokens_in_order() {
        assert_eq!(
            numbers("NEFT 2,500.00 Dr 48,210.75 Cr"),
            vec!["2,500.00", "48,210.75"]
        );
    }
}
