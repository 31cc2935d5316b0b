//! Lenient parsing for string-encoded decimal amounts.
//!
//! The commerce backend encodes every monetary value as a decimal string
//! (`"19.99"`). Catalog data is not under our control, so parsing is
//! deliberately forgiving: callers that compute totals map an unparseable
//! price to zero instead of failing to render the cart.

use rust_decimal::Decimal;

/// Parse a string-encoded decimal amount.
///
/// Leading/trailing whitespace is ignored. Returns `None` for empty or
/// non-numeric input rather than an error - the caller decides whether
/// that means "zero" (cart totals) or "absent" (display).
///
/// # Examples
///
/// ```
/// use extramile_core::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("19.99"), Some(Decimal::new(1999, 2)));
/// assert_eq!(parse_amount("  5 "), Some(Decimal::new(5, 0)));
/// assert_eq!(parse_amount(""), None);
/// assert_eq!(parse_amount("free"), None);
/// ```
#[must_use]
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("19.99"), Some(Decimal::new(1999, 2)));
        assert_eq!(parse_amount("0"), Some(Decimal::ZERO));
        assert_eq!(parse_amount("1200"), Some(Decimal::new(1200, 0)));
    }

    #[test]
    fn test_parse_amount_whitespace() {
        assert_eq!(parse_amount(" 7.50\n"), Some(Decimal::new(750, 2)));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("12,50"), None);
    }

    #[test]
    fn test_parse_amount_negative() {
        // Refund lines can carry negative totals; parsing keeps the sign.
        assert_eq!(parse_amount("-4.25"), Some(Decimal::new(-425, 2)));
    }
}
