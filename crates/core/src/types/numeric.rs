//! Defensive parsing for numeric fields delivered as strings.
//!
//! The platform's GraphQL API returns monetary amounts as decimal strings
//! and occasionally omits or malforms numeric fields depending on granted
//! scopes. A value that cannot be parsed maps to `None`, never to zero:
//! a missing total is not a free order.

use rust_decimal::Decimal;

/// Parse a monetary amount string (`"19.99"`) into a [`Decimal`].
///
/// Returns `None` for missing, empty, or malformed input.
#[must_use]
pub fn parse_money(raw: Option<&str>) -> Option<Decimal> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<Decimal>().ok())
}

/// Parse an integral count string (`"3"`) into an `i64`.
///
/// Returns `None` for missing, empty, or malformed input.
#[must_use]
pub fn parse_count(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money_valid() {
        assert_eq!(parse_money(Some("19.99")), Some(Decimal::new(1999, 2)));
        assert_eq!(parse_money(Some(" 0.50 ")), Some(Decimal::new(50, 2)));
    }

    #[test]
    fn test_parse_money_invalid_is_none_not_zero() {
        assert_eq!(parse_money(Some("not-a-price")), None);
        assert_eq!(parse_money(Some("")), None);
        assert_eq!(parse_money(None), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Some("3")), Some(3));
        assert_eq!(parse_count(Some("-1")), Some(-1));
        assert_eq!(parse_count(Some("3.5")), None);
        assert_eq!(parse_count(None), None);
    }
}
