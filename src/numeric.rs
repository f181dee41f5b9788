use std::str::FromStr;

use rust_decimal::Decimal;

use crate::options::Locale;

/// Parses `value` as a double. Sentinel tokens for NaN and infinity are
/// recognised case-insensitively before the locale's number format is
/// applied. The whole string must be consumed.
pub fn parse_double(value: &str, locale: &Locale) -> Option<f64> {
    if let Some(sentinel) = parse_sentinel(value) {
        return Some(sentinel);
    }
    let normalized = normalize_number(value, locale)?;
    f64::from_str(&normalized).ok()
}

fn parse_sentinel(value: &str) -> Option<f64> {
    match value.to_ascii_uppercase().as_str() {
        "NAN" => Some(f64::NAN),
        "INF" | "INFINITY" | "+INF" | "+INFINITY" => Some(f64::INFINITY),
        "-INF" | "-INFINITY" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

fn is_grouping(ch: char, locale: &Locale) -> bool {
    let grouping = locale.grouping_separator();
    ch == grouping || (grouping == '\u{a0}' && matches!(ch, ' ' | '\u{202f}'))
}

/// Rewrites a locale-formatted number into Rust's float syntax, or `None`
/// when the text is not a number in that locale.
fn normalize_number(value: &str, locale: &Locale) -> Option<String> {
    let mut normalized = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    if let Some(sign @ ('+' | '-')) = chars.peek().copied() {
        normalized.push(sign);
        chars.next();
    }

    let mut integer_digits = 0usize;
    let mut fraction_digits = 0usize;
    let mut seen_decimal = false;
    let mut previous_was_digit = false;

    while let Some(ch) = chars.peek().copied() {
        if ch.is_ascii_digit() {
            normalized.push(ch);
            if seen_decimal {
                fraction_digits += 1;
            } else {
                integer_digits += 1;
            }
            previous_was_digit = true;
        } else if ch == locale.decimal_separator() && !seen_decimal {
            normalized.push('.');
            seen_decimal = true;
            previous_was_digit = false;
        } else if !seen_decimal && previous_was_digit && is_grouping(ch, locale) {
            chars.next();
            // a grouping separator must be followed by a digit
            if !chars.peek().is_some_and(char::is_ascii_digit) {
                return None;
            }
            continue;
        } else {
            break;
        }
        chars.next();
    }

    if integer_digits + fraction_digits == 0 {
        return None;
    }

    if let Some('e' | 'E') = chars.peek().copied() {
        chars.next();
        normalized.push('e');
        if let Some(sign @ ('+' | '-')) = chars.peek().copied() {
            normalized.push(sign);
            chars.next();
        }
        let mut exponent_digits = 0usize;
        while let Some(ch) = chars.peek().copied().filter(char::is_ascii_digit) {
            normalized.push(ch);
            exponent_digits += 1;
            chars.next();
        }
        if exponent_digits == 0 {
            return None;
        }
    }

    // partial parses are failures, not truncated successes
    if chars.next().is_some() {
        return None;
    }
    Some(normalized)
}

/// Parses an arbitrary precision decimal, accepting scientific notation.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_case_insensitive() {
        let root = Locale::root();
        assert!(parse_double("nan", &root).unwrap().is_nan());
        assert_eq!(parse_double("Infinity", &root), Some(f64::INFINITY));
        assert_eq!(parse_double("-inf", &root), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn root_locale_accepts_grouping_and_exponent() {
        let root = Locale::root();
        assert_eq!(parse_double("1,234.5", &root), Some(1234.5));
        assert_eq!(parse_double("-1.5e3", &root), Some(-1500.0));
        assert_eq!(parse_double(".5", &root), Some(0.5));
        assert_eq!(parse_double("+2", &root), Some(2.0));
    }

    #[test]
    fn locale_separators_are_respected() {
        let german = Locale::for_tag("de-DE").unwrap();
        assert_eq!(parse_double("1.234,5", &german), Some(1234.5));
        assert_eq!(parse_double("1,234.5", &german), None);
        let french = Locale::for_tag("fr-FR").unwrap();
        assert_eq!(parse_double("1 234,5", &french), Some(1234.5));
        assert_eq!(parse_double("1\u{a0}234,5", &french), Some(1234.5));
    }

    #[test]
    fn partial_parses_fail() {
        let root = Locale::root();
        assert_eq!(parse_double("12abc", &root), None);
        assert_eq!(parse_double("1.2.3", &root), None);
        assert_eq!(parse_double("1,", &root), None);
        assert_eq!(parse_double("1e", &root), None);
        assert_eq!(parse_double("-", &root), None);
        assert_eq!(parse_double("", &root), None);
    }

    #[test]
    fn decimals_accept_scientific_notation() {
        assert_eq!(parse_decimal("12.50").unwrap().to_string(), "12.50");
        assert_eq!(parse_decimal("1.5e2").unwrap(), Decimal::from(150));
        assert!(parse_decimal("abc").is_none());
    }
}
