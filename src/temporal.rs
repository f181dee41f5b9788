use std::sync::OnceLock;

use chrono::{
    DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc,
    format::{Fixed, Item, Parsed, StrftimeItems, parse},
};
use regex::Regex;

pub const DEFAULT_DATE_TIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];
pub const DEFAULT_DATE_PATTERNS: &[&str] = &["%Y-%m-%d"];
pub const DEFAULT_TIME_PATTERNS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

const NANOS_PER_MICRO: i128 = 1_000;
const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

/// Returns false when `pattern` contains an unknown specifier.
pub fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

fn parse_unresolved<'a, I>(value: &str, items: I) -> Option<Parsed>
where
    I: Iterator<Item = Item<'a>>,
{
    let mut parsed = Parsed::new();
    parse(&mut parsed, value, items).ok()?;
    Some(parsed)
}

/// RFC 3339 timestamp with offset, normalised to UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let parsed = parse_unresolved(value, [Item::Fixed(Fixed::RFC3339)].into_iter())?;
    parsed
        .to_datetime()
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

pub fn parse_local_date_time<'a, I>(value: &str, patterns: I) -> Option<NaiveDateTime>
where
    I: IntoIterator<Item = &'a str>,
{
    patterns.into_iter().find_map(|pattern| {
        parse_unresolved(value, StrftimeItems::new(pattern))?
            .to_naive_datetime_with_offset(0)
            .ok()
    })
}

pub fn parse_local_date<'a, I>(value: &str, patterns: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'a str>,
{
    patterns.into_iter().find_map(|pattern| {
        let parsed = parse_unresolved(value, StrftimeItems::new(pattern))?;
        // a date-time pattern resolves to a date too; only accept pure dates
        if parsed.hour_div_12().is_some() || parsed.minute().is_some() {
            return None;
        }
        parsed.to_naive_date().ok()
    })
}

pub fn parse_local_time<'a, I>(value: &str, patterns: I) -> Option<NaiveTime>
where
    I: IntoIterator<Item = &'a str>,
{
    patterns.into_iter().find_map(|pattern| {
        let parsed = parse_unresolved(value, StrftimeItems::new(pattern))?;
        if parsed.year().is_some() || parsed.month().is_some() || parsed.day().is_some() {
            return None;
        }
        parsed.to_naive_time().ok()
    })
}

fn iso_duration_regex() -> &'static Regex {
    static ISO_DURATION: OnceLock<Regex> = OnceLock::new();
    ISO_DURATION.get_or_init(|| {
        Regex::new(
            r"^([-+])?P(?:([0-9]+)D)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)(?:\.([0-9]{1,9}))?S)?)?$",
        )
        .expect("valid regex")
    })
}

fn duration_component_regex() -> &'static Regex {
    static COMPONENT: OnceLock<Regex> = OnceLock::new();
    COMPONENT.get_or_init(|| {
        Regex::new(r"^([0-9]+)(?:\.([0-9]+))?(d|h|m|s|ms|us|ns)$").expect("valid regex")
    })
}

/// Parses ISO-8601 durations (`PT1H30M`, `P1DT2.5S`) and the unit form
/// (`1d 2h 30m`, `1.5s`, `-(1h 30m)`).
pub fn parse_duration(value: &str) -> Option<TimeDelta> {
    let nanos = if value.starts_with(['P', '-', '+']) && value.contains('P') {
        parse_iso_duration(value)?
    } else {
        parse_unit_duration(value)?
    };
    i64::try_from(nanos).ok().map(TimeDelta::nanoseconds)
}

fn parse_iso_duration(value: &str) -> Option<i128> {
    let captures = iso_duration_regex().captures(value)?;
    let component = |index: usize| captures.get(index).map(|m| m.as_str());
    if (2..=5).all(|index| component(index).is_none()) {
        return None;
    }
    if value.contains('T') && (3..=5).all(|index| component(index).is_none()) {
        return None;
    }
    let mut nanos = 0i128;
    for (index, unit) in [(2, NANOS_PER_DAY), (3, NANOS_PER_HOUR), (4, NANOS_PER_MINUTE)] {
        if let Some(amount) = component(index) {
            nanos = nanos.checked_add(amount.parse::<i128>().ok()?.checked_mul(unit)?)?;
        }
    }
    if let Some(seconds) = component(5) {
        nanos = nanos.checked_add(scaled(seconds, component(6), NANOS_PER_SECOND)?)?;
    }
    Some(if component(1) == Some("-") { -nanos } else { nanos })
}

fn parse_unit_duration(value: &str) -> Option<i128> {
    let (negative, body) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let body = match body.strip_prefix('(') {
        Some(inner) if negative => inner.strip_suffix(')')?,
        Some(_) => return None,
        None => body,
    };

    let mut nanos = 0i128;
    let mut last_rank = usize::MAX;
    let mut components = 0usize;
    for token in body.split_whitespace() {
        let captures = duration_component_regex().captures(token)?;
        let (rank, unit) = match captures.get(3)?.as_str() {
            "d" => (6, NANOS_PER_DAY),
            "h" => (5, NANOS_PER_HOUR),
            "m" => (4, NANOS_PER_MINUTE),
            "s" => (3, NANOS_PER_SECOND),
            "ms" => (2, NANOS_PER_MILLI),
            "us" => (1, NANOS_PER_MICRO),
            _ => (0, 1),
        };
        // units must appear once each, largest first
        if rank >= last_rank {
            return None;
        }
        last_rank = rank;
        let whole = captures.get(1)?.as_str();
        let fraction = captures.get(2).map(|m| m.as_str());
        nanos = nanos.checked_add(scaled(whole, fraction, unit)?)?;
        components += 1;
    }
    if components == 0 {
        return None;
    }
    Some(if negative { -nanos } else { nanos })
}

fn scaled(whole: &str, fraction: Option<&str>, unit: i128) -> Option<i128> {
    let mut nanos = whole.parse::<i128>().ok()?.checked_mul(unit)?;
    if let Some(fraction) = fraction {
        let digits = fraction.get(..fraction.len().min(18))?;
        let numerator = digits.parse::<i128>().ok()?;
        let denominator = 10i128.checked_pow(digits.len() as u32)?;
        nanos = nanos.checked_add(numerator.checked_mul(unit)? / denominator)?;
    }
    Some(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_is_normalised_to_utc() {
        let parsed = parse_instant("2024-05-06T14:30:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-06T12:30:00+00:00");
        assert!(parse_instant("2024-05-06T14:30:00").is_none());
    }

    #[test]
    fn local_date_time_uses_given_patterns() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(
            parse_local_date_time("2024-05-06T14:30:00", DEFAULT_DATE_TIME_PATTERNS.iter().copied()),
            Some(expected)
        );
        assert_eq!(
            parse_local_date_time("06/05/2024 14:30", ["%d/%m/%Y %H:%M"]),
            Some(expected)
        );
        assert!(parse_local_date_time("2024-05-06", DEFAULT_DATE_TIME_PATTERNS.iter().copied()).is_none());
    }

    #[test]
    fn date_and_time_reject_each_other() {
        let mixed = ["%Y-%m-%d %H:%M"];
        assert!(parse_local_date("2024-05-06 10:00", mixed).is_none());
        assert!(parse_local_time("2024-05-06 10:00", mixed).is_none());
        assert_eq!(
            parse_local_time("10:15", DEFAULT_TIME_PATTERNS.iter().copied()),
            NaiveTime::from_hms_opt(10, 15, 0)
        );
        assert!(parse_local_time("24:61", DEFAULT_TIME_PATTERNS.iter().copied()).is_none());
        assert!(parse_local_date("2024-02-30", DEFAULT_DATE_PATTERNS.iter().copied()).is_none());
    }

    #[test]
    fn durations_accept_iso_and_unit_forms() {
        assert_eq!(parse_duration("PT1H30M"), Some(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("P1DT0.5S"), Some(TimeDelta::days(1) + TimeDelta::milliseconds(500)));
        assert_eq!(parse_duration("-PT2S"), Some(TimeDelta::seconds(-2)));
        assert_eq!(parse_duration("1h 30m"), Some(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("1.5s"), Some(TimeDelta::milliseconds(1500)));
        assert_eq!(parse_duration("-(1h 30m)"), Some(TimeDelta::minutes(-90)));
        assert_eq!(parse_duration("250ms"), Some(TimeDelta::milliseconds(250)));
    }

    #[test]
    fn malformed_durations_fail() {
        assert!(parse_duration("P").is_none());
        assert!(parse_duration("PT").is_none());
        assert!(parse_duration("30m 1h").is_none());
        assert!(parse_duration("1h 1h").is_none());
        assert!(parse_duration("(1h)").is_none());
        assert!(parse_duration("10").is_none());
        assert!(parse_duration("").is_none());
    }

    #[test]
    fn non_ascii_digits_are_not_durations() {
        assert!(parse_duration("0.1३३३३३३s").is_none());
        assert!(parse_duration("PT1.1३३३३३३S").is_none());
        assert!(parse_duration("३h").is_none());
        assert_eq!(
            parse_duration("0.1234567890123456789s"),
            Some(TimeDelta::nanoseconds(123_456_789))
        );
    }

    #[test]
    fn invalid_patterns_are_detected() {
        assert!(is_valid_pattern("%d.%m.%Y"));
        assert!(!is_valid_pattern("%Q"));
    }
}
