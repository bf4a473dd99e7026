use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|.(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("static regex should not panic")
});

/// Checks an address against a permissive RFC 5322-like pattern. Matching is
/// done on the lowercased address.
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_REGEX.is_match(&email.to_lowercase())
}

/// Parses a timestamp as sent by clients: RFC 3339, a naive `T`-separated
/// date-time (taken as UTC) or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_valid_email("test@mail.com"));
        assert!(is_valid_email("first.last@sub.example.it"));
        assert!(is_valid_email("Mixed.Case@Example.COM"));
        assert!(is_valid_email("user@[192.168.0.1]"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("missing-domain@"));
        assert!(!is_valid_email("@missing-local.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("user@example.c"));
    }

    #[test]
    fn parses_bare_dates_as_midnight_utc() {
        let dt = parse_timestamp("2021-09-01").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 9, 1));
        assert_eq!((dt.hour(), dt.minute()), (0, 0));
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2021-09-01T10:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn parses_naive_datetimes() {
        let dt = parse_timestamp("2021-09-01T10:30:00.250").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2021-13-01").is_none());
    }
}
