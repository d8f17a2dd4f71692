//! Parsing of the lower bound used by "reservations starting from" queries.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a client-supplied date into a UTC instant.
///
/// Accepted forms, tried in order:
/// - RFC 3339 (`2026-02-10T08:00:00+01:00`, `2026-02-10T07:00:00Z`);
/// - naive date-time, read as UTC (`2026-02-10T07:00:00`, optional fraction);
/// - calendar date, read as midnight UTC (`2026-02-10`).
///
/// Returns `None` when nothing matches.
///
/// # Examples
/// ```
/// use roombook::domain::parse_start_bound;
///
/// let bound = parse_start_bound("2026-02-10").expect("date");
/// assert_eq!(bound.to_rfc3339(), "2026-02-10T00:00:00+00:00");
/// assert!(parse_start_bound("10/02/2026").is_none());
/// ```
pub fn parse_start_bound(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case("2026-02-10", utc(2026, 2, 10, 0, 0))]
    #[case(" 2026-02-10 ", utc(2026, 2, 10, 0, 0))]
    #[case("2026-02-10T07:30:00Z", utc(2026, 2, 10, 7, 30))]
    #[case("2026-02-10T08:30:00+01:00", utc(2026, 2, 10, 7, 30))]
    #[case("2026-02-10T07:30:00", utc(2026, 2, 10, 7, 30))]
    #[case("2026-02-10T07:30:00.000", utc(2026, 2, 10, 7, 30))]
    fn accepts_supported_forms(#[case] raw: &str, #[case] expected: DateTime<Utc>) {
        assert_eq!(parse_start_bound(raw), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("demain")]
    #[case("10/02/2026")]
    #[case("2026-02-30")]
    #[case("2026-13-01")]
    fn rejects_everything_else(#[case] raw: &str) {
        assert_eq!(parse_start_bound(raw), None);
    }
}
