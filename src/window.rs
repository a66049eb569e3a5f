use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::ValueEnum;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Full history
    All,
}

/// Lenient ISO-8601 parsing: full RFC 3339, a naive datetime (with or
/// without fractional seconds), or a bare date. Naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.and_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ts| ts.and_utc());
    }
    None
}

/// Whether a raw timestamp falls inside the window ending at `now`.
///
/// Week/Month compare raw elapsed time (not midnight-truncated), so an event
/// 7 days plus one hour old falls out of `Week`. An unparsable timestamp is
/// excluded from the dated windows but admitted by `All`, where the date is
/// irrelevant.
pub fn in_window(raw: &str, range: TimeRange, now: DateTime<Utc>) -> bool {
    let limit = match range {
        TimeRange::All => return true,
        TimeRange::Week => 7.0,
        TimeRange::Month => 30.0,
    };
    let Some(ts) = parse_timestamp(raw) else {
        return false;
    };
    let days = (now - ts).num_milliseconds() as f64 / MILLIS_PER_DAY;
    days <= limit
}
