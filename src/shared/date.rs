//! Calendar arithmetic over UTC days.
//!
//! All functions are pure except the `*_today` / [`days_ago`] conveniences,
//! which read the system clock and delegate to their anchored variants.

use super::DateKey;
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

/// Truncate an instant to its UTC calendar day.
pub fn to_date_key(instant: DateTime<Utc>) -> DateKey {
    DateKey::from(instant.date_naive())
}

/// Date key for an epoch-millisecond timestamp.
///
/// `None` when the timestamp falls outside years 0000–9999, which have no
/// canonical four-digit key.
pub fn date_key_from_millis(millis: i64) -> Option<DateKey> {
    let instant = Utc.timestamp_millis_opt(millis).single()?;
    if !(0..=9999).contains(&instant.year()) {
        return None;
    }
    Some(to_date_key(instant))
}

/// Today's key in UTC.
pub fn today_key() -> DateKey {
    to_date_key(Utc::now())
}

/// The instant `n` calendar days before `anchor`, same wall-clock time.
pub fn days_before(anchor: DateTime<Utc>, n: u64) -> DateTime<Utc> {
    anchor.checked_sub_days(Days::new(n)).unwrap_or(anchor)
}

/// The instant `n` calendar days before now.
pub fn days_ago(n: u64) -> DateTime<Utc> {
    days_before(Utc::now(), n)
}

/// Inclusive `(start, end)` keys covering `lookback_days + 1` days ending on
/// `anchor`'s day.
pub fn range_ending(anchor: DateTime<Utc>, lookback_days: u64) -> (DateKey, DateKey) {
    (
        to_date_key(days_before(anchor, lookback_days)),
        to_date_key(anchor),
    )
}

/// Inclusive range ending today; `6` yields a 7-day window.
pub fn range_ending_today(lookback_days: u64) -> (DateKey, DateKey) {
    range_ending(Utc::now(), lookback_days)
}

/// Whether two instants fall on the same UTC day.
pub fn is_same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    to_date_key(a) == to_date_key(b)
}

/// Parse the date shapes the providers emit.
///
/// Accepts a `YYYY-MM-DD` key (midnight UTC), a string of digits read as
/// epoch milliseconds, or an RFC 3339 timestamp.
pub fn parse_api_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(key) = DateKey::parse(s) {
        return Some(start_of_day(key.to_naive_date()));
    }
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Human-readable day, e.g. `Dec 11, 2025`.
pub fn display_date(key: &DateKey) -> String {
    key.to_naive_date().format("%b %-d, %Y").to_string()
}

/// Midnight UTC at the start of `date`.
fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}
