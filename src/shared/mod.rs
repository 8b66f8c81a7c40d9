//! Shared newtypes and utilities used across all domain modules.
//!
//! [`DateKey`] is serialization-transparent: it serializes as the raw
//! `YYYY-MM-DD` string the providers send, so it can be used directly as a map
//! key in wire types.

pub mod date;

pub use date::{
    date_key_from_millis, days_ago, days_before, display_date, is_same_day, parse_api_date,
    range_ending, range_ending_today, to_date_key, today_key,
};

use crate::error::CosmicError;
use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── DateKey ─────────────────────────────────────────────────────────────────

/// Canonical UTC calendar day, e.g. `"2023-01-01"`.
///
/// Join key and sort key everywhere. Two keys are equal iff their strings are
/// equal, and ordering is the lexicographic string order, which is
/// chronological for four-digit years.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey {
    key: String,
    date: NaiveDate,
}

impl DateKey {
    /// Parse a strict `YYYY-MM-DD` key naming a real calendar day.
    pub fn parse(s: &str) -> Result<Self, CosmicError> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !well_formed {
            return Err(CosmicError::InvalidParameter(format!(
                "Invalid date format '{}'. Expected YYYY-MM-DD",
                s
            )));
        }

        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            CosmicError::InvalidParameter(format!("'{}' is not a calendar date", s))
        })?;

        Ok(Self {
            key: s.to_string(),
            date,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn to_naive_date(&self) -> NaiveDate {
        self.date
    }

    /// Whole days from `self` to `other` (negative when `other` is earlier).
    pub fn span_days(&self, other: &DateKey) -> i64 {
        (other.date - self.date).num_days()
    }

    /// Every key from `self` through `end`, inclusive. Empty when `end < self`.
    pub fn through(&self, end: &DateKey) -> impl Iterator<Item = DateKey> {
        let start = self.date;
        let len = self.span_days(end).max(-1) + 1;
        (0..len as u64).filter_map(move |offset| {
            start.checked_add_days(Days::new(offset)).map(DateKey::from)
        })
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self {
            key: date.format("%Y-%m-%d").to_string(),
            date,
        }
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl FromStr for DateKey {
    type Err = CosmicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateKey::parse(s)
    }
}

impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.key)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateKey::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── Rounding ────────────────────────────────────────────────────────────────

/// Round to `dp` decimal places, half away from zero.
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `round1(100 * part / total)`, or zero when `total` is zero.
pub fn percentage(part: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    let ratio = Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(total);
    round_dp(ratio, 1)
}
