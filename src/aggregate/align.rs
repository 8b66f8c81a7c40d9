//! Date-keyed inner join of prices and event records.

use super::state::MergedPoint;
use crate::domain::neo::EventDayRecord;
use crate::domain::price::PricePoint;
use crate::shared::DateKey;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Join on date key, keeping only days present on both sides.
///
/// Output is ascending by date with exactly one entry per shared day. When a
/// side repeats a date the last entry for it wins, so a trailing intraday
/// quote replaces that day's midnight price. Never fails.
pub fn align(prices: &[PricePoint], events: &[EventDayRecord]) -> Vec<MergedPoint> {
    let counts: HashMap<&DateKey, u32> = events.iter().map(|r| (r.date(), r.count())).collect();
    let latest: BTreeMap<&DateKey, Decimal> = prices.iter().map(|p| (&p.date, p.price)).collect();

    latest
        .into_iter()
        .filter_map(|(date, price)| {
            counts.get(date).map(|&event_count| MergedPoint {
                date: date.clone(),
                price,
                event_count,
            })
        })
        .collect()
}
