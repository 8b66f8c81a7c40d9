//! Flattening and hazard ratios.

use super::{EventDayRecord, NearEarthObject, NeoFeed};
use crate::shared::percentage;
use rust_decimal::Decimal;

/// One record per date key in the feed, ascending by date.
///
/// Days with an empty object list still produce a record with `count = 0`.
pub fn flatten(feed: &NeoFeed) -> Vec<EventDayRecord> {
    // BTreeMap iteration is already ascending by key.
    feed.days
        .iter()
        .map(|(date, objects)| {
            let hazardous = objects.iter().filter(|o| o.is_potentially_hazardous).count();
            EventDayRecord {
                date: date.clone(),
                count: objects.len() as u32,
                hazardous_count: hazardous as u32,
            }
        })
        .collect()
}

/// Percentage of hazardous objects, rounded to 1 dp half away from zero.
/// Zero for an empty slice.
pub fn hazard_ratio(objects: &[NearEarthObject]) -> Decimal {
    let hazardous = objects.iter().filter(|o| o.is_potentially_hazardous).count();
    percentage(hazardous as u64, objects.len() as u64)
}

/// Hazard percentage over the summed totals of all records (not an average
/// of per-day ratios). Zero when no objects were recorded.
pub fn aggregate_hazard_ratio(records: &[EventDayRecord]) -> Decimal {
    let (total, hazardous) = records.iter().fold((0u64, 0u64), |(t, h), r| {
        (t + u64::from(r.count()), h + u64::from(r.hazardous_count()))
    });
    percentage(hazardous.min(total), total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::neo::{CloseApproach, Provenance};
    use crate::shared::DateKey;
    use std::collections::BTreeMap;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn neo(id: &str, hazardous: bool) -> NearEarthObject {
        NearEarthObject {
            id: id.to_string(),
            name: format!("({id})"),
            is_potentially_hazardous: hazardous,
            close_approaches: vec![CloseApproach {
                date: None,
                relative_velocity_kps: None,
                miss_distance_km: None,
            }],
            estimated_diameter_km: None,
        }
    }

    fn record(date: &str, count: u32, hazardous: u32) -> EventDayRecord {
        EventDayRecord::new(key(date), count, hazardous).unwrap()
    }

    #[test]
    fn test_flatten_counts_per_day_and_sorts() {
        let mut days = BTreeMap::new();
        days.insert(key("2023-12-12"), vec![neo("3", true)]);
        days.insert(key("2023-12-10"), vec![neo("1", false), neo("2", true)]);
        days.insert(key("2023-12-11"), vec![]);
        let feed = NeoFeed {
            provenance: Provenance::Live,
            days,
        };

        let records = flatten(&feed);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], record("2023-12-10", 2, 1));
        assert_eq!(records[1], record("2023-12-11", 0, 0));
        assert_eq!(records[2], record("2023-12-12", 1, 1));

        let total: u64 = records.iter().map(|r| u64::from(r.count())).sum();
        assert_eq!(total, feed.element_count() as u64);
    }

    #[test]
    fn test_hazard_ratio() {
        assert_eq!(hazard_ratio(&[]), Decimal::ZERO);
        assert_eq!(
            hazard_ratio(&[neo("1", true), neo("2", false), neo("3", false)]),
            Decimal::new(333, 1)
        );
        assert_eq!(
            hazard_ratio(&[neo("1", true), neo("2", true), neo("3", false)]),
            Decimal::new(667, 1)
        );
        assert_eq!(hazard_ratio(&[neo("1", true)]), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_aggregate_hazard_ratio_uses_summed_totals() {
        let records = [record("2023-01-01", 5, 1), record("2023-01-03", 2, 0)];
        assert_eq!(aggregate_hazard_ratio(&records), Decimal::new(143, 1));

        // An average of per-day ratios would give (50 + 0) / 2 = 25.
        let records = [record("2023-01-01", 2, 1), record("2023-01-02", 8, 0)];
        assert_eq!(aggregate_hazard_ratio(&records), Decimal::new(10, 0));
    }

    #[test]
    fn test_aggregate_hazard_ratio_zero_total() {
        assert_eq!(aggregate_hazard_ratio(&[]), Decimal::ZERO);
        assert_eq!(
            aggregate_hazard_ratio(&[record("2023-01-01", 0, 0)]),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_aggregate_hazard_ratio_stays_in_bounds() {
        for (count, hazardous) in [(1, 0), (1, 1), (7, 3), (1000, 999), (3, 2)] {
            let ratio = aggregate_hazard_ratio(&[record("2023-01-01", count, hazardous)]);
            assert!(ratio >= Decimal::ZERO && ratio <= Decimal::ONE_HUNDRED);
        }
    }
}
