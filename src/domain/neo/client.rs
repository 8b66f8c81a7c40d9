//! NeoWs sub-client: feed fetch with rate-limit fallback.

use super::convert::validate_feed;
use super::wire::FeedResponse;
use super::{generate_fallback, EventBatch, EventDayRecord, NeoFeed};
use crate::client::CosmicClient;
use crate::error::CosmicError;
use crate::network::NEO_MAX_SPAN_DAYS;
use crate::shared::date::{range_ending_today, today_key};
use crate::shared::DateKey;

/// Longest history window accepted by [`Neo::history`].
pub const NEO_MAX_HISTORY_DAYS: u32 = 7;

/// Sub-client for the near-Earth-object catalog.
pub struct Neo<'a> {
    pub(crate) client: &'a CosmicClient,
}

impl<'a> Neo<'a> {
    /// Fetch the catalog for `start..=end` (`YYYY-MM-DD` keys).
    ///
    /// Keys, ordering and the provider's span limit are checked before any
    /// request. A rate-limited response is replaced by a synthetic feed
    /// marked [`Provenance::Fallback`](super::Provenance::Fallback).
    pub async fn fetch_raw(&self, start: &str, end: &str) -> Result<NeoFeed, CosmicError> {
        let (start, end) = validate_range(start, end)?;

        let path = format!(
            "/feed?start_date={}&end_date={}&api_key={}",
            start,
            end,
            urlencoding::encode(&self.client.neo_api_key)
        );

        let http = &self.client.neo_http;
        let result = http
            .get::<FeedResponse>(&path, self.client.timeouts.neo_feed)
            .await
            .map_err(|e| CosmicError::upstream(http.provider(), e));

        recover(result, &start, &end)
    }

    /// [`fetch_raw`](Self::fetch_raw) flattened to per-day records.
    pub async fn flattened(&self, start: &str, end: &str) -> Result<EventBatch, CosmicError> {
        let feed = self.fetch_raw(start, end).await?;
        Ok(EventBatch::from_feed(&feed))
    }

    /// Today's record. A zero record is returned if the provider omits the day.
    pub async fn today(&self) -> Result<EventBatch, CosmicError> {
        let today = today_key();
        let mut batch = self.flattened(today.as_str(), today.as_str()).await?;
        if !batch.records.iter().any(|r| r.date() == &today) {
            batch.records = vec![EventDayRecord::empty(today)];
        } else {
            batch.records.retain(|r| r.date() == &today);
        }
        Ok(batch)
    }

    /// Records for the last `days` days including today (`1..=7`).
    pub async fn history(&self, days: u32) -> Result<EventBatch, CosmicError> {
        if !(1..=NEO_MAX_HISTORY_DAYS).contains(&days) {
            return Err(CosmicError::InvalidParameter(format!(
                "Days parameter must be a positive integer between 1 and {}, got {}",
                NEO_MAX_HISTORY_DAYS, days
            )));
        }
        let (start, end) = range_ending_today(u64::from(days - 1));
        self.flattened(start.as_str(), end.as_str()).await
    }
}

/// Both keys well formed, `start <= end`, and the span within the provider limit.
pub(crate) fn validate_range(start: &str, end: &str) -> Result<(DateKey, DateKey), CosmicError> {
    let start = DateKey::parse(start)?;
    let end = DateKey::parse(end)?;
    if start > end {
        return Err(CosmicError::InvalidParameter(format!(
            "Start date {} cannot be after end date {}",
            start, end
        )));
    }
    if start.span_days(&end) > NEO_MAX_SPAN_DAYS {
        return Err(CosmicError::InvalidParameter(format!(
            "Date range cannot exceed {} days, got {} to {}",
            NEO_MAX_SPAN_DAYS, start, end
        )));
    }
    Ok((start, end))
}

/// Validate a feed response, substituting synthetic data when rate limited.
fn recover(
    result: Result<FeedResponse, CosmicError>,
    start: &DateKey,
    end: &DateKey,
) -> Result<NeoFeed, CosmicError> {
    match result {
        Ok(resp) => {
            let feed = validate_feed(resp)?;
            tracing::debug!(
                start = %start,
                end = %end,
                objects = feed.element_count(),
                "Fetched NEO feed"
            );
            Ok(feed)
        }
        Err(CosmicError::UpstreamRateLimited { provider }) => {
            tracing::warn!(
                %provider,
                start = %start,
                end = %end,
                "Rate limited, using synthetic fallback data"
            );
            Ok(fallback_feed(start, end))
        }
        Err(e) => Err(e),
    }
}

fn fallback_feed(start: &DateKey, end: &DateKey) -> NeoFeed {
    let mut rng = rand::thread_rng();
    generate_fallback(start, end, &mut rng)
}
