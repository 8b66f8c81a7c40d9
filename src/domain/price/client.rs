//! Price sub-client: spot quote and daily history.

use super::convert::{spot_price, validate_history};
use super::wire::{MarketChartResponse, SimplePriceResponse};
use super::{normalize_history, PricePoint, RawPricePair};
use crate::client::CosmicClient;
use crate::error::CosmicError;
use crate::network::{PRICE_MAX_HISTORY_DAYS, QUOTE_CURRENCY};
use rust_decimal::Decimal;

/// Sub-client for the price feed.
pub struct Prices<'a> {
    pub(crate) client: &'a CosmicClient,
}

impl<'a> Prices<'a> {
    /// Current spot price of the configured asset in USD.
    pub async fn current(&self) -> Result<Decimal, CosmicError> {
        let asset = &self.client.asset;
        let path = format!(
            "/simple/price?ids={}&vs_currencies={}",
            urlencoding::encode(asset),
            QUOTE_CURRENCY
        );

        let body: SimplePriceResponse = self
            .client
            .price_http
            .get(&path, self.client.timeouts.current_price)
            .await
            .map_err(|e| CosmicError::upstream(self.client.price_http.provider(), e))?;

        let price = spot_price(&body, asset, QUOTE_CURRENCY)?;
        tracing::debug!(asset = %asset, %price, "Fetched spot price");
        Ok(price)
    }

    /// Raw daily `[timestamp, price]` pairs for the last `days` days.
    ///
    /// `days` must be within `1..=365`; out-of-range values are rejected
    /// before any request is issued.
    pub async fn history(&self, days: u32) -> Result<Vec<RawPricePair>, CosmicError> {
        if !(1..=PRICE_MAX_HISTORY_DAYS).contains(&days) {
            return Err(CosmicError::InvalidParameter(format!(
                "Days parameter must be a positive integer between 1 and {}, got {}",
                PRICE_MAX_HISTORY_DAYS, days
            )));
        }

        let asset = &self.client.asset;
        let path = format!(
            "/coins/{}/market_chart?vs_currency={}&days={}&interval=daily",
            urlencoding::encode(asset),
            QUOTE_CURRENCY,
            days
        );

        let resp: MarketChartResponse = self
            .client
            .price_http
            .get(&path, self.client.timeouts.price_history)
            .await
            .map_err(|e| CosmicError::upstream(self.client.price_http.provider(), e))?;

        let pairs = validate_history(resp)?;
        tracing::debug!(asset = %asset, days, points = pairs.len(), "Fetched price history");
        Ok(pairs)
    }

    /// [`history`](Self::history) followed by [`normalize_history`].
    pub async fn normalized_history(&self, days: u32) -> Result<Vec<PricePoint>, CosmicError> {
        let raw = self.history(days).await?;
        Ok(normalize_history(&raw))
    }
}
