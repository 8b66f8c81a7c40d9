//! Price domain: spot quote and daily history from the price feed.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

pub use convert::normalize_history;

use crate::error::{CosmicError, Provider};
use crate::shared::{date_key_from_millis, DateKey};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A validated `[timestamp_ms, price]` pair from the market-chart endpoint.
///
/// Both values are finite and positive, the timestamp maps to a
/// representable calendar day and the price fits a `Decimal`. The day and the
/// decimal price are kept so normalization cannot drop the pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPricePair {
    timestamp_ms: f64,
    price: f64,
    date: DateKey,
    quote: Decimal,
}

impl RawPricePair {
    pub fn new(timestamp_ms: f64, price: f64) -> Result<Self, CosmicError> {
        if !timestamp_ms.is_finite() || !price.is_finite() {
            return Err(CosmicError::invalid_response(
                Provider::CoinGecko,
                "non-finite timestamp or price",
            ));
        }
        if timestamp_ms <= 0.0 || price <= 0.0 {
            return Err(CosmicError::invalid_response(
                Provider::CoinGecko,
                "timestamp and price must be positive",
            ));
        }
        let date = date_key_from_millis(timestamp_ms as i64).ok_or_else(|| {
            CosmicError::invalid_response(
                Provider::CoinGecko,
                format!("timestamp {timestamp_ms} is out of range"),
            )
        })?;
        let quote = Decimal::from_f64(price).ok_or_else(|| {
            CosmicError::invalid_response(
                Provider::CoinGecko,
                format!("price {price} is out of range"),
            )
        })?;
        Ok(Self {
            timestamp_ms,
            price,
            date,
            quote,
        })
    }

    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// UTC day of the timestamp.
    pub fn date(&self) -> &DateKey {
        &self.date
    }

    pub(crate) fn quote(&self) -> Decimal {
        self.quote
    }
}

/// One day of the normalized price series. Price is rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateKey,
    pub price: Decimal,
}
