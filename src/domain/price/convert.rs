//! Validation of price-feed payloads and normalization to domain types.

use super::wire::{MarketChartResponse, SimplePriceResponse};
use super::{PricePoint, RawPricePair};
use crate::error::{CosmicError, Provider};
use crate::shared::round_dp;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Extract `<asset>.<currency>` as a finite positive quote.
pub(crate) fn spot_price(
    body: &SimplePriceResponse,
    asset: &str,
    currency: &str,
) -> Result<Decimal, CosmicError> {
    let value = body
        .get(asset)
        .and_then(|quotes| quotes.get(currency))
        .and_then(|v| v.as_f64())
        .ok_or_else(|| {
            CosmicError::invalid_response(
                Provider::CoinGecko,
                format!("missing numeric {asset}.{currency} quote"),
            )
        })?;

    if !value.is_finite() || value <= 0.0 {
        return Err(CosmicError::invalid_response(
            Provider::CoinGecko,
            format!("quote {value} is not a positive price"),
        ));
    }

    Decimal::from_f64(value).ok_or_else(|| {
        CosmicError::invalid_response(Provider::CoinGecko, format!("quote {value} is unrepresentable"))
    })
}

/// Validate every `[timestamp, price]` entry; a single bad entry rejects all.
pub(crate) fn validate_history(resp: MarketChartResponse) -> Result<Vec<RawPricePair>, CosmicError> {
    if resp.prices.is_empty() {
        return Err(CosmicError::invalid_response(
            Provider::CoinGecko,
            "no historical price data available",
        ));
    }

    resp.prices
        .iter()
        .map(|entry| {
            let pair = entry.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
                CosmicError::invalid_response(
                    Provider::CoinGecko,
                    format!("price entry {entry} is not a [timestamp, price] pair"),
                )
            })?;
            match (pair[0].as_f64(), pair[1].as_f64()) {
                (Some(ts), Some(price)) => RawPricePair::new(ts, price),
                _ => Err(CosmicError::invalid_response(
                    Provider::CoinGecko,
                    format!("price entry {entry} has non-numeric members"),
                )),
            }
        })
        .collect()
}

/// Map each pair to `{ date, round2(price) }`, preserving input order.
pub fn normalize_history(raw: &[RawPricePair]) -> Vec<PricePoint> {
    raw.iter()
        .map(|pair| PricePoint {
            date: pair.date().clone(),
            price: round_dp(pair.quote(), 2),
        })
        .collect()
}
