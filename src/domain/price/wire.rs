//! Wire types for the price feed (REST).

use serde::Deserialize;

/// `GET /simple/price` body: `{ "<asset>": { "<currency>": number } }`.
///
/// Kept as raw JSON so a missing asset or a non-numeric quote is reported as
/// an invalid response instead of a decode failure with no context.
pub type SimplePriceResponse = serde_json::Value;

/// `GET /coins/<asset>/market_chart` body. Only `prices` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChartResponse {
    pub prices: Vec<serde_json::Value>,
}
