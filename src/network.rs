//! Upstream URL constants and provider defaults.

/// Default CoinGecko REST base URL.
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Default NASA NeoWs REST base URL.
pub const DEFAULT_NEO_API_URL: &str = "https://api.nasa.gov/neo/rest/v1";

/// Shared demo key accepted by api.nasa.gov (heavily rate limited).
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Asset id queried on the price feed unless configured otherwise.
pub const DEFAULT_ASSET: &str = "bitcoin";

/// Quote currency for every price request.
pub const QUOTE_CURRENCY: &str = "usd";

/// Longest `end_date - start_date` span the NeoWs feed accepts, in days.
pub const NEO_MAX_SPAN_DAYS: i64 = 7;

/// Longest price history the market-chart endpoint serves, in days.
pub const PRICE_MAX_HISTORY_DAYS: u32 = 365;
