//! High-level client: `CosmicClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the per-provider HTTP handles and the
//! accessor methods.

use crate::domain::neo::client::Neo;
use crate::domain::price::client::Prices;
use crate::error::{CosmicError, Provider};
use crate::http::{ProviderHttp, RetryPolicy};
use crate::network::{DEFAULT_ASSET, DEFAULT_NEO_API_URL, DEFAULT_PRICE_API_URL, DEMO_API_KEY};

use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::neo::client::Neo as NeoClient;
pub use crate::domain::price::client::Prices as PricesClient;

/// Environment variable holding the NeoWs API key.
pub const ENV_NASA_API_KEY: &str = "NASA_API_KEY";
/// Environment variable overriding the price feed base URL.
pub const ENV_PRICE_API_URL: &str = "COSMIC_PRICE_API_URL";
/// Environment variable overriding the NeoWs base URL.
pub const ENV_NEO_API_URL: &str = "COSMIC_NEO_API_URL";
/// Environment variable overriding the priced asset id.
pub const ENV_ASSET: &str = "COSMIC_ASSET";

/// Per-endpoint request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub current_price: Duration,
    pub price_history: Duration,
    pub neo_feed: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            current_price: Duration::from_secs(10),
            price_history: Duration::from_secs(15),
            neo_feed: Duration::from_secs(15),
        }
    }
}

/// The primary entry point for both upstream providers.
///
/// Provides nested sub-client accessors: `client.prices()`, `client.neo()`.
/// Cloning is cheap; the underlying connection pools are shared.
#[derive(Clone)]
pub struct CosmicClient {
    pub(crate) price_http: ProviderHttp,
    pub(crate) neo_http: ProviderHttp,
    pub(crate) asset: String,
    pub(crate) neo_api_key: String,
    pub(crate) timeouts: Timeouts,
}

impl CosmicClient {
    pub fn builder() -> CosmicClientBuilder {
        CosmicClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn prices(&self) -> Prices<'_> {
        Prices { client: self }
    }

    pub fn neo(&self) -> Neo<'_> {
        Neo { client: self }
    }

    // ── Configuration ────────────────────────────────────────────────────

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn price_base_url(&self) -> &str {
        self.price_http.base_url()
    }

    pub fn neo_base_url(&self) -> &str {
        self.neo_http.base_url()
    }

    /// Whether the shared demo key is in use.
    pub fn uses_demo_key(&self) -> bool {
        self.neo_api_key == DEMO_API_KEY
    }
}

impl std::fmt::Debug for CosmicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmicClient")
            .field("price_base_url", &self.price_http.base_url())
            .field("neo_base_url", &self.neo_http.base_url())
            .field("asset", &self.asset)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CosmicClientBuilder {
    price_base_url: String,
    neo_base_url: String,
    neo_api_key: String,
    asset: String,
    timeouts: Timeouts,
    retry: RetryPolicy,
}

impl Default for CosmicClientBuilder {
    fn default() -> Self {
        Self {
            price_base_url: DEFAULT_PRICE_API_URL.to_string(),
            neo_base_url: DEFAULT_NEO_API_URL.to_string(),
            neo_api_key: DEMO_API_KEY.to_string(),
            asset: DEFAULT_ASSET.to_string(),
            timeouts: Timeouts::default(),
            retry: RetryPolicy::None,
        }
    }
}

impl CosmicClientBuilder {
    /// Defaults overridden by any of the `NASA_API_KEY`, `COSMIC_PRICE_API_URL`,
    /// `COSMIC_NEO_API_URL` and `COSMIC_ASSET` variables that are set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut builder = Self::default();
        if let Some(key) = get(ENV_NASA_API_KEY) {
            builder.neo_api_key = key;
        }
        if let Some(url) = get(ENV_PRICE_API_URL) {
            builder.price_base_url = url;
        }
        if let Some(url) = get(ENV_NEO_API_URL) {
            builder.neo_base_url = url;
        }
        if let Some(asset) = get(ENV_ASSET) {
            builder.asset = asset;
        }
        builder
    }

    pub fn price_base_url(mut self, url: &str) -> Self {
        self.price_base_url = url.to_string();
        self
    }

    pub fn neo_base_url(mut self, url: &str) -> Self {
        self.neo_base_url = url.to_string();
        self
    }

    pub fn neo_api_key(mut self, key: &str) -> Self {
        self.neo_api_key = key.to_string();
        self
    }

    /// Price feed asset id, e.g. `bitcoin`.
    pub fn asset(mut self, asset: &str) -> Self {
        self.asset = asset.to_string();
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn current_price_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.current_price = timeout;
        self
    }

    pub fn price_history_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.price_history = timeout;
        self
    }

    pub fn neo_feed_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.neo_feed = timeout;
        self
    }

    /// Retry policy applied to both providers. Defaults to [`RetryPolicy::None`].
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<CosmicClient, CosmicError> {
        if self.asset.trim().is_empty() {
            return Err(CosmicError::Config("asset id must not be empty".into()));
        }
        if self.neo_api_key.trim().is_empty() {
            return Err(CosmicError::Config("NeoWs API key must not be empty".into()));
        }
        for url in [&self.price_base_url, &self.neo_base_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CosmicError::Config(format!(
                    "base URL must be http(s), got '{}'",
                    url
                )));
            }
        }

        Ok(CosmicClient {
            price_http: ProviderHttp::new(
                Provider::CoinGecko,
                &self.price_base_url,
                self.retry.clone(),
            )?,
            neo_http: ProviderHttp::new(Provider::NeoWs, &self.neo_base_url, self.retry)?,
            asset: self.asset,
            neo_api_key: self.neo_api_key,
            timeouts: self.timeouts,
        })
    }
}
