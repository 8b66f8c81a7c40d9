//! Data sources the engine fetches through.
//!
//! [`CosmicClient`](crate::client::CosmicClient) implements both traits;
//! tests substitute scripted fakes.

use crate::domain::neo::EventBatch;
use crate::domain::price::RawPricePair;
use crate::error::CosmicError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Spot price and daily price history for one asset.
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
    async fn current_price(&self) -> Result<Decimal, CosmicError>;

    /// Raw daily pairs for the last `days` days. Normalization is the
    /// caller's job.
    async fn price_history(&self, days: u32) -> Result<Vec<RawPricePair>, CosmicError>;
}

/// Daily near-Earth-object counts.
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// A batch holding exactly one record, for today.
    async fn today(&self) -> Result<EventBatch, CosmicError>;

    /// Records for the last `days` days including today.
    async fn history(&self, days: u32) -> Result<EventBatch, CosmicError>;
}

#[cfg(feature = "http")]
mod http_impls {
    use super::*;
    use crate::client::CosmicClient;

    #[async_trait]
    impl PriceSource for CosmicClient {
        async fn current_price(&self) -> Result<Decimal, CosmicError> {
            self.prices().current().await
        }

        async fn price_history(&self, days: u32) -> Result<Vec<RawPricePair>, CosmicError> {
            self.prices().history(days).await
        }
    }

    #[async_trait]
    impl EventSource for CosmicClient {
        async fn today(&self) -> Result<EventBatch, CosmicError> {
            self.neo().today().await
        }

        async fn history(&self, days: u32) -> Result<EventBatch, CosmicError> {
            self.neo().history(days).await
        }
    }
}
