//! HTTP client layer: `ProviderHttp` with per-request timeouts and retry policies.

pub mod client;
pub mod retry;

pub use client::ProviderHttp;
pub use retry::{RetryConfig, RetryPolicy};
