//! Low-level HTTP client: `ProviderHttp`.
//!
//! One instance per upstream provider. Returns decoded wire types; shape
//! validation and conversion to domain types happen in the domain slices.

use crate::error::{classify_status, CosmicError, HttpError, Provider};
use crate::http::retry::RetryPolicy;

use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing;

/// Low-level GET client for a single provider's REST API.
#[derive(Clone)]
pub struct ProviderHttp {
    provider: Provider,
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl ProviderHttp {
    pub fn new(provider: Provider, base_url: &str, retry: RetryPolicy) -> Result<Self, CosmicError> {
        let client = Client::builder()
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| CosmicError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `<base_url><path_and_query>` and decode the JSON body.
    ///
    /// `timeout` bounds each attempt; an attempt that exceeds it surfaces as
    /// [`HttpError::Timeout`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        timeout: Duration,
    ) -> Result<T, HttpError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        self.request_with_retry(&url, timeout).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn request_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, HttpError> {
        let Some(config) = self.retry.config() else {
            return self.do_request(url, timeout).await;
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T>(url, timeout).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if config.should_retry(&e) && attempt < config.max_retries {
                        let delay = match &e {
                            HttpError::RateLimited {
                                retry_after_ms: Some(ms),
                            } => Duration::from_millis(*ms),
                            _ => config.delay_for_attempt(attempt),
                        };
                        tracing::debug!(
                            provider = %self.provider,
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying request to {}",
                            redact(url)
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: Box::new(last_error.unwrap_or(HttpError::Timeout)),
        })
    }

    async fn do_request<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, HttpError> {
        tracing::debug!(provider = %self.provider, "GET {}", redact(url));

        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout
                } else {
                    HttpError::Reqwest(e)
                }
            })?;
        let status = resp.status();

        if status.is_success() {
            let body = resp.text().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout
                } else {
                    HttpError::Reqwest(e)
                }
            })?;
            return serde_json::from_str::<T>(&body).map_err(|e| HttpError::Decode(e.to_string()));
        }

        let retry_after_ms = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body_text = resp.text().await.unwrap_or_default();

        Err(classify_status(status.as_u16(), body_text, retry_after_ms))
    }
}

/// Strip the query string so API keys never reach the logs.
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_drops_query() {
        assert_eq!(
            redact("https://api.nasa.gov/neo/rest/v1/feed?api_key=secret"),
            "https://api.nasa.gov/neo/rest/v1/feed"
        );
        assert_eq!(redact("https://x/y"), "https://x/y");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let http = ProviderHttp::new(
            Provider::CoinGecko,
            "https://api.coingecko.com/api/v3/",
            RetryPolicy::None,
        )
        .unwrap();
        assert_eq!(http.base_url(), "https://api.coingecko.com/api/v3");
        assert_eq!(http.provider(), Provider::CoinGecko);
    }
}
