//! HTTP client with timeout and retry logic, shared by every provider.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// JSON-over-HTTP client for one provider
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client
    client: Client,
    /// Provider name, for logs
    name: &'static str,
    /// Base URL of the provider API
    base_url: String,
    /// Maximum retries for failed requests
    max_retries: u32,
    /// Base delay for retry (exponential backoff)
    retry_delay_ms: u64,
}

impl ApiClient {
    /// Create a new client sending `headers` with every request
    pub fn new(
        name: &'static str,
        base_url: &str,
        headers: HeaderMap,
        timeout: Duration,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("movie-scraper/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .with_context(|| format!("Failed to create HTTP client for {}", name))?;

        Ok(Self {
            client,
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            retry_delay_ms,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Full URL of an endpoint
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Make a GET request with retry logic.
    ///
    /// Transport errors, 429 and 5xx responses are retried with exponential
    /// backoff. A 404 is reported immediately as an error.
    pub async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.fetch(endpoint, query)
            .await?
            .ok_or_else(|| anyhow!("{} returned 404 for {}", self.name, self.url(endpoint)))
    }

    /// Like [`ApiClient::get`], but a 404 or a JSON `null` body is `None`
    pub async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        Ok(self.fetch::<Option<T>>(endpoint, query).await?.flatten())
    }

    /// Delay before retrying after `attempt`, doubling each time
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let url = self.url(endpoint);

        for attempt in 0..=self.max_retries {
            debug!(
                provider = self.name,
                url = %url,
                attempt = attempt.saturating_add(1),
                "Making API request"
            );

            let delay = self.backoff(attempt);

            match self.client.get(&url).query(query).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let data = response
                            .json::<T>()
                            .await
                            .with_context(|| format!("Failed to parse response from {}", url))?;
                        debug!(provider = self.name, url = %url, "Request successful");
                        return Ok(Some(data));
                    }

                    if status == StatusCode::NOT_FOUND {
                        debug!(provider = self.name, url = %url, "Not found");
                        return Ok(None);
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());

                    warn!(
                        provider = self.name,
                        url = %url,
                        status = %status,
                        error = %error_text,
                        "Request failed"
                    );

                    let retryable =
                        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
                    if !retryable || attempt == self.max_retries {
                        bail!("Request failed with status {}: {}", status, error_text);
                    }
                }
                Err(e) => {
                    warn!(provider = self.name, url = %url, error = %e, "Request error");

                    if attempt == self.max_retries {
                        return Err(anyhow!(
                            "Request failed after {} retries: {}",
                            self.max_retries,
                            e
                        ));
                    }
                }
            }

            debug!(delay_ms = delay.as_millis(), "Retrying after delay");
            sleep(delay).await;
        }

        Err(anyhow!("Request failed after all retries"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = ApiClient::new(
            "trakt",
            "https://api.trakt.tv/",
            HeaderMap::new(),
            Duration::from_secs(5),
            3,
            1000,
        );
        assert!(client.is_ok());

        let client = client.unwrap();
        assert_eq!(client.name(), "trakt");
        assert_eq!(client.url("/movies/heat"), "https://api.trakt.tv/movies/heat");
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let client = ApiClient::new(
            "trakt",
            "https://api.trakt.tv",
            HeaderMap::new(),
            Duration::from_secs(5),
            100,
            250,
        )
        .unwrap();

        assert_eq!(client.backoff(0), Duration::from_millis(250));
        assert_eq!(client.backoff(3), Duration::from_millis(2_000));
        assert_eq!(client.backoff(64), Duration::from_millis(u64::MAX));
        assert_eq!(client.backoff(99), Duration::from_millis(u64::MAX));
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_after_retries() {
        let client = ApiClient::new(
            "local",
            "http://127.0.0.1:9",
            HeaderMap::new(),
            Duration::from_millis(200),
            1,
            1,
        )
        .unwrap();

        let result: Result<serde_json::Value> = client.get("/anything", &[]).await;
        assert!(result.is_err());
    }
}
