//! Trakt client: movie identity, metadata and watcher counts.

use super::client::ApiClient;
use super::types::{TraktMovie, TraktWatcher};
use crate::enrichment::MetadataProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use shared::config::{ProvidersConfig, TraktConfig};
use std::time::Duration;
use tracing::debug;

/// Trakt API v2 client
#[derive(Debug, Clone)]
pub struct TraktClient {
    api: ApiClient,
}

impl TraktClient {
    pub fn new(config: &TraktConfig, providers: &ProvidersConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("trakt-api-version", HeaderValue::from_static("2"));
        headers.insert(
            "trakt-api-key",
            HeaderValue::from_str(&config.client_id).context("Invalid Trakt client id")?,
        );

        let api = ApiClient::new(
            "trakt",
            &config.base_url,
            headers,
            Duration::from_secs(providers.timeout_seconds),
            providers.max_retries,
            providers.retry_delay_ms,
        )?;

        Ok(Self { api })
    }
}

#[async_trait]
impl MetadataProvider for TraktClient {
    async fn summary(&self, slug: &str) -> Result<Option<TraktMovie>> {
        debug!(slug = slug, "Fetching Trakt summary");
        self.api
            .get_optional(&format!("/movies/{}", slug), &[("extended", "full")])
            .await
    }

    async fn watching(&self, slug: &str) -> Result<Option<Vec<TraktWatcher>>> {
        self.api
            .get_optional(&format!("/movies/{}/watching", slug), &[])
            .await
    }
}
