//! OMDb client: the secondary artwork source.

use super::client::ApiClient;
use super::types::OmdbMovie;
use crate::enrichment::{ImageSource, MovieIds, SlotImages};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use shared::config::{ApiKeyConfig, ProvidersConfig};
use std::time::Duration;

/// OMDb API client
#[derive(Debug, Clone)]
pub struct OmdbClient {
    api: ApiClient,
    api_key: String,
}

impl OmdbClient {
    pub fn new(config: &ApiKeyConfig, providers: &ProvidersConfig) -> Result<Self> {
        let api = ApiClient::new(
            "omdb",
            &config.base_url,
            HeaderMap::new(),
            Duration::from_secs(providers.timeout_seconds),
            providers.max_retries,
            providers.retry_delay_ms,
        )?;

        Ok(Self {
            api,
            api_key: config.api_key.clone(),
        })
    }

    /// Look a movie up by IMDb id
    pub async fn by_imdb_id(&self, imdb_id: &str) -> Result<OmdbMovie> {
        self.api
            .get(
                "/",
                &[("i", imdb_id), ("type", "movie"), ("apikey", self.api_key.as_str())],
            )
            .await
    }
}

#[async_trait]
impl ImageSource for OmdbClient {
    fn name(&self) -> &str {
        self.api.name()
    }

    async fn lookup(&self, ids: &MovieIds) -> Result<SlotImages> {
        let movie = self.by_imdb_id(&ids.imdb).await?;
        Ok(SlotImages::from_omdb(&movie))
    }
}
