//! Fanart.tv client: the last artwork source.

use super::client::ApiClient;
use super::types::FanartImages;
use crate::enrichment::{ImageSource, MovieIds, SlotImages};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use shared::config::{ApiKeyConfig, ProvidersConfig};
use std::time::Duration;

/// Fanart.tv API v3 client
#[derive(Debug, Clone)]
pub struct FanartClient {
    api: ApiClient,
    api_key: String,
}

impl FanartClient {
    pub fn new(config: &ApiKeyConfig, providers: &ProvidersConfig) -> Result<Self> {
        let api = ApiClient::new(
            "fanart",
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

    /// Artwork of a movie by TMDB id. A movie Fanart.tv doesn't know has no artwork.
    pub async fn movie_images(&self, tmdb_id: u64) -> Result<FanartImages> {
        let images = self
            .api
            .get_optional(
                &format!("/movies/{}", tmdb_id),
                &[("api_key", self.api_key.as_str())],
            )
            .await?;
        Ok(images.unwrap_or_default())
    }
}

#[async_trait]
impl ImageSource for FanartClient {
    fn name(&self) -> &str {
        self.api.name()
    }

    async fn lookup(&self, ids: &MovieIds) -> Result<SlotImages> {
        let images = self.movie_images(ids.tmdb).await?;
        Ok(SlotImages::from_fanart(&images))
    }
}
