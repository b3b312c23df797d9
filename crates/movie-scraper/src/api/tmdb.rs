//! TMDB client: the primary artwork source.

use super::client::ApiClient;
use super::types::TmdbImages;
use crate::enrichment::{ImageSource, MovieIds, SlotImages};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use shared::config::{ProvidersConfig, TmdbConfig};
use std::time::Duration;

/// TMDB API v3 client
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api: ApiClient,
    api_key: String,
    image_base_url: String,
    image_size: String,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig, providers: &ProvidersConfig) -> Result<Self> {
        let api = ApiClient::new(
            "tmdb",
            &config.base_url,
            HeaderMap::new(),
            Duration::from_secs(providers.timeout_seconds),
            providers.max_retries,
            providers.retry_delay_ms,
        )?;

        Ok(Self {
            api,
            api_key: config.api_key.clone(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            image_size: config.image_size.clone(),
        })
    }

    /// Posters and backdrops of a movie
    pub async fn images(&self, tmdb_id: u64) -> Result<TmdbImages> {
        self.api
            .get(&format!("/movie/{}/images", tmdb_id), &[("api_key", self.api_key.as_str())])
            .await
    }

    /// Public URL of an image file at the given size (e.g. `w500`)
    pub fn image_url(&self, file_path: &str, size: &str) -> String {
        format!("{}/{}{}", self.image_base_url, size, file_path)
    }
}

#[async_trait]
impl ImageSource for TmdbClient {
    fn name(&self) -> &str {
        self.api.name()
    }

    async fn lookup(&self, ids: &MovieIds) -> Result<SlotImages> {
        let images = self.images(ids.tmdb).await?;
        Ok(SlotImages::from_tmdb(&images, |path| {
            self.image_url(path, &self.image_size)
        }))
    }
}
