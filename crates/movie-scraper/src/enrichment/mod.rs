//! Metadata enrichment.
//!
//! Turns a slug into a fully populated movie record: identity, synopsis and
//! rating from the metadata provider, artwork from the image chain.

pub mod images;

pub use images::{ImageChain, ImageSource, MovieIds, SlotImages};

use crate::api::types::{TraktMovie, TraktWatcher};
use crate::error::EnrichError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{Images, MovieRecord, Rating, Torrents};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Source of movie identity and descriptive metadata
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Full summary of a movie, or `None` if the slug is unknown
    async fn summary(&self, slug: &str) -> anyhow::Result<Option<TraktMovie>>;

    /// Users currently watching a movie
    async fn watching(&self, slug: &str) -> anyhow::Result<Option<Vec<TraktWatcher>>>;
}

/// Enrichment pipeline
#[derive(Clone)]
pub struct Enricher {
    metadata: Arc<dyn MetadataProvider>,
    images: ImageChain,
    call_timeout: Duration,
}

impl Enricher {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        images: ImageChain,
        call_timeout: Duration,
    ) -> Self {
        Self {
            metadata,
            images,
            call_timeout,
        }
    }

    /// Build the movie record for a slug.
    ///
    /// Fails when the metadata provider errors, times out, or returns a
    /// movie without both an IMDb and a TMDB id. Image lookups never fail
    /// the record.
    pub async fn enrich(&self, slug: &str) -> Result<MovieRecord, EnrichError> {
        debug!(slug = slug, "Enriching movie");

        let summary = self
            .call(slug, self.metadata.summary(slug))
            .await?
            .ok_or_else(|| EnrichError::NotFound(slug.to_string()))?;

        let ids = match (&summary.ids.imdb, summary.ids.tmdb) {
            (Some(imdb), Some(tmdb)) if !imdb.is_empty() => MovieIds {
                imdb: imdb.clone(),
                tmdb,
            },
            _ => return Err(EnrichError::MissingIds(slug.to_string())),
        };

        let watching = self
            .call(slug, self.metadata.watching(slug))
            .await?
            .map_or(0, |watchers| watchers.len() as u32);

        let images = self.images.resolve(&ids).await;

        let now_ms = Utc::now().timestamp_millis();
        let record = build_record(slug, &ids, summary, watching, images, now_ms);
        info!(slug = slug, id = %record.id, title = %record.title, "Enriched movie");
        Ok(record)
    }

    async fn call<T>(
        &self,
        slug: &str,
        request: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, EnrichError> {
        match timeout(self.call_timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(EnrichError::Provider {
                slug: slug.to_string(),
                source,
            }),
            Err(_) => Err(EnrichError::Timeout(slug.to_string())),
        }
    }
}

/// Assemble a record from provider data. The torrents start empty.
pub fn build_record(
    slug: &str,
    ids: &MovieIds,
    summary: TraktMovie,
    watching: u32,
    images: Images,
    now_ms: i64,
) -> MovieRecord {
    let percentage = (summary.rating.unwrap_or(0.0) * 10.0).round().max(0.0) as u32;

    MovieRecord {
        id: ids.imdb.clone(),
        imdb_id: ids.imdb.clone(),
        tmdb_id: ids.tmdb,
        title: summary.title,
        year: summary.year,
        slug: summary.ids.slug.unwrap_or_else(|| slug.to_string()),
        synopsis: summary.overview,
        runtime: summary.runtime,
        rating: Rating {
            votes: summary.votes.unwrap_or(0),
            watching,
            percentage,
        },
        country: summary.language,
        last_updated: now_ms,
        images,
        genres: summary
            .genres
            .unwrap_or_else(|| vec!["unknown".to_string()]),
        released: summary.released.as_deref().and_then(release_epoch),
        trailer: summary.trailer.filter(|trailer| !trailer.is_empty()),
        certification: summary.certification,
        torrents: Torrents::new(),
    }
}

/// Epoch seconds of a release date (`YYYY-MM-DD` or RFC 3339)
fn release_epoch(released: &str) -> Option<i64> {
    if let Ok(date) = NaiveDate::parse_from_str(released, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(released)
        .ok()
        .map(|datetime| datetime.timestamp())
}
