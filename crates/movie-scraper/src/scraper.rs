//! Main scraper orchestrator.
//!
//! Runs each batch through the pipeline: aggregate the raw torrents into
//! drafts, enrich the drafts concurrently, then reconcile the enriched
//! records with the store one at a time.

use crate::api::{FanartClient, OmdbClient, TmdbClient, TraktClient};
use crate::enrichment::{Enricher, ImageChain, ImageSource};
use crate::error::EnrichError;
use crate::input::TorrentBatch;
use crate::parser::{SlugOverrides, TitleParser};
use crate::provider::{ContentProvider, MovieDraft, MovieProvider};
use crate::reconciler::{reconcile, Reconciled};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use shared::{Config, MovieRecord, MovieStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Statistics for a scraping session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScraperStats {
    pub batches: usize,
    pub torrents_seen: usize,
    pub torrents_rejected: usize,
    pub movies_aggregated: usize,
    pub enriched: usize,
    pub enrichment_failed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub store_errors: usize,
}

/// Main scraper coordinator
pub struct MovieScraper<S: MovieStore> {
    parser: TitleParser,
    enricher: Enricher,
    store: S,
    max_concurrent: usize,
}

impl<S: MovieStore> MovieScraper<S> {
    pub fn new(parser: TitleParser, enricher: Enricher, store: S, max_concurrent: usize) -> Self {
        Self {
            parser,
            enricher,
            store,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Build a scraper from the configuration
    pub fn from_config(config: &Config, store: S) -> Result<Self> {
        let parser = TitleParser::new(SlugOverrides::with_extra(&config.scraper.slug_overrides));
        let enricher = build_enricher(config)?;
        Ok(Self::new(
            parser,
            enricher,
            store,
            config.scraper.max_concurrent_enrichments,
        ))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process every batch in order.
    ///
    /// Only a failure of the whole run is returned as an error; failed
    /// torrents, slugs and records are logged and counted.
    pub async fn run(&mut self, batches: Vec<TorrentBatch>) -> Result<ScraperStats> {
        info!(batches = batches.len(), "Starting movie scraper");

        let mut stats = ScraperStats::default();
        let total = batches.len();

        for (idx, batch) in batches.into_iter().enumerate() {
            info!(
                progress = format!("{}/{}", idx + 1, total),
                provider = %batch.provider,
                language = %batch.language,
                "Processing batch"
            );
            self.process_batch(batch, &mut stats).await;
            stats.batches += 1;
        }

        info!(
            batches = stats.batches,
            torrents_seen = stats.torrents_seen,
            torrents_rejected = stats.torrents_rejected,
            movies_aggregated = stats.movies_aggregated,
            enriched = stats.enriched,
            enrichment_failed = stats.enrichment_failed,
            inserted = stats.inserted,
            updated = stats.updated,
            store_errors = stats.store_errors,
            "Movie scraper complete"
        );

        Ok(stats)
    }

    async fn process_batch(&mut self, batch: TorrentBatch, stats: &mut ScraperStats) {
        let provider = MovieProvider::new(batch.provider, self.parser.clone());

        // Phase 1: aggregation is a strictly ordered fold
        let drafts = provider.get_all_content(&batch.torrents, &batch.language);
        stats.torrents_seen += batch.torrents.len();
        stats.torrents_rejected += batch.rejected;
        stats.movies_aggregated += drafts.len();

        if drafts.is_empty() {
            warn!(provider = provider.name(), "Batch produced no movies");
            return;
        }

        // Phase 2: enrichment is independent per slug; results keep draft order
        let enricher = &self.enricher;
        let results: Vec<(MovieDraft, Result<MovieRecord, EnrichError>)> = stream::iter(drafts)
            .map(|draft| async move {
                let result = enrich_draft(enricher, &draft).await;
                (draft, result)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        // Phase 3: reconciliation is serialized on the store
        for (draft, result) in results {
            let mut record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        slug = %draft.slug_year,
                        error = %e,
                        "Failed to enrich movie"
                    );
                    stats.enrichment_failed += 1;
                    continue;
                }
            };

            stats.enriched += 1;
            record.torrents = draft.torrents;

            match reconcile(&mut self.store, record) {
                Ok(Reconciled::Inserted(_)) => stats.inserted += 1,
                Ok(Reconciled::Updated(_)) => stats.updated += 1,
                Err(e) => {
                    error!(
                        provider = provider.name(),
                        slug = %draft.slug_year,
                        error = %e,
                        "Failed to save movie"
                    );
                    stats.store_errors += 1;
                }
            }
        }
    }
}

/// Enrich a draft by its year-qualified slug, then by its bare slug
async fn enrich_draft(enricher: &Enricher, draft: &MovieDraft) -> Result<MovieRecord, EnrichError> {
    match enricher.enrich(&draft.slug_year).await {
        Err(EnrichError::NotFound(_)) => {
            debug!(slug = %draft.slug_year, fallback = %draft.slug, "Retrying with bare slug");
            enricher.enrich(&draft.slug).await
        }
        other => other,
    }
}

/// Wire the real metadata and image providers
pub fn build_enricher(config: &Config) -> Result<Enricher> {
    let providers = &config.providers;

    let trakt =
        TraktClient::new(&providers.trakt, providers).context("Failed to create Trakt client")?;
    let tmdb = TmdbClient::new(&providers.tmdb, providers).context("Failed to create TMDB client")?;
    let omdb = OmdbClient::new(&providers.omdb, providers).context("Failed to create OMDb client")?;
    let fanart =
        FanartClient::new(&providers.fanart, providers).context("Failed to create Fanart client")?;
    let sources: Vec<Arc<dyn ImageSource>> = vec![Arc::new(tmdb), Arc::new(omdb), Arc::new(fanart)];

    // Covers every attempt plus the backoff between them
    let backoff_ms = providers
        .retry_delay_ms
        .saturating_mul((1u64 << providers.max_retries.min(16)) - 1);
    let call_timeout = Duration::from_secs(providers.timeout_seconds)
        .saturating_mul(providers.max_retries.saturating_add(1))
        .saturating_add(Duration::from_millis(backoff_ms));

    let images = ImageChain::new(sources, call_timeout, config.scraper.placeholder_image.clone());
    Ok(Enricher::new(Arc::new(trakt), images, call_timeout))
}
