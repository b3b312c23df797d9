//! Artwork lookup with provider fallback.
//!
//! Image sources are tried in order. Each one only fills the slots
//! (banner, fanart, poster) that are still empty, and the chain stops as
//! soon as every slot is filled. A source that errors or times out counts
//! as having no data. Slots nobody could fill get the placeholder.

use crate::api::types::{first_url, FanartImages, OmdbMovie, TmdbImages};
use async_trait::async_trait;
use shared::Images;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// External ids an image source can be keyed by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieIds {
    pub imdb: String,
    pub tmdb: u64,
}

/// Partially known artwork
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotImages {
    pub banner: Option<String>,
    pub fanart: Option<String>,
    pub poster: Option<String>,
}

impl SlotImages {
    /// Pick the first English or language-neutral poster and backdrop
    pub fn from_tmdb(images: &TmdbImages, url_for: impl Fn(&str) -> String) -> Self {
        let poster = images
            .posters
            .iter()
            .find(|image| image.is_english_or_neutral())
            .map(|image| url_for(&image.file_path));
        let backdrop = images
            .backdrops
            .iter()
            .find(|image| image.is_english_or_neutral())
            .map(|image| url_for(&image.file_path));

        Self {
            banner: poster.clone(),
            fanart: backdrop,
            poster,
        }
    }

    /// The single OMDb poster, offered for every slot
    pub fn from_omdb(movie: &OmdbMovie) -> Self {
        let poster = movie.poster_url().map(str::to_string);
        Self {
            banner: poster.clone(),
            fanart: poster.clone(),
            poster,
        }
    }

    /// Slot-specific Fanart.tv artwork; clear-art stands in for a background
    pub fn from_fanart(images: &FanartImages) -> Self {
        Self {
            banner: first_url(&images.moviebanner),
            fanart: first_url(&images.moviebackground)
                .or_else(|| first_url(&images.hdmovieclearart)),
            poster: first_url(&images.movieposter),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.banner.is_some() && self.fanart.is_some() && self.poster.is_some()
    }

    /// Fill empty slots from `other`, returning how many were filled
    pub fn fill_missing(&mut self, other: SlotImages) -> usize {
        let mut filled = 0;
        for (slot, candidate) in [
            (&mut self.banner, other.banner),
            (&mut self.fanart, other.fanart),
            (&mut self.poster, other.poster),
        ] {
            if slot.is_none() && candidate.is_some() {
                *slot = candidate;
                filled += 1;
            }
        }
        filled
    }

    /// Final artwork, with `placeholder` in every empty slot
    pub fn into_images(self, placeholder: &str) -> Images {
        let or_placeholder = |slot: Option<String>| slot.unwrap_or_else(|| placeholder.to_string());
        Images {
            banner: or_placeholder(self.banner),
            fanart: or_placeholder(self.fanart),
            poster: or_placeholder(self.poster),
        }
    }
}

/// A provider of movie artwork
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Artwork known for a movie. Empty slots mean no data.
    async fn lookup(&self, ids: &MovieIds) -> anyhow::Result<SlotImages>;
}

/// Ordered image sources
#[derive(Clone)]
pub struct ImageChain {
    sources: Vec<Arc<dyn ImageSource>>,
    call_timeout: Duration,
    placeholder: String,
}

impl ImageChain {
    pub fn new(
        sources: Vec<Arc<dyn ImageSource>>,
        call_timeout: Duration,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            sources,
            call_timeout,
            placeholder: placeholder.into(),
        }
    }

    /// Resolve artwork for a movie. Never fails.
    pub async fn resolve(&self, ids: &MovieIds) -> Images {
        let mut slots = SlotImages::default();

        for source in &self.sources {
            if slots.is_complete() {
                break;
            }

            match timeout(self.call_timeout, source.lookup(ids)).await {
                Ok(Ok(found)) => {
                    let filled = slots.fill_missing(found);
                    debug!(
                        source = source.name(),
                        imdb_id = %ids.imdb,
                        filled = filled,
                        "Image lookup finished"
                    );
                }
                Ok(Err(e)) => {
                    warn!(
                        source = source.name(),
                        imdb_id = %ids.imdb,
                        tmdb_id = ids.tmdb,
                        error = %e,
                        "Image lookup failed"
                    );
                }
                Err(_) => {
                    warn!(
                        source = source.name(),
                        imdb_id = %ids.imdb,
                        timeout_ms = self.call_timeout.as_millis(),
                        "Image lookup timed out"
                    );
                }
            }
        }

        if !slots.is_complete() {
            debug!(imdb_id = %ids.imdb, "Using placeholder for missing images");
        }

        slots.into_images(&self.placeholder)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::types::{FanartImage, TmdbImage};
    use anyhow::anyhow;
    use shared::PLACEHOLDER_IMAGE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Image source returning canned results and counting calls
    pub(crate) struct FakeSource {
        name: &'static str,
        result: Option<SlotImages>,
        delay: Option<Duration>,
        pub calls: AtomicUsize,
    }

    impl FakeSource {
        pub(crate) fn ok(name: &'static str, result: SlotImages) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Some(result),
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: None,
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(name: &'static str, delay: Duration, result: SlotImages) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Some(result),
                delay: Some(delay),
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn lookup(&self, _ids: &MovieIds) -> anyhow::Result<SlotImages> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result
                .clone()
                .ok_or_else(|| anyhow!("{} is unavailable", self.name))
        }
    }

    fn ids() -> MovieIds {
        MovieIds {
            imdb: "tt0133093".to_string(),
            tmdb: 603,
        }
    }

    fn all(url: &str) -> SlotImages {
        SlotImages {
            banner: Some(url.to_string()),
            fanart: Some(url.to_string()),
            poster: Some(url.to_string()),
        }
    }

    fn chain(sources: &[&Arc<FakeSource>]) -> ImageChain {
        let sources = sources
            .iter()
            .map(|source| Arc::clone(*source) as Arc<dyn ImageSource>)
            .collect();
        ImageChain::new(sources, Duration::from_millis(100), PLACEHOLDER_IMAGE)
    }

    #[tokio::test]
    async fn test_primary_fills_everything() {
        let primary = FakeSource::ok("tmdb", all("https://image.tmdb.org/p.jpg"));
        let secondary = FakeSource::ok("omdb", all("https://omdb/p.jpg"));
        let tertiary = FakeSource::ok("fanart", all("https://fanart/p.jpg"));

        let images = chain(&[&primary, &secondary, &tertiary])
            .resolve(&ids())
            .await;

        assert_eq!(images.poster, "https://image.tmdb.org/p.jpg");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
        assert_eq!(tertiary.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_fails_secondary_fills_all_slots() {
        let primary = FakeSource::failing("tmdb");
        let secondary = FakeSource::ok("omdb", all("https://omdb/poster.jpg"));
        let tertiary = FakeSource::ok("fanart", all("https://fanart/p.jpg"));

        let images = chain(&[&primary, &secondary, &tertiary])
            .resolve(&ids())
            .await;

        assert_eq!(images.banner, "https://omdb/poster.jpg");
        assert_eq!(images.fanart, "https://omdb/poster.jpg");
        assert_eq!(images.poster, "https://omdb/poster.jpg");
        assert_eq!(primary.calls(), 1);
        assert_eq!(tertiary.calls(), 0);
    }

    #[tokio::test]
    async fn test_slots_backfilled_independently() {
        let primary = FakeSource::ok(
            "tmdb",
            SlotImages {
                banner: Some("tmdb-banner".to_string()),
                fanart: None,
                poster: Some("tmdb-poster".to_string()),
            },
        );
        let secondary = FakeSource::ok("omdb", SlotImages::default());
        let tertiary = FakeSource::ok(
            "fanart",
            SlotImages {
                banner: Some("fanart-banner".to_string()),
                fanart: Some("fanart-background".to_string()),
                poster: None,
            },
        );

        let images = chain(&[&primary, &secondary, &tertiary])
            .resolve(&ids())
            .await;

        assert_eq!(images.banner, "tmdb-banner");
        assert_eq!(images.fanart, "fanart-background");
        assert_eq!(images.poster, "tmdb-poster");
        assert_eq!(secondary.calls(), 1);
        assert_eq!(tertiary.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_sources_fail_uses_placeholder() {
        let tmdb = FakeSource::failing("tmdb");
        let omdb = FakeSource::failing("omdb");
        let fanart = FakeSource::failing("fanart");

        let images = chain(&[&tmdb, &omdb, &fanart]).resolve(&ids()).await;

        assert_eq!(images, Images::default());
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let slow = FakeSource::slow("tmdb", Duration::from_secs(5), all("too-late"));
        let fallback = FakeSource::ok("omdb", all("in-time"));

        let images = chain(&[&slow, &fallback]).resolve(&ids()).await;
        assert_eq!(images.poster, "in-time");
    }

    #[test]
    fn test_from_tmdb_prefers_english_or_neutral() {
        let image = |lang: Option<&str>, path: &str| TmdbImage {
            iso_639_1: lang.map(str::to_string),
            file_path: path.to_string(),
        };
        let images = TmdbImages {
            posters: vec![image(Some("de"), "/de.jpg"), image(Some("en"), "/en.jpg")],
            backdrops: vec![image(Some("fr"), "/fr.jpg"), image(None, "/neutral.jpg")],
        };

        let slots = SlotImages::from_tmdb(&images, |path| format!("https://img/w500{}", path));
        assert_eq!(slots.banner.as_deref(), Some("https://img/w500/en.jpg"));
        assert_eq!(slots.poster.as_deref(), Some("https://img/w500/en.jpg"));
        assert_eq!(slots.fanart.as_deref(), Some("https://img/w500/neutral.jpg"));

        let only_foreign = TmdbImages {
            posters: vec![image(Some("de"), "/de.jpg")],
            backdrops: Vec::new(),
        };
        assert_eq!(
            SlotImages::from_tmdb(&only_foreign, |path| path.to_string()),
            SlotImages::default()
        );
    }

    #[test]
    fn test_from_fanart_background_falls_back_to_clearart() {
        let list = |url: &str| {
            Some(vec![FanartImage {
                url: url.to_string(),
            }])
        };
        let images = FanartImages {
            moviebanner: None,
            moviebackground: None,
            hdmovieclearart: list("clearart.png"),
            movieposter: list("poster.jpg"),
        };

        let slots = SlotImages::from_fanart(&images);
        assert_eq!(slots.banner, None);
        assert_eq!(slots.fanart.as_deref(), Some("clearart.png"));
        assert_eq!(slots.poster.as_deref(), Some("poster.jpg"));
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let mut slots = SlotImages {
            banner: Some("a".to_string()),
            ..Default::default()
        };
        assert_eq!(slots.fill_missing(all("b")), 2);
        assert_eq!(slots.banner.as_deref(), Some("a"));
        assert_eq!(slots.poster.as_deref(), Some("b"));
        assert!(slots.is_complete());
    }
}
