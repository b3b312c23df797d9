//! Movie scraper library.
//!
//! Turns raw torrent tracker results into enriched, deduplicated movie
//! records: titles are parsed and grouped per movie, each movie is looked
//! up on Trakt with artwork from TMDB, OMDb and Fanart.tv, and the result
//! is merged into the SQLite store.

pub mod api;
pub mod enrichment;
pub mod error;
pub mod input;
pub mod normalizer;
pub mod parser;
pub mod provider;
pub mod reconciler;
pub mod scraper;

pub use api::{ApiClient, FanartClient, OmdbClient, TmdbClient, TraktClient};
pub use enrichment::{Enricher, ImageChain, ImageSource, MetadataProvider, MovieIds, SlotImages};
pub use error::{EnrichError, NormalizeError, ParseError};
pub use input::{load_batch, TorrentBatch};
pub use normalizer::{normalize, parse_size, RawSize, RawTorrent};
pub use parser::{ParsedTitle, SlugOverrides, TitleParser};
pub use provider::{ContentProvider, MovieDraft, MovieProvider};
pub use reconciler::{merge_torrents, reconcile, Reconciled};
pub use scraper::{build_enricher, MovieScraper, ScraperStats};
