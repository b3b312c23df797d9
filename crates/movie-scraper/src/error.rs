//! Per-item failures of the pipeline.
//!
//! None of these abort a batch: the torrent or slug that produced them is
//! skipped and the run carries on.

use thiserror::Error;

/// A torrent title that yields no movie identity
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no title pattern matched '{0}'")]
    NoPatternMatched(String),

    #[error("unsupported quality '{quality}' in '{title}'")]
    UnsupportedQuality { title: String, quality: String },
}

/// A torrent that cannot be placed in a bucket
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid size '{0}'")]
    InvalidSize(String),

    #[error("torrent '{0}' has neither a magnet nor a torrent link")]
    MissingLink(String),
}

/// A slug that could not be turned into a movie record
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("metadata provider failed for '{slug}': {source}")]
    Provider {
        slug: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no metadata found for '{0}'")]
    NotFound(String),

    #[error("metadata for '{0}' lacks an IMDb or TMDB id")]
    MissingIds(String),

    #[error("metadata provider timed out for '{0}'")]
    Timeout(String),
}
