//! Data models for the movie pipeline.
//!
//! This module defines the structures that flow between the scraper stages
//! and the persisted movie documents: torrent descriptors, the
//! language/quality bucket map, and the enriched movie record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Image used for every slot no provider could fill
pub const PLACEHOLDER_IMAGE: &str = "images/posterholder.png";

/// Video quality label of a torrent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quality {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "2160p")]
    P2160,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::P2160 => "2160p",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Quality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "480p" => Ok(Quality::P480),
            "720p" => Ok(Quality::P720),
            "1080p" => Ok(Quality::P1080),
            "2160p" => Ok(Quality::P2160),
            _ => Err(anyhow::anyhow!("Invalid quality: {}", s)),
        }
    }
}

/// A single torrent, normalized from one tracker result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TorrentDescriptor {
    /// Magnet URI or direct torrent link
    pub url: String,
    pub seeds: u32,
    pub peers: u32,
    /// Size in bytes
    pub size: u64,
    /// Size as reported by the tracker
    pub filesize: String,
    /// Name of the tracker the torrent came from
    pub provider: String,
}

/// Torrents of a movie, bucketed by language code then quality.
///
/// Each (language, quality) bucket holds at most one descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Torrents(BTreeMap<String, BTreeMap<Quality, TorrentDescriptor>>);

impl Torrents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the descriptor in a bucket
    pub fn get(&self, language: &str, quality: Quality) -> Option<&TorrentDescriptor> {
        self.0.get(language).and_then(|qualities| qualities.get(&quality))
    }

    /// Language codes present, in order
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Put a descriptor in an empty bucket.
    ///
    /// Returns `false` and leaves the bucket untouched when it is already
    /// occupied.
    pub fn attach(&mut self, language: &str, quality: Quality, torrent: TorrentDescriptor) -> bool {
        let qualities = self.0.entry(language.to_string()).or_default();
        if qualities.contains_key(&quality) {
            return false;
        }
        qualities.insert(quality, torrent);
        true
    }

    /// Put a descriptor in a bucket, replacing whatever was there
    pub fn insert(&mut self, language: &str, quality: Quality, torrent: TorrentDescriptor) {
        self.0
            .entry(language.to_string())
            .or_default()
            .insert(quality, torrent);
    }

    /// Attach every bucket of `other`, keeping existing entries.
    ///
    /// Returns the number of buckets that were dropped as duplicates.
    pub fn absorb(&mut self, other: Torrents) -> usize {
        let mut dropped = 0;
        for (language, qualities) in other.0 {
            for (quality, torrent) in qualities {
                if !self.attach(&language, quality, torrent) {
                    dropped += 1;
                }
            }
        }
        dropped
    }

    /// Number of populated buckets
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Artwork of a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Images {
    pub banner: String,
    pub fanart: String,
    pub poster: String,
}

impl Default for Images {
    fn default() -> Self {
        Self {
            banner: PLACEHOLDER_IMAGE.to_string(),
            fanart: PLACEHOLDER_IMAGE.to_string(),
            poster: PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

/// Audience rating of a movie
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rating {
    pub votes: u32,
    pub watching: u32,
    /// Rating on a 0-100 scale
    pub percentage: u32,
}

/// Enriched movie, as persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    /// Identity key (IMDb id)
    pub id: String,
    pub imdb_id: String,
    pub tmdb_id: u64,
    pub title: String,
    pub year: Option<u32>,
    pub slug: String,
    pub synopsis: Option<String>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    pub rating: Rating,
    pub country: Option<String>,
    /// Epoch milliseconds of the last enrichment
    pub last_updated: i64,
    pub images: Images,
    pub genres: Vec<String>,
    /// Release date as epoch seconds
    pub released: Option<i64>,
    pub trailer: Option<String>,
    pub certification: Option<String>,
    #[serde(default)]
    pub torrents: Torrents,
}
