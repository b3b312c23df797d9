//! Raw tracker results and their normalization into torrent descriptors.

use crate::error::NormalizeError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared::TorrentDescriptor;

static SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([0-9]+(?:\.[0-9]+)?)(b|kb|mb|gb|tb|pb)?$").unwrap());

/// Size as reported by a tracker: human-readable text or a byte count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawSize {
    Bytes(u64),
    Text(String),
}

impl RawSize {
    /// The size as the tracker showed it
    pub fn label(&self) -> String {
        match self {
            RawSize::Bytes(bytes) => bytes.to_string(),
            RawSize::Text(text) => text.clone(),
        }
    }
}

/// One search result as returned by a tracker
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawTorrent {
    pub title: String,
    #[serde(default)]
    pub size: Option<RawSize>,
    #[serde(default, rename = "fileSize", alias = "file_size")]
    pub file_size: Option<RawSize>,
    #[serde(default)]
    pub seeds: Option<u32>,
    #[serde(default)]
    pub peers: Option<u32>,
    #[serde(default)]
    pub magnet: Option<String>,
    #[serde(default, alias = "torrentLink")]
    pub torrent_link: Option<String>,
}

/// Build the descriptor for a parsed torrent.
///
/// The magnet link is preferred over the direct link; missing seed and
/// peer counts become 0.
pub fn normalize(raw: &RawTorrent, provider: &str) -> Result<TorrentDescriptor, NormalizeError> {
    let url = raw
        .magnet
        .as_deref()
        .filter(|link| !link.is_empty())
        .or_else(|| raw.torrent_link.as_deref().filter(|link| !link.is_empty()))
        .ok_or_else(|| NormalizeError::MissingLink(raw.title.clone()))?;

    let raw_size = raw
        .size
        .as_ref()
        .or(raw.file_size.as_ref())
        .ok_or_else(|| NormalizeError::InvalidSize(String::new()))?;

    let size = match raw_size {
        RawSize::Bytes(bytes) => *bytes,
        RawSize::Text(text) => parse_size(text)?,
    };

    Ok(TorrentDescriptor {
        url: url.to_string(),
        seeds: raw.seeds.unwrap_or(0),
        peers: raw.peers.unwrap_or(0),
        size,
        filesize: raw_size.label(),
        provider: provider.to_string(),
    })
}

/// Parse a human-readable size such as `1.5 GB` into bytes.
///
/// Whitespace is ignored, units are binary multiples of 1024, and a bare
/// number is a byte count. Fractions of a byte are dropped.
pub fn parse_size(text: &str) -> Result<u64, NormalizeError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let captures = SIZE
        .captures(&compact)
        .ok_or_else(|| NormalizeError::InvalidSize(text.to_string()))?;

    let value: f64 = captures[1]
        .parse()
        .map_err(|_| NormalizeError::InvalidSize(text.to_string()))?;

    let exponent = match captures.get(2).map(|unit| unit.as_str().to_ascii_lowercase()) {
        None => 0,
        Some(unit) => match unit.as_str() {
            "b" => 0,
            "kb" => 1,
            "mb" => 2,
            "gb" => 3,
            "tb" => 4,
            _ => 5,
        },
    };

    let bytes = (value * 1024f64.powi(exponent)).floor();
    if !bytes.is_finite() || bytes > u64::MAX as f64 {
        return Err(NormalizeError::InvalidSize(text.to_string()));
    }

    Ok(bytes as u64)
}
