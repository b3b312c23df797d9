//! Content providers: turning a tracker's raw results into drafts.
//!
//! A provider parses each raw torrent, normalizes it and folds the results
//! into one draft per distinct (title, slug). The fold is strictly
//! sequential: a torrent is attached to its draft only if the bucket is
//! still empty, so the first torrent seen for a bucket wins.

use crate::error::NormalizeError;
use crate::normalizer::{normalize, RawTorrent};
use crate::parser::{ParsedTitle, TitleParser};
use shared::{Quality, TorrentDescriptor, Torrents};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// A content type scraped from tracker results
pub trait ContentProvider {
    /// The in-memory aggregation unit for this content type
    type Content;

    /// Build a new content item around one parsed torrent
    fn extract_content(
        &self,
        torrent: &RawTorrent,
        parsed: ParsedTitle,
        language: &str,
    ) -> Result<Self::Content, NormalizeError>;

    /// Parse and normalize one torrent, or `None` if it has to be skipped
    fn get_content_data(&self, torrent: &RawTorrent, language: &str) -> Option<Self::Content>;

    /// Put a torrent into a content item's bucket unless it is taken
    fn attach_torrent(
        content: &mut Self::Content,
        torrent: TorrentDescriptor,
        quality: Quality,
        language: &str,
    ) -> bool;

    /// Fold a batch of torrents into deduplicated content items
    fn get_all_content(&self, torrents: &[RawTorrent], language: &str) -> Vec<Self::Content>;
}

/// A movie seen in one batch, not yet enriched or persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDraft {
    pub title: String,
    pub slug: String,
    /// `{slug}-{year}`
    pub slug_year: String,
    pub year: u32,
    pub torrents: Torrents,
}

impl MovieDraft {
    pub fn new(parsed: &ParsedTitle) -> Self {
        Self {
            title: parsed.title.clone(),
            slug: parsed.slug.clone(),
            slug_year: format!("{}-{}", parsed.slug, parsed.year),
            year: parsed.year,
            torrents: Torrents::new(),
        }
    }
}

/// Movie content from one tracker
#[derive(Debug, Clone)]
pub struct MovieProvider {
    name: String,
    parser: TitleParser,
}

impl MovieProvider {
    pub fn new(name: impl Into<String>, parser: TitleParser) -> Self {
        Self {
            name: name.into(),
            parser,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ContentProvider for MovieProvider {
    type Content = MovieDraft;

    fn extract_content(
        &self,
        torrent: &RawTorrent,
        parsed: ParsedTitle,
        language: &str,
    ) -> Result<MovieDraft, NormalizeError> {
        let descriptor = normalize(torrent, &self.name)?;

        let mut draft = MovieDraft::new(&parsed);
        Self::attach_torrent(&mut draft, descriptor, parsed.quality, language);
        Ok(draft)
    }

    fn get_content_data(&self, torrent: &RawTorrent, language: &str) -> Option<MovieDraft> {
        let parsed = match self.parser.parse(&torrent.title) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(provider = %self.name, error = %e, "Could not find data from torrent");
                return None;
            }
        };

        match self.extract_content(torrent, parsed, language) {
            Ok(draft) => Some(draft),
            Err(e) => {
                error!(
                    provider = %self.name,
                    title = %torrent.title,
                    error = %e,
                    "Failed to normalize torrent"
                );
                None
            }
        }
    }

    fn attach_torrent(
        draft: &mut MovieDraft,
        torrent: TorrentDescriptor,
        quality: Quality,
        language: &str,
    ) -> bool {
        draft.torrents.attach(language, quality, torrent)
    }

    fn get_all_content(&self, torrents: &[RawTorrent], language: &str) -> Vec<MovieDraft> {
        let mut movies: Vec<MovieDraft> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut skipped = 0;
        let mut duplicates = 0;

        for torrent in torrents {
            let Some(draft) = self.get_content_data(torrent, language) else {
                skipped += 1;
                continue;
            };

            let key = (draft.title.clone(), draft.slug.clone());
            match index.get(&key) {
                Some(&position) => {
                    let dropped = movies[position].torrents.absorb(draft.torrents);
                    if dropped > 0 {
                        debug!(
                            provider = %self.name,
                            title = %torrent.title,
                            "Bucket already filled, dropping torrent"
                        );
                    }
                    duplicates += dropped;
                }
                None => {
                    index.insert(key, movies.len());
                    movies.push(draft);
                }
            }
        }

        info!(
            provider = %self.name,
            language = language,
            torrents = torrents.len(),
            movies = movies.len(),
            skipped = skipped,
            duplicates = duplicates,
            "Aggregated torrents"
        );

        movies
    }
}
