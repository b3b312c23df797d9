//! Merging freshly scraped movies with what is already stored.
//!
//! For every language of the stored record, the 720p and 1080p buckets are
//! compared with the incoming ones. A stored torrent is carried over when
//! the incoming record has nothing in that bucket, when it has more seeds,
//! or when both point at the same URL with equal seeds. Otherwise the
//! incoming torrent stays. Languages only the incoming record has are left
//! alone.

use anyhow::{Context, Result};
use shared::{MovieRecord, MovieStore, Quality, Torrents};
use tracing::{debug, info};

/// Qualities whose buckets are reconciled
pub const RECONCILED_QUALITIES: [Quality; 2] = [Quality::P720, Quality::P1080];

/// What happened to a reconciled record
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    Inserted(MovieRecord),
    Updated(MovieRecord),
}

/// Persist `incoming`, merging its torrents with any stored record.
///
/// The stored record is replaced as a whole; only the torrent buckets are
/// merged. Callers must not reconcile the same id concurrently.
pub fn reconcile<S: MovieStore + ?Sized>(
    store: &mut S,
    mut incoming: MovieRecord,
) -> Result<Reconciled> {
    let found = store
        .find_by_id(&incoming.id)
        .with_context(|| format!("Failed to look up movie {}", incoming.id))?;

    match found {
        Some(found) => {
            info!(id = %found.id, title = %found.title, "Existing movie");

            merge_torrents(&mut incoming.torrents, &found.torrents);

            let saved = store
                .replace(&found.id, &incoming)
                .with_context(|| format!("Failed to update movie {}", found.id))?;
            Ok(Reconciled::Updated(saved))
        }
        None => {
            info!(id = %incoming.id, title = %incoming.title, "New movie");

            let saved = store
                .insert(&incoming)
                .with_context(|| format!("Failed to insert movie {}", incoming.id))?;
            Ok(Reconciled::Inserted(saved))
        }
    }
}

/// Carry stored torrents over into `incoming`, bucket by bucket
pub fn merge_torrents(incoming: &mut Torrents, found: &Torrents) {
    for language in found.languages() {
        for quality in RECONCILED_QUALITIES {
            let Some(stored) = found.get(language, quality) else {
                continue;
            };

            let keep_stored = match incoming.get(language, quality) {
                None => true,
                Some(current) => prefer_stored(stored, current),
            };

            if keep_stored {
                debug!(
                    language = language,
                    quality = %quality,
                    seeds = stored.seeds,
                    "Keeping stored torrent"
                );
                incoming.insert(language, quality, stored.clone());
            }
        }
    }
}

fn prefer_stored(stored: &shared::TorrentDescriptor, incoming: &shared::TorrentDescriptor) -> bool {
    if stored.seeds > incoming.seeds {
        true
    } else if incoming.seeds > stored.seeds {
        false
    } else {
        stored.url == incoming.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Database, Images, Rating, SqliteMovieStore, TorrentDescriptor};

    fn torrent(url: &str, seeds: u32) -> TorrentDescriptor {
        TorrentDescriptor {
            url: url.to_string(),
            seeds,
            peers: 1,
            size: 1_000,
            filesize: "1 KB".to_string(),
            provider: "YTS".to_string(),
        }
    }

    fn record(title: &str, torrents: Torrents) -> MovieRecord {
        MovieRecord {
            id: "tt0133093".to_string(),
            imdb_id: "tt0133093".to_string(),
            tmdb_id: 603,
            title: title.to_string(),
            year: Some(1999),
            slug: "the-matrix-1999".to_string(),
            synopsis: None,
            runtime: None,
            rating: Rating::default(),
            country: None,
            last_updated: 0,
            images: Images::default(),
            genres: vec!["unknown".to_string()],
            released: None,
            trailer: None,
            certification: None,
            torrents,
        }
    }

    fn torrents(entries: &[(&str, Quality, &str, u32)]) -> Torrents {
        let mut torrents = Torrents::new();
        for (language, quality, url, seeds) in entries {
            torrents.insert(language, *quality, torrent(url, *seeds));
        }
        torrents
    }

    fn store() -> SqliteMovieStore {
        SqliteMovieStore::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_stored_torrent_with_more_seeds_is_kept() {
        let mut incoming = torrents(&[("en", Quality::P720, "magnet:new", 10)]);
        let found = torrents(&[("en", Quality::P720, "magnet:old", 50)]);

        merge_torrents(&mut incoming, &found);

        let kept = incoming.get("en", Quality::P720).unwrap();
        assert_eq!(kept.seeds, 50);
        assert_eq!(kept.url, "magnet:old");
    }

    #[test]
    fn test_incoming_torrent_with_more_seeds_stays() {
        let mut incoming = torrents(&[("en", Quality::P1080, "magnet:new", 80)]);
        let found = torrents(&[("en", Quality::P1080, "magnet:old", 50)]);

        merge_torrents(&mut incoming, &found);

        assert_eq!(incoming.get("en", Quality::P1080).unwrap().url, "magnet:new");
    }

    #[test]
    fn test_equal_seeds_same_url_takes_stored() {
        let mut incoming = torrents(&[("en", Quality::P720, "magnet:same", 20)]);
        incoming.insert(
            "en",
            Quality::P720,
            TorrentDescriptor {
                provider: "ExtraTorrent".to_string(),
                ..torrent("magnet:same", 20)
            },
        );
        let found = torrents(&[("en", Quality::P720, "magnet:same", 20)]);

        merge_torrents(&mut incoming, &found);

        assert_eq!(incoming.get("en", Quality::P720).unwrap().provider, "YTS");
    }

    #[test]
    fn test_equal_seeds_different_url_keeps_incoming() {
        let mut incoming = torrents(&[("en", Quality::P720, "magnet:new", 20)]);
        let found = torrents(&[("en", Quality::P720, "magnet:old", 20)]);

        merge_torrents(&mut incoming, &found);

        assert_eq!(incoming.get("en", Quality::P720).unwrap().url, "magnet:new");
    }

    #[test]
    fn test_stored_only_buckets_are_carried_over() {
        let mut incoming = torrents(&[("en", Quality::P720, "magnet:en", 5)]);
        let found = torrents(&[
            ("en", Quality::P1080, "magnet:en-hd", 5),
            ("fr", Quality::P1080, "magnet:fr-hd", 7),
        ]);

        merge_torrents(&mut incoming, &found);

        assert_eq!(incoming.len(), 3);
        assert_eq!(incoming.get("fr", Quality::P1080).unwrap().seeds, 7);
        assert_eq!(incoming.get("en", Quality::P1080).unwrap().url, "magnet:en-hd");
    }

    #[test]
    fn test_only_720p_and_1080p_are_reconciled() {
        let mut incoming = Torrents::new();
        let found = torrents(&[("en", Quality::P2160, "magnet:uhd", 100)]);

        merge_torrents(&mut incoming, &found);

        assert!(incoming.is_empty());
    }

    #[test]
    fn test_incoming_only_languages_pass_through() {
        let mut incoming = torrents(&[("de", Quality::P720, "magnet:de", 1)]);
        let found = torrents(&[("en", Quality::P720, "magnet:en", 1)]);

        merge_torrents(&mut incoming, &found);

        assert_eq!(incoming.get("de", Quality::P720).unwrap().url, "magnet:de");
        assert_eq!(incoming.get("en", Quality::P720).unwrap().url, "magnet:en");
    }

    #[test]
    fn test_reconcile_inserts_new_movie() -> Result<()> {
        let mut store = store();
        let incoming = record("The Matrix", torrents(&[("en", Quality::P720, "magnet:a", 3)]));

        let outcome = reconcile(&mut store, incoming.clone())?;
        assert_eq!(outcome, Reconciled::Inserted(incoming.clone()));
        assert_eq!(store.find_by_id("tt0133093")?, Some(incoming));
        Ok(())
    }

    #[test]
    fn test_reconcile_updates_existing_movie() -> Result<()> {
        let mut store = store();
        store.insert(&record(
            "The Matrix",
            torrents(&[
                ("en", Quality::P720, "magnet:old", 50),
                ("fr", Quality::P1080, "magnet:fr", 9),
            ]),
        ))?;

        let incoming = record(
            "The Matrix (1999)",
            torrents(&[("en", Quality::P720, "magnet:new", 10)]),
        );
        let outcome = reconcile(&mut store, incoming)?;
        assert!(matches!(outcome, Reconciled::Updated(_)));

        let stored = store.find_by_id("tt0133093")?.unwrap();
        assert_eq!(stored.title, "The Matrix (1999)");
        assert_eq!(stored.torrents.get("en", Quality::P720).unwrap().seeds, 50);
        assert_eq!(stored.torrents.get("fr", Quality::P1080).unwrap().url, "magnet:fr");
        assert_eq!(store.count()?, 1);
        Ok(())
    }
}
