//! Loading raw tracker results from disk.

use crate::normalizer::RawTorrent;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Raw results of one tracker, tagged with their language
#[derive(Debug, Clone)]
pub struct TorrentBatch {
    /// Provider name stamped on every torrent of the batch
    pub provider: String,
    pub language: String,
    pub torrents: Vec<RawTorrent>,
    /// Entries that could not be read as a raw torrent
    pub rejected: usize,
}

/// Read a JSON array of raw torrents.
///
/// The provider name defaults to the file stem. Entries are decoded one by
/// one: `null` entries are skipped and malformed ones are logged and
/// counted, so only an unreadable file or a non-array document fails.
pub fn load_batch(
    path: impl AsRef<Path>,
    provider: Option<&str>,
    language: &str,
) -> Result<TorrentBatch> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read torrent file: {}", path.display()))?;
    let entries: Vec<Value> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse torrent file: {}", path.display()))?;

    let provider = match provider {
        Some(name) => name.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    };

    let mut torrents = Vec::with_capacity(entries.len());
    let mut rejected = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        if entry.is_null() {
            continue;
        }
        match serde_json::from_value::<RawTorrent>(entry) {
            Ok(torrent) => torrents.push(torrent),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    index = index,
                    error = %e,
                    "Skipping malformed torrent entry"
                );
                rejected += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        provider = %provider,
        language = language,
        torrents = torrents.len(),
        rejected = rejected,
        "Loaded torrent batch"
    );

    Ok(TorrentBatch {
        provider,
        language: language.to_string(),
        torrents,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::RawSize;
    use tempfile::TempDir;

    #[test]
    fn test_load_batch() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("yts.json");
        fs::write(
            &path,
            r#"[
                {"title": "The.Matrix.1999.1080p", "size": "1.5 GB", "seeds": 100, "peers": 4, "magnet": "magnet:?xt=urn:btih:abc"},
                {"title": "Heat.1995.720p", "fileSize": 1073741824, "torrent_link": "https://yts.example/heat.torrent"}
            ]"#,
        )?;

        let batch = load_batch(&path, None, "en")?;
        assert_eq!(batch.provider, "yts");
        assert_eq!(batch.language, "en");
        assert_eq!(batch.torrents.len(), 2);
        assert_eq!(batch.rejected, 0);
        assert_eq!(batch.torrents[0].seeds, Some(100));
        assert_eq!(batch.torrents[1].file_size, Some(RawSize::Bytes(1_073_741_824)));
        assert_eq!(
            batch.torrents[1].torrent_link.as_deref(),
            Some("https://yts.example/heat.torrent")
        );
        Ok(())
    }

    #[test]
    fn test_load_batch_provider_override() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("dump.json");
        fs::write(&path, "[]")?;

        let batch = load_batch(&path, Some("ExtraTorrent"), "fr")?;
        assert_eq!(batch.provider, "ExtraTorrent");
        assert_eq!(batch.language, "fr");
        assert!(batch.torrents.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_batch_errors() -> Result<()> {
        let dir = TempDir::new()?;
        assert!(load_batch(dir.path().join("missing.json"), None, "en").is_err());

        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json")?;
        assert!(load_batch(&path, None, "en").is_err());

        let path = dir.path().join("object.json");
        fs::write(&path, r#"{"title": "Heat.1995.720p"}"#)?;
        assert!(load_batch(&path, None, "en").is_err());
        Ok(())
    }

    #[test]
    fn test_bad_entries_do_not_sink_the_batch() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("yts.json");
        fs::write(
            &path,
            r#"[
                null,
                {"title": "Heat.1995.720p", "size": "800 MB", "magnet": "magnet:heat"},
                {"title": "Alien.1979.1080p", "size": "2 GB", "seeds": "12", "magnet": "magnet:alien"},
                {"size": "1 GB", "magnet": "magnet:untitled"},
                {"title": "The.Matrix.1999.1080p", "size": "1.5 GB", "seeds": 100, "magnet": "magnet:matrix"}
            ]"#,
        )?;

        let batch = load_batch(&path, None, "en")?;
        let titles: Vec<&str> = batch.torrents.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Heat.1995.720p", "The.Matrix.1999.1080p"]);
        assert_eq!(batch.rejected, 2);
        Ok(())
    }
}
