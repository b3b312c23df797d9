//! Movie persistence.
//!
//! `MovieStore` is the find/insert/replace surface the reconciler works
//! against; `SqliteMovieStore` keeps each record as a JSON document in the
//! `movies` table.

use crate::models::MovieRecord;
use crate::Database;
use anyhow::{bail, Context, Result};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

/// Storage for persisted movie records, keyed by identity
pub trait MovieStore {
    /// Look up a record by its identity key
    fn find_by_id(&self, id: &str) -> Result<Option<MovieRecord>>;

    /// Store a new record
    fn insert(&mut self, record: &MovieRecord) -> Result<MovieRecord>;

    /// Overwrite the record stored under `id`
    fn replace(&mut self, id: &str, record: &MovieRecord) -> Result<MovieRecord>;
}

/// SQLite-backed movie store
pub struct SqliteMovieStore {
    db: Database,
}

impl SqliteMovieStore {
    /// Create a new store over the given database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Number of stored movies
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .db
            .conn()
            .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
            .context("Failed to count movies")?;
        Ok(count as u64)
    }

}

impl MovieStore for SqliteMovieStore {
    fn find_by_id(&self, id: &str) -> Result<Option<MovieRecord>> {
        let data: Option<String> = self
            .db
            .conn()
            .query_row(
                "SELECT data FROM movies WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to query movie {}", id))?;

        data.map(|json| decode(&json)).transpose()
    }

    fn insert(&mut self, record: &MovieRecord) -> Result<MovieRecord> {
        let data = serde_json::to_string(record).context("Failed to serialize movie")?;

        self.db
            .conn_mut()
            .execute(
                "INSERT INTO movies (id, slug, title, year, last_updated, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.slug,
                    record.title,
                    record.year,
                    record.last_updated,
                    data,
                ],
            )
            .with_context(|| format!("Failed to insert movie {}", record.id))?;

        debug!(id = %record.id, title = %record.title, "Inserted movie");
        Ok(record.clone())
    }

    fn replace(&mut self, id: &str, record: &MovieRecord) -> Result<MovieRecord> {
        let data = serde_json::to_string(record).context("Failed to serialize movie")?;

        let updated = self
            .db
            .conn_mut()
            .execute(
                "UPDATE movies
                 SET id = ?1, slug = ?2, title = ?3, year = ?4, last_updated = ?5, data = ?6
                 WHERE id = ?7",
                params![
                    record.id,
                    record.slug,
                    record.title,
                    record.year,
                    record.last_updated,
                    data,
                    id,
                ],
            )
            .with_context(|| format!("Failed to update movie {}", id))?;

        if updated == 0 {
            bail!("Movie {} does not exist", id);
        }

        debug!(id = %id, title = %record.title, "Replaced movie");
        Ok(record.clone())
    }
}

fn decode(json: &str) -> Result<MovieRecord> {
    serde_json::from_str(json).context("Failed to parse stored movie")
}
