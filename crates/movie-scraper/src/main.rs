//! Movie scraper CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use movie_scraper::{load_batch, MovieScraper};
use shared::{Config, Database, LogConfig, SqliteMovieStore};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Language of the torrents (defaults to the configured language)
    #[arg(short, long)]
    language: Option<String>,

    /// Provider name stamped on the torrents (defaults to the file name)
    #[arg(short, long)]
    provider: Option<String>,

    /// JSON files of raw tracker results, one batch per file
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config =
        LogConfig::from_settings(&config.logging, &config.log_dir(), "movie-scraper");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!("Movie scraper starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    let language = args
        .language
        .clone()
        .unwrap_or_else(|| config.scraper.default_language.clone());

    // Read every batch up front so a bad file fails before any work
    let batches = args
        .inputs
        .iter()
        .map(|path| load_batch(path, args.provider.as_deref(), &language))
        .collect::<Result<Vec<_>>>()?;

    // Initialize database
    let db_path = config.database_path();
    info!(db_path = %db_path.display(), "Opening database");
    let database = Database::open(&db_path).context("Failed to open database")?;
    let store = SqliteMovieStore::new(database);

    // Initialize scraper
    let mut scraper =
        MovieScraper::from_config(&config, store).context("Failed to create scraper")?;

    info!("Starting scraping process");
    let stats = scraper.run(batches).await.context("Scraper failed")?;

    // Display final statistics
    info!("=== Scraping Complete ===");
    info!("Batches processed: {}", stats.batches);
    info!("Torrents seen: {}", stats.torrents_seen);
    info!("Torrent entries rejected: {}", stats.torrents_rejected);
    info!("Movies aggregated: {}", stats.movies_aggregated);
    info!("Movies enriched: {}", stats.enriched);
    info!("Enrichment failures: {}", stats.enrichment_failed);
    info!("Movies inserted: {}", stats.inserted);
    info!("Movies updated: {}", stats.updated);
    info!("Store errors: {}", stats.store_errors);

    let total = scraper.store().count().context("Failed to count movies")?;
    info!("Movies in database: {}", total);

    info!("Movie scraper finished successfully");

    Ok(())
}
