//! Configuration management for the movie scraper.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::models::PLACEHOLDER_IMAGE;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Database settings
    pub database: DatabaseConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// External metadata and image providers
    pub providers: ProvidersConfig,

    /// Aggregation and enrichment settings
    #[serde(default)]
    pub scraper: ScraperConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path (relative to data directory or absolute)
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// External provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Timeout for every external call, in seconds
    pub timeout_seconds: u64,

    /// Maximum retries for failed requests
    pub max_retries: u32,

    /// Retry delay in milliseconds (doubled on each attempt)
    pub retry_delay_ms: u64,

    /// Trakt metadata provider
    pub trakt: TraktConfig,

    /// TMDB image provider
    pub tmdb: TmdbConfig,

    /// OMDb image provider
    pub omdb: ApiKeyConfig,

    /// Fanart.tv image provider
    pub fanart: ApiKeyConfig,
}

/// Trakt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktConfig {
    pub base_url: String,
    pub client_id: String,
}

/// TMDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub base_url: String,
    pub image_base_url: String,
    /// Size token used when building image URLs (e.g. w500)
    pub image_size: String,
    pub api_key: String,
}

/// Configuration for providers authenticated with a plain API key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Language code assigned to torrents when none is given
    pub default_language: String,

    /// Maximum number of slugs enriched at the same time
    pub max_concurrent_enrichments: usize,

    /// Image used when no provider has artwork for a slot
    pub placeholder_image: String,

    /// Extra slug remappings, applied on top of the built-in table
    #[serde(default)]
    pub slug_overrides: BTreeMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            max_concurrent_enrichments: 5,
            placeholder_image: PLACEHOLDER_IMAGE.to_string(),
            slug_overrides: BTreeMap::new(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_ms: 1000,
            trakt: TraktConfig {
                base_url: "https://api.trakt.tv".to_string(),
                client_id: String::new(),
            },
            tmdb: TmdbConfig {
                base_url: "https://api.themoviedb.org/3".to_string(),
                image_base_url: "https://image.tmdb.org/t/p".to_string(),
                image_size: "w500".to_string(),
                api_key: String::new(),
            },
            omdb: ApiKeyConfig {
                base_url: "https://www.omdbapi.com".to_string(),
                api_key: String::new(),
            },
            fanart: ApiKeyConfig {
                base_url: "https://webservice.fanart.tv/v3".to_string(),
                api_key: String::new(),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            database: DatabaseConfig {
                path: "movies.db".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            providers: ProvidersConfig::default(),
            scraper: ScraperConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the database file
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database.path)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}
