//! Response types of the external metadata and image providers.

use serde::{Deserialize, Serialize};

/// Trakt movie summary (`extended=full`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktMovie {
    pub title: String,
    pub year: Option<u32>,
    pub ids: TraktIds,
    pub overview: Option<String>,
    pub runtime: Option<u32>,
    pub votes: Option<u32>,
    /// Rating on a 0-10 scale
    pub rating: Option<f64>,
    pub language: Option<String>,
    /// Release date, `YYYY-MM-DD`
    pub released: Option<String>,
    pub trailer: Option<String>,
    pub certification: Option<String>,
    pub genres: Option<Vec<String>>,
}

/// Cross-reference ids of a Trakt movie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktIds {
    pub trakt: Option<u64>,
    pub slug: Option<String>,
    pub imdb: Option<String>,
    pub tmdb: Option<u64>,
}

/// A Trakt user currently watching a movie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktWatcher {
    #[serde(default)]
    pub username: Option<String>,
}

/// TMDB image listing of a movie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbImages {
    #[serde(default)]
    pub posters: Vec<TmdbImage>,
    #[serde(default)]
    pub backdrops: Vec<TmdbImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbImage {
    pub iso_639_1: Option<String>,
    pub file_path: String,
}

impl TmdbImage {
    /// English or language-neutral artwork
    pub fn is_english_or_neutral(&self) -> bool {
        matches!(self.iso_639_1.as_deref(), None | Some("en"))
    }
}

/// OMDb lookup result; only the poster is used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OmdbMovie {
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

impl OmdbMovie {
    /// The poster URL, if OMDb has one
    pub fn poster_url(&self) -> Option<&str> {
        self.poster
            .as_deref()
            .filter(|poster| !poster.is_empty() && *poster != "N/A")
    }
}

/// Fanart.tv artwork of a movie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanartImages {
    pub moviebanner: Option<Vec<FanartImage>>,
    pub moviebackground: Option<Vec<FanartImage>>,
    pub hdmovieclearart: Option<Vec<FanartImage>>,
    pub movieposter: Option<Vec<FanartImage>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanartImage {
    pub url: String,
}

/// URL of the first image of a Fanart.tv list
pub fn first_url(images: &Option<Vec<FanartImage>>) -> Option<String> {
    images
        .as_ref()
        .and_then(|list| list.first())
        .map(|image| image.url.clone())
}
