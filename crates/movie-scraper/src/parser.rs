//! Torrent title parsing.
//!
//! Extracts the movie title, release year and quality from free-text
//! tracker titles such as `The.Matrix.1999.1080p.BluRay.x264`, and derives
//! the URL-safe slug used to look the movie up.

use crate::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use shared::Quality;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Title patterns, most specific first. Each captures title, year and quality.
static PATTERNS: Lazy<[(&str, Regex); 3]> = Lazy::new(|| {
    [
        (
            "3d",
            Regex::new(r"(?i)(.*).([0-9]{4}).[3Dd][^0-9]+([0-9]{3,4}p)").unwrap(),
        ),
        (
            "4k",
            Regex::new(r"(?i)(.*).([0-9]{4}).[4k][^0-9]+([0-9]{3,4}p)").unwrap(),
        ),
        (
            "year",
            Regex::new(r"(?i)(.*).([0-9]{4})[^0-9]+([0-9]{3,4}p)").unwrap(),
        ),
    ]
});

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9 ]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Known mis-parses and their canonical slugs
static BUILTIN_OVERRIDES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("fantastic-four", "fantastic-four-2015"),
        ("point-break", "point-break-2015"),
        ("the-jungle-book", "the-jungle-book-2016"),
        ("the-magnificent-seven", "the-magnificent-seven-2016"),
        ("the-girl-with-the-dragon-tattoo", "the-girl-with-the-dragon-tattoo-2011"),
        ("robocop", "robocop-2014"),
    ])
});

/// Movie identity extracted from a torrent title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub title: String,
    pub slug: String,
    pub year: u32,
    pub quality: Quality,
}

/// Slug remapping table, consulted after a slug is derived
#[derive(Debug, Clone, Default)]
pub struct SlugOverrides {
    map: HashMap<String, String>,
}

impl SlugOverrides {
    /// The built-in table
    pub fn builtin() -> Self {
        Self {
            map: BUILTIN_OVERRIDES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// The built-in table with `extra` entries layered on top
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut overrides = Self::builtin();
        overrides
            .map
            .extend(extra.iter().map(|(from, to)| (from.clone(), to.clone())));
        overrides
    }

    pub fn get(&self, slug: &str) -> Option<&str> {
        self.map.get(slug).map(String::as_str)
    }
}

/// Title parser with its slug override table
#[derive(Debug, Clone)]
pub struct TitleParser {
    overrides: Arc<SlugOverrides>,
}

impl Default for TitleParser {
    fn default() -> Self {
        Self::new(SlugOverrides::builtin())
    }
}

impl TitleParser {
    pub fn new(overrides: SlugOverrides) -> Self {
        Self {
            overrides: Arc::new(overrides),
        }
    }

    /// Parse a raw torrent title.
    ///
    /// The first pattern that matches wins; later ones are not tried.
    pub fn parse(&self, raw_title: &str) -> Result<ParsedTitle, ParseError> {
        let captures = PATTERNS
            .iter()
            .find_map(|(_, pattern)| pattern.captures(raw_title))
            .ok_or_else(|| ParseError::NoPatternMatched(raw_title.to_string()))?;

        let quality_token = &captures[3];
        let quality = quality_token
            .parse::<Quality>()
            .map_err(|_| ParseError::UnsupportedQuality {
                title: raw_title.to_string(),
                quality: quality_token.to_string(),
            })?;

        // Four ASCII digits always fit
        let year = captures[2].parse::<u32>().unwrap_or_default();

        let title = clean_title(&captures[1]);
        let slug = self.slugify(&title);

        Ok(ParsedTitle {
            title,
            slug,
            year,
            quality,
        })
    }

    /// Derive the slug of a title, applying the override table last
    pub fn slugify(&self, title: &str) -> String {
        let slug = derive_slug(title);
        match self.overrides.get(&slug) {
            Some(canonical) => canonical.to_string(),
            None => slug,
        }
    }

    /// Name of the first pattern matching `raw_title`
    #[cfg(test)]
    fn matching_pattern(raw_title: &str) -> Option<&'static str> {
        PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(raw_title))
            .map(|(name, _)| *name)
    }
}

fn clean_title(raw: &str) -> String {
    let title = raw.strip_suffix(' ').unwrap_or(raw);
    title.replace('.', " ")
}

fn derive_slug(title: &str) -> String {
    let stripped = NON_ALPHANUMERIC.replace_all(title, "");
    let mut slug = WHITESPACE.replace_all(&stripped, "-").to_lowercase();
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}
