//! External provider clients.
//!
//! Every provider goes through the same retrying [`ApiClient`]. Trakt
//! supplies identity and metadata; TMDB, OMDb and Fanart.tv supply artwork,
//! in that order of preference.

pub mod client;
pub mod fanart;
pub mod omdb;
pub mod tmdb;
pub mod trakt;
pub mod types;

pub use client::ApiClient;
pub use fanart::FanartClient;
pub use omdb::OmdbClient;
pub use tmdb::TmdbClient;
pub use trakt::TraktClient;
pub use types::*;
