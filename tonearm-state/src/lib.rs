//! Representations of tonearm's catalog records, and the mapping from the raw
//! catalog payloads into them.
//!
//! Mapping never fails: absent or null fields fall back to fixed defaults.
//! Separated out to allow for use in other utilities.
#![deny(missing_docs)]

pub use tonearm_catalog as tc;

mod album;
pub use album::{Album, AlbumId, dedup_albums_by_name};

mod artist;
pub use artist::{Artist, ArtistId};

mod track;
pub use track::{Track, TrackId};

mod search_result;
pub use search_result::SearchResult;

/// Display name used when a track has no name.
pub const UNKNOWN_TRACK: &str = "Unknown track";
/// Display name used when an album has no name.
pub const UNKNOWN_ALBUM: &str = "Unknown album";
/// Display name used when no artist name is available.
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

/// Joins the names of `artists` with `", "`, falling back to
/// [`UNKNOWN_ARTIST`] when there are none.
pub(crate) fn joined_artist_names(artists: Option<&[tc::ArtistObject]>) -> String {
    let joined = artists
        .unwrap_or_default()
        .iter()
        .filter_map(|a| a.name.as_deref())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        joined
    }
}

pub(crate) fn first_image(images: Option<&[tc::Image]>) -> String {
    tc::first_image_url(images).unwrap_or_default().to_string()
}
