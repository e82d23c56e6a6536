use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Track, UNKNOWN_ALBUM, first_image, joined_artist_names, tc};

/// An album ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(pub String);
impl std::fmt::Display for AlbumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An album, as `tonearm` cares about it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// The album ID; empty if the catalog did not supply one
    pub id: AlbumId,
    /// The album name
    pub name: String,
    /// The album artists, comma-joined
    pub artist_name: String,
    /// The URL of the cover art
    pub image: String,
    /// The release date, as delivered by the catalog
    pub release_date: String,
    /// The number of tracks on the album
    pub total_tracks: u32,
}
impl Album {
    /// Whether the album carries a usable ID.
    pub fn has_id(&self) -> bool {
        !self.id.0.is_empty()
    }

    /// Maps the tracks embedded in a single-album payload. Each track
    /// inherits the album's name and cover art.
    pub fn tracks_from_payload(album: tc::AlbumObject) -> Vec<Track> {
        let album_image = first_image(album.images.as_deref());
        let album_name = album
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());
        album
            .tracks
            .map(tc::Paging::into_items)
            .unwrap_or_default()
            .into_iter()
            .map(|t| Track::from_album_track(t, &album_name, &album_image))
            .collect()
    }
}
impl From<tc::AlbumObject> for Album {
    fn from(album: tc::AlbumObject) -> Self {
        Album {
            id: AlbumId(album.id.unwrap_or_default()),
            name: album
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            artist_name: joined_artist_names(album.artists.as_deref()),
            image: first_image(album.images.as_deref()),
            release_date: album.release_date.unwrap_or_default(),
            total_tracks: album.total_tracks.unwrap_or_default(),
        }
    }
}

/// Removes albums whose name exactly matches an earlier album's, keeping the
/// first occurrence and the original order.
///
/// Same-named re-releases and deluxe editions with identical titles collapse
/// into one entry. That is an accepted approximation for artist listings.
pub fn dedup_albums_by_name(albums: Vec<Album>) -> Vec<Album> {
    let mut seen = HashSet::new();
    albums
        .into_iter()
        .filter(|album| seen.insert(album.name.clone()))
        .collect()
}
