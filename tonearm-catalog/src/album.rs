use serde::{Deserialize, Serialize};

use crate::{ArtistObject, Client, ClientResult, Image, Paging, TrackObject};

/// An album as returned by the catalog. The single-album endpoint embeds
/// the first page of its tracks; list endpoints do not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumObject {
    /// The album ID.
    pub id: Option<String>,
    /// The album name.
    pub name: Option<String>,
    /// The album artists.
    pub artists: Option<Vec<ArtistObject>>,
    /// Cover art, widest first.
    pub images: Option<Vec<Image>>,
    /// The release date, at whatever precision the catalog has.
    pub release_date: Option<String>,
    /// The number of tracks on the album.
    pub total_tracks: Option<u32>,
    /// The first page of the album's tracks.
    pub tracks: Option<Paging<TrackObject>>,
}

/// Album-related endpoints.
impl Client {
    /// Get a specific album, including the first page of its tracks.
    pub async fn get_album(&self, token: &str, id: &str) -> ClientResult<AlbumObject> {
        self.request(token, &format!("albums/{id}"), &[]).await
    }
}
