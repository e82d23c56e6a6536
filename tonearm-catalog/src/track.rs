use serde::{Deserialize, Serialize};

use crate::{AlbumObject, ArtistObject, Client, ClientResult};

/// A track as returned by the catalog. Tracks embedded in an album
/// payload carry no `album`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackObject {
    /// The track ID.
    pub id: Option<String>,
    /// The track name.
    pub name: Option<String>,
    /// The artists who performed the track.
    pub artists: Option<Vec<ArtistObject>>,
    /// The album the track appears on.
    pub album: Option<Box<AlbumObject>>,
    /// The track length in milliseconds.
    pub duration_ms: Option<u64>,
    /// A link to a 30 second preview, if available.
    pub preview_url: Option<String>,
}

/// Track-related endpoints.
impl Client {
    /// Get a single track.
    pub async fn get_track(&self, token: &str, id: &str) -> ClientResult<TrackObject> {
        self.request(token, &format!("tracks/{id}"), &[]).await
    }
}
