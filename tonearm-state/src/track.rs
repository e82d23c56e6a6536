use serde::{Deserialize, Serialize};

use crate::{UNKNOWN_ALBUM, UNKNOWN_TRACK, first_image, joined_artist_names, tc};

/// A track ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);
impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A track, as `tonearm` cares about it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// The track ID; empty if the catalog did not supply one
    pub id: TrackId,
    /// The track name
    pub name: String,
    /// The performing artists, comma-joined
    pub artist_name: String,
    /// The name of the album the track appears on
    pub album_name: String,
    /// The URL of the album art
    pub album_image: String,
    /// The duration in milliseconds
    pub duration_ms: u64,
    /// A link to a 30 second preview, if available
    pub preview_url: Option<String>,
}
impl Track {
    /// Whether the track carries a usable ID.
    pub fn has_id(&self) -> bool {
        !self.id.0.is_empty()
    }

    /// Map a track embedded in an album payload. Such tracks carry no album
    /// object, so the enclosing album's name and art are used instead.
    pub fn from_album_track(track: tc::TrackObject, album_name: &str, album_image: &str) -> Self {
        Track {
            album_name: album_name.to_string(),
            album_image: album_image.to_string(),
            ..Track::from(tc::TrackObject {
                album: None,
                ..track
            })
        }
    }
}
impl From<tc::TrackObject> for Track {
    fn from(track: tc::TrackObject) -> Self {
        let album = track.album.as_deref();
        Track {
            id: TrackId(track.id.unwrap_or_default()),
            name: track
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_TRACK.to_string()),
            artist_name: joined_artist_names(track.artists.as_deref()),
            album_name: album
                .and_then(|a| a.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            album_image: first_image(album.and_then(|a| a.images.as_deref())),
            duration_ms: track.duration_ms.unwrap_or_default(),
            preview_url: track.preview_url.filter(|u| !u.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNKNOWN_ARTIST;

    #[test]
    fn test_track_from_full_payload() {
        let raw: tc::TrackObject = serde_json::from_str(
            r#"{
                "id": "t1",
                "name": "Harder, Better, Faster, Stronger",
                "artists": [{"id": "a1", "name": "Daft Punk"}],
                "album": {"name": "Discovery", "images": [{"url": "https://img/big"}, {"url": "https://img/small"}]},
                "duration_ms": 224693,
                "preview_url": "https://p/t1"
            }"#,
        )
        .unwrap();
        let track = Track::from(raw);
        assert_eq!(track.id, TrackId("t1".to_string()));
        assert_eq!(track.artist_name, "Daft Punk");
        assert_eq!(track.album_name, "Discovery");
        assert_eq!(track.album_image, "https://img/big");
        assert_eq!(track.duration_ms, 224693);
        assert_eq!(track.preview_url.as_deref(), Some("https://p/t1"));
        assert!(track.has_id());
    }

    #[test]
    fn test_track_defaults() {
        let track = Track::from(tc::TrackObject::default());
        assert_eq!(track.id.0, "");
        assert!(!track.has_id());
        assert_eq!(track.name, UNKNOWN_TRACK);
        assert_eq!(track.artist_name, UNKNOWN_ARTIST);
        assert_eq!(track.album_name, UNKNOWN_ALBUM);
        assert_eq!(track.album_image, "");
        assert_eq!(track.duration_ms, 0);
        assert_eq!(track.preview_url, None);
    }

    #[test]
    fn test_album_track_inherits_album() {
        let raw = tc::TrackObject {
            id: Some("t9".to_string()),
            name: Some("Intro".to_string()),
            ..Default::default()
        };
        let track = Track::from_album_track(raw, "Blue", "https://img/blue");
        assert_eq!(track.album_name, "Blue");
        assert_eq!(track.album_image, "https://img/blue");
        assert_eq!(track.name, "Intro");
    }
}
