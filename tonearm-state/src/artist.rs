use serde::{Deserialize, Serialize};

use crate::{UNKNOWN_ARTIST, first_image, tc};

/// An artist ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub String);
impl std::fmt::Display for ArtistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An artist, as `tonearm` cares about it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// The artist ID; empty if the catalog did not supply one
    pub id: ArtistId,
    /// The artist name
    pub name: String,
    /// The URL of the artist image
    pub image: String,
    /// Genre tags, in catalog order
    pub genres: Vec<String>,
    /// Popularity between 0 and 100
    pub popularity: u32,
}
impl Artist {
    /// Whether the artist carries a usable ID.
    pub fn has_id(&self) -> bool {
        !self.id.0.is_empty()
    }
}
impl From<tc::ArtistObject> for Artist {
    fn from(artist: tc::ArtistObject) -> Self {
        Artist {
            id: ArtistId(artist.id.unwrap_or_default()),
            name: artist
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            image: first_image(artist.images.as_deref()),
            genres: artist.genres.unwrap_or_default(),
            popularity: artist.popularity.unwrap_or_default(),
        }
    }
}
