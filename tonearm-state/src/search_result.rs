use serde::{Deserialize, Serialize};

use crate::{Album, Artist, Track, tc};

/// The tracks, albums and artists matching a search.
///
/// Whether there are results is always derived from the three lists, never
/// stored alongside them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matching tracks, in catalog order
    pub tracks: Vec<Track>,
    /// Matching albums, in catalog order
    pub albums: Vec<Album>,
    /// Matching artists, in catalog order
    pub artists: Vec<Artist>,
}
impl SearchResult {
    /// A result with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any of the three lists is non-empty.
    pub fn has_results(&self) -> bool {
        !(self.tracks.is_empty() && self.albums.is_empty() && self.artists.is_empty())
    }

    /// Whether all three lists are empty.
    pub fn is_empty(&self) -> bool {
        !self.has_results()
    }
}
impl From<tc::SearchResponse> for SearchResult {
    fn from(response: tc::SearchResponse) -> Self {
        fn items<T, U: From<T>>(page: Option<tc::Paging<T>>) -> Vec<U> {
            page.map(tc::Paging::into_items)
                .unwrap_or_default()
                .into_iter()
                .map(U::from)
                .collect()
        }

        SearchResult {
            tracks: items(response.tracks),
            albums: items(response.albums),
            artists: items(response.artists),
        }
    }
}
