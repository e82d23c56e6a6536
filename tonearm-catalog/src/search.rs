use serde::{Deserialize, Serialize};

use crate::{AlbumObject, ArtistObject, Client, ClientResult, Paging, TrackObject};

/// A request to the `search` endpoint. Tracks, albums and artists are
/// always searched together.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// The search query.
    pub query: String,
    /// The maximum number of results to return per type.
    pub limit: Option<u32>,
    /// The market to restrict results to.
    pub market: Option<String>,
}

/// A response from the `search` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    /// The tracks found.
    pub tracks: Option<Paging<TrackObject>>,
    /// The albums found.
    pub albums: Option<Paging<AlbumObject>>,
    /// The artists found.
    pub artists: Option<Paging<ArtistObject>>,
}

/// Search-related functionality.
impl Client {
    /// The item types every search asks for.
    pub const SEARCH_TYPES: &str = "track,album,artist";

    /// Search the catalog for tracks, albums and artists.
    pub async fn search(&self, token: &str, request: &SearchRequest) -> ClientResult<SearchResponse> {
        let mut parameters = vec![
            ("q", request.query.clone()),
            ("type", Self::SEARCH_TYPES.to_string()),
        ];
        if let Some(limit) = request.limit {
            parameters.push(("limit", limit.to_string()));
        }
        if let Some(market) = &request.market {
            parameters.push(("market", market.clone()));
        }

        self.request(token, "search", &parameters).await
    }
}
