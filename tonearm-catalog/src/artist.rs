use serde::{Deserialize, Serialize};

use crate::{Client, ClientResult, Image};

/// An artist as returned by the catalog. Simplified artist objects (as
/// embedded in tracks and albums) only carry `id` and `name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistObject {
    /// The artist ID.
    pub id: Option<String>,
    /// The artist name.
    pub name: Option<String>,
    /// Images of the artist, widest first.
    pub images: Option<Vec<Image>>,
    /// Genres the artist is associated with.
    pub genres: Option<Vec<String>>,
    /// Popularity between 0 and 100.
    pub popularity: Option<u32>,
}

/// Parameters for the artist-albums endpoint.
#[derive(Debug, Clone, Default)]
pub struct ArtistAlbumsRequest {
    /// Comma-separated album groups to include, e.g. `album,single`.
    pub include_groups: Option<String>,
    /// The maximum number of albums to return.
    pub limit: Option<u32>,
    /// The market to restrict results to.
    pub market: Option<String>,
}

/// Artist-related endpoints.
impl Client {
    /// Get a single artist.
    pub async fn get_artist(&self, token: &str, id: &str) -> ClientResult<ArtistObject> {
        self.request(token, &format!("artists/{id}"), &[]).await
    }

    /// Get an artist's top tracks in a market.
    pub async fn get_artist_top_tracks(
        &self,
        token: &str,
        id: &str,
        market: &str,
    ) -> ClientResult<Vec<crate::TrackObject>> {
        #[derive(Deserialize)]
        struct TopTracksResponse {
            #[serde(default)]
            tracks: Option<Vec<crate::TrackObject>>,
        }

        Ok(self
            .request::<TopTracksResponse>(
                token,
                &format!("artists/{id}/top-tracks"),
                &[("market", market.to_string())],
            )
            .await?
            .tracks
            .unwrap_or_default())
    }

    /// Get an artist's albums.
    pub async fn get_artist_albums(
        &self,
        token: &str,
        id: &str,
        request: &ArtistAlbumsRequest,
    ) -> ClientResult<Vec<crate::AlbumObject>> {
        let mut parameters = vec![];
        if let Some(include_groups) = &request.include_groups {
            parameters.push(("include_groups", include_groups.clone()));
        }
        if let Some(limit) = request.limit {
            parameters.push(("limit", limit.to_string()));
        }
        if let Some(market) = &request.market {
            parameters.push(("market", market.clone()));
        }

        Ok(self
            .request::<crate::Paging<crate::AlbumObject>>(
                token,
                &format!("artists/{id}/albums"),
                &parameters,
            )
            .await?
            .into_items())
    }
}
