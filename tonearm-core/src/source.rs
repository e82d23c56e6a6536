//! The seams between the core and the catalog HTTP client.
//!
//! The credential manager and catalog service depend on these traits rather
//! than on [`tc::Client`] directly, so they can be driven by fakes.

use async_trait::async_trait;

use crate::tc;

/// Something that can mint bearer tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Request a fresh token using the client-credentials grant.
    async fn request_token(&self) -> tc::ClientResult<tc::TokenResponse>;
}

/// Raw, authenticated reads against the catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn search(
        &self,
        token: &str,
        request: &tc::SearchRequest,
    ) -> tc::ClientResult<tc::SearchResponse>;

    async fn track(&self, token: &str, id: &str) -> tc::ClientResult<tc::TrackObject>;

    /// Includes the first page of the album's tracks.
    async fn album(&self, token: &str, id: &str) -> tc::ClientResult<tc::AlbumObject>;

    async fn artist(&self, token: &str, id: &str) -> tc::ClientResult<tc::ArtistObject>;

    async fn artist_top_tracks(
        &self,
        token: &str,
        id: &str,
        market: &str,
    ) -> tc::ClientResult<Vec<tc::TrackObject>>;

    async fn artist_albums(
        &self,
        token: &str,
        id: &str,
        request: &tc::ArtistAlbumsRequest,
    ) -> tc::ClientResult<Vec<tc::AlbumObject>>;
}

#[async_trait]
impl TokenSource for tc::Client {
    async fn request_token(&self) -> tc::ClientResult<tc::TokenResponse> {
        tc::Client::request_token(self).await
    }
}

#[async_trait]
impl CatalogSource for tc::Client {
    async fn search(
        &self,
        token: &str,
        request: &tc::SearchRequest,
    ) -> tc::ClientResult<tc::SearchResponse> {
        tc::Client::search(self, token, request).await
    }

    async fn track(&self, token: &str, id: &str) -> tc::ClientResult<tc::TrackObject> {
        self.get_track(token, id).await
    }

    async fn album(&self, token: &str, id: &str) -> tc::ClientResult<tc::AlbumObject> {
        self.get_album(token, id).await
    }

    async fn artist(&self, token: &str, id: &str) -> tc::ClientResult<tc::ArtistObject> {
        self.get_artist(token, id).await
    }

    async fn artist_top_tracks(
        &self,
        token: &str,
        id: &str,
        market: &str,
    ) -> tc::ClientResult<Vec<tc::TrackObject>> {
        self.get_artist_top_tracks(token, id, market).await
    }

    async fn artist_albums(
        &self,
        token: &str,
        id: &str,
        request: &tc::ArtistAlbumsRequest,
    ) -> tc::ClientResult<Vec<tc::AlbumObject>> {
        self.get_artist_albums(token, id, request).await
    }
}
