//! The catalog service: typed, authenticated reads that never fail outward.
//!
//! Every read waits for a credential, maps the raw payload into domain
//! records, and on failure logs a classified [`CatalogError`], broadcasts it
//! as a [`CatalogNotice`], and returns an empty result.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    auth::CredentialManager,
    source::CatalogSource,
    tc,
    tonearm_state::{Album, AlbumId, Artist, ArtistId, SearchResult, Track, TrackId},
};

/// The catalog operations the store depends on.
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    /// Search tracks, albums and artists. A blank query yields an empty result.
    async fn search(&self, query: &str, limit: u32) -> SearchResult;
    async fn track(&self, id: &TrackId) -> Option<Track>;
    async fn album(&self, id: &AlbumId) -> Option<Album>;
    async fn album_tracks(&self, id: &AlbumId) -> Vec<Track>;
    async fn artist(&self, id: &ArtistId) -> Option<Artist>;
    async fn artist_top_tracks(&self, id: &ArtistId) -> Vec<Track>;
    async fn artist_albums(&self, id: &ArtistId) -> Vec<Album>;
}

/// A classified catalog failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Connectivity,
    Unauthorized,
    NotFound,
    RateLimited,
    Other(String),
}
impl CatalogError {
    /// Classify a client failure that happened while performing `operation`.
    pub fn classify(error: &tc::ClientError, operation: &str) -> Self {
        if let tc::ClientError::ConnectionError(_) = error {
            return CatalogError::Connectivity;
        }
        match error.status() {
            Some(401) => CatalogError::Unauthorized,
            Some(404) => CatalogError::NotFound,
            Some(429) => CatalogError::RateLimited,
            _ => CatalogError::Other(
                error
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Error while {operation}")),
            ),
        }
    }
}
impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Connectivity => {
                write!(f, "Connection error; check your internet connection")
            }
            CatalogError::Unauthorized => write!(f, "Access token expired; refreshing"),
            CatalogError::NotFound => write!(f, "Resource not found"),
            CatalogError::RateLimited => write!(f, "Too many requests; try again later"),
            CatalogError::Other(message) => write!(f, "{message}"),
        }
    }
}
impl std::error::Error for CatalogError {}

/// A failure broadcast to anyone listening for catalog problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogNotice {
    pub operation: &'static str,
    pub error: CatalogError,
}
impl std::fmt::Display for CatalogNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.error, self.operation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub search_market: String,
    pub top_tracks_market: String,
    pub artist_album_groups: String,
    pub artist_album_limit: u32,
}
impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            search_market: "MX".to_string(),
            top_tracks_market: "US".to_string(),
            artist_album_groups: "album,single".to_string(),
            artist_album_limit: 10,
        }
    }
}

pub struct Catalog {
    source: Arc<dyn CatalogSource>,
    credentials: CredentialManager,
    settings: CatalogSettings,
    notices: broadcast::Sender<CatalogNotice>,
}
impl Catalog {
    const NOTICE_CAPACITY: usize = 32;

    pub fn new(
        source: Arc<dyn CatalogSource>,
        credentials: CredentialManager,
        settings: CatalogSettings,
    ) -> Self {
        let (notices, _) = broadcast::channel(Self::NOTICE_CAPACITY);
        Self {
            source,
            credentials,
            settings,
            notices,
        }
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<CatalogNotice> {
        self.notices.subscribe()
    }

    async fn token(&self) -> Option<String> {
        self.credentials.wait_for_token().await
    }

    /// Unwrap `result`, reporting a failure and yielding `None` in its place.
    fn settle<T>(&self, operation: &'static str, result: tc::ClientResult<T>) -> Option<T> {
        result.map_err(|e| self.report(operation, e)).ok()
    }

    fn report(&self, operation: &'static str, error: tc::ClientError) {
        let classified = CatalogError::classify(&error, operation);
        tracing::warn!("catalog failure while {operation}: {classified} ({error})");

        if classified == CatalogError::Unauthorized {
            let credentials = self.credentials.clone();
            tokio::spawn(async move {
                if let Err(e) = credentials.force_refresh().await {
                    tracing::error!("credential refresh after rejected token failed: {e}");
                }
            });
        }

        // Nobody listening is fine.
        let _ = self.notices.send(CatalogNotice {
            operation,
            error: classified,
        });
    }
}

#[async_trait]
impl MusicCatalog for Catalog {
    async fn search(&self, query: &str, limit: u32) -> SearchResult {
        let query = query.trim();
        if query.is_empty() {
            return SearchResult::empty();
        }
        let request = tc::SearchRequest {
            query: query.to_string(),
            limit: Some(limit),
            market: Some(self.settings.search_market.clone()),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let Some(token) = self.token().await else {
                return SearchResult::empty();
            };
            match self.source.search(&token, &request).await {
                Ok(response) => {
                    let result = SearchResult::from(response);
                    tracing::debug!(
                        "search for {query:?} found {} tracks, {} albums, {} artists",
                        result.tracks.len(),
                        result.albums.len(),
                        result.artists.len()
                    );
                    return result;
                }
                Err(e) if attempt == 1 => {
                    tracing::debug!("search for {query:?} failed, retrying once: {e}");
                }
                Err(e) => {
                    self.report("searching", e);
                    return SearchResult::empty();
                }
            }
        }
    }

    async fn track(&self, id: &TrackId) -> Option<Track> {
        if id.0.is_empty() {
            return None;
        }
        let token = self.token().await?;
        self.settle("fetching track", self.source.track(&token, &id.0).await)
            .map(Track::from)
    }

    async fn album(&self, id: &AlbumId) -> Option<Album> {
        if id.0.is_empty() {
            return None;
        }
        let token = self.token().await?;
        self.settle("fetching album", self.source.album(&token, &id.0).await)
            .map(Album::from)
    }

    async fn album_tracks(&self, id: &AlbumId) -> Vec<Track> {
        if id.0.is_empty() {
            return vec![];
        }
        let Some(token) = self.token().await else {
            return vec![];
        };
        self.settle(
            "fetching album tracks",
            self.source.album(&token, &id.0).await,
        )
        .map(Album::tracks_from_payload)
        .unwrap_or_default()
    }

    async fn artist(&self, id: &ArtistId) -> Option<Artist> {
        if id.0.is_empty() {
            return None;
        }
        let token = self.token().await?;
        self.settle("fetching artist", self.source.artist(&token, &id.0).await)
            .map(Artist::from)
    }

    async fn artist_top_tracks(&self, id: &ArtistId) -> Vec<Track> {
        if id.0.is_empty() {
            return vec![];
        }
        let Some(token) = self.token().await else {
            return vec![];
        };
        let result = self
            .source
            .artist_top_tracks(&token, &id.0, &self.settings.top_tracks_market)
            .await;
        self.settle("fetching artist top tracks", result)
            .map(|tracks| tracks.into_iter().map(Track::from).collect())
            .unwrap_or_default()
    }

    async fn artist_albums(&self, id: &ArtistId) -> Vec<Album> {
        if id.0.is_empty() {
            return vec![];
        }
        let Some(token) = self.token().await else {
            return vec![];
        };
        let request = tc::ArtistAlbumsRequest {
            include_groups: Some(self.settings.artist_album_groups.clone()),
            limit: Some(self.settings.artist_album_limit),
            market: Some(self.settings.search_market.clone()),
        };
        let result = self.source.artist_albums(&token, &id.0, &request).await;
        self.settle("fetching artist albums", result)
            .map(|albums| albums.into_iter().map(Album::from).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::source::TokenSource;

    #[derive(Default)]
    struct CountingTokens {
        calls: AtomicUsize,
    }
    #[async_trait]
    impl TokenSource for CountingTokens {
        async fn request_token(&self) -> tc::ClientResult<tc::TokenResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(tc::TokenResponse {
                access_token: format!("tok-{call}"),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
            })
        }
    }

    /// Answers every request with a canned payload, unless a scripted failure
    /// is queued, and records what was asked for.
    #[derive(Default)]
    struct FakeSource {
        failures: Mutex<VecDeque<tc::ClientError>>,
        requests: Mutex<Vec<String>>,
    }
    impl FakeSource {
        fn failing(failures: Vec<tc::ClientError>) -> Arc<Self> {
            Arc::new(Self {
                failures: Mutex::new(failures.into()),
                requests: Mutex::default(),
            })
        }

        fn record(&self, token: &str, request: String) -> tc::ClientResult<()> {
            self.requests
                .lock()
                .unwrap()
                .push(format!("{token} {request}"));
            match self.failures.lock().unwrap().pop_front() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }
    #[async_trait]
    impl CatalogSource for FakeSource {
        async fn search(
            &self,
            token: &str,
            request: &tc::SearchRequest,
        ) -> tc::ClientResult<tc::SearchResponse> {
            self.record(
                token,
                format!(
                    "search {} limit={:?} market={:?}",
                    request.query, request.limit, request.market
                ),
            )?;
            Ok(tc::SearchResponse {
                tracks: Some(paging(vec![track_object("t1", "Song")])),
                ..Default::default()
            })
        }

        async fn track(&self, token: &str, id: &str) -> tc::ClientResult<tc::TrackObject> {
            self.record(token, format!("track {id}"))?;
            Ok(track_object(id, "Song"))
        }

        async fn album(&self, token: &str, id: &str) -> tc::ClientResult<tc::AlbumObject> {
            self.record(token, format!("album {id}"))?;
            Ok(tc::AlbumObject {
                id: Some(id.to_string()),
                name: Some("Record".to_string()),
                tracks: Some(paging(vec![
                    track_object("t1", "One"),
                    track_object("t2", "Two"),
                ])),
                ..Default::default()
            })
        }

        async fn artist(&self, token: &str, id: &str) -> tc::ClientResult<tc::ArtistObject> {
            self.record(token, format!("artist {id}"))?;
            Ok(tc::ArtistObject {
                id: Some(id.to_string()),
                name: Some("Band".to_string()),
                ..Default::default()
            })
        }

        async fn artist_top_tracks(
            &self,
            token: &str,
            id: &str,
            market: &str,
        ) -> tc::ClientResult<Vec<tc::TrackObject>> {
            self.record(token, format!("top {id} market={market}"))?;
            Ok(vec![track_object("t9", "Hit")])
        }

        async fn artist_albums(
            &self,
            token: &str,
            id: &str,
            request: &tc::ArtistAlbumsRequest,
        ) -> tc::ClientResult<Vec<tc::AlbumObject>> {
            self.record(
                token,
                format!(
                    "albums {id} groups={:?} limit={:?} market={:?}",
                    request.include_groups, request.limit, request.market
                ),
            )?;
            Ok(vec![tc::AlbumObject {
                id: Some("al1".to_string()),
                name: Some("Record".to_string()),
                ..Default::default()
            }])
        }
    }

    fn paging<T>(items: Vec<T>) -> tc::Paging<T> {
        tc::Paging {
            items: Some(items),
            ..Default::default()
        }
    }

    fn track_object(id: &str, name: &str) -> tc::TrackObject {
        tc::TrackObject {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            duration_ms: Some(1000),
            ..Default::default()
        }
    }

    fn status(status: u16, message: Option<&str>) -> tc::ClientError {
        tc::ClientError::StatusError {
            status,
            message: message.map(str::to_string),
        }
    }

    async fn authenticated(source: Arc<FakeSource>) -> (Catalog, Arc<CountingTokens>) {
        let tokens = Arc::new(CountingTokens::default());
        let credentials = CredentialManager::new(tokens.clone());
        credentials.acquire().await.unwrap();
        (
            Catalog::new(source, credentials, CatalogSettings::default()),
            tokens,
        )
    }

    #[tokio::test]
    async fn test_search_trims_query_and_applies_market() {
        let source = Arc::new(FakeSource::default());
        let (catalog, _) = authenticated(source.clone()).await;

        let result = catalog.search("  daft punk ", 15).await;

        assert!(result.has_results());
        assert_eq!(result.tracks[0].name, "Song");
        assert_eq!(
            source.requests(),
            vec![r#"tok-1 search daft punk limit=Some(15) market=Some("MX")"#]
        );
    }

    #[tokio::test]
    async fn test_blank_inputs_make_no_request() {
        // Never authenticated; anything that waited for a token would hang.
        let source = Arc::new(FakeSource::default());
        let credentials = CredentialManager::new(Arc::new(CountingTokens::default()));
        let catalog = Catalog::new(source.clone(), credentials, CatalogSettings::default());

        assert!(catalog.search("   ", 5).await.is_empty());
        assert_eq!(catalog.track(&TrackId::default()).await, None);
        assert_eq!(catalog.album(&AlbumId::default()).await, None);
        assert!(catalog.album_tracks(&AlbumId::default()).await.is_empty());
        assert_eq!(catalog.artist(&ArtistId::default()).await, None);
        assert!(
            catalog
                .artist_top_tracks(&ArtistId::default())
                .await
                .is_empty()
        );
        assert!(catalog.artist_albums(&ArtistId::default()).await.is_empty());
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_retries_once() {
        let source = FakeSource::failing(vec![status(503, None)]);
        let (catalog, _) = authenticated(source.clone()).await;
        let mut notices = catalog.subscribe_notices();

        let result = catalog.search("jazz", 3).await;

        assert_eq!(result.tracks.len(), 1);
        assert_eq!(source.requests().len(), 2);
        assert_eq!(notices.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_search_gives_up_after_retry() {
        let source = FakeSource::failing(vec![
            tc::ClientError::ConnectionError("offline".to_string()),
            tc::ClientError::ConnectionError("offline".to_string()),
        ]);
        let (catalog, _) = authenticated(source.clone()).await;
        let mut notices = catalog.subscribe_notices();

        assert!(catalog.search("jazz", 3).await.is_empty());
        assert_eq!(source.requests().len(), 2);
        assert_eq!(
            notices.try_recv(),
            Ok(CatalogNotice {
                operation: "searching",
                error: CatalogError::Connectivity,
            })
        );
    }

    #[tokio::test]
    async fn test_failures_are_classified_and_broadcast() {
        let source = FakeSource::failing(vec![
            status(404, None),
            status(429, None),
            status(500, Some("boom")),
            status(500, None),
        ]);
        let (catalog, _) = authenticated(source).await;
        let mut notices = catalog.subscribe_notices();

        assert_eq!(catalog.album(&AlbumId("al1".to_string())).await, None);
        assert_eq!(catalog.track(&TrackId("t1".to_string())).await, None);
        assert_eq!(catalog.artist(&ArtistId("ar1".to_string())).await, None);
        assert!(
            catalog
                .artist_albums(&ArtistId("ar1".to_string()))
                .await
                .is_empty()
        );

        let errors: Vec<_> = std::iter::from_fn(|| notices.try_recv().ok())
            .map(|notice| notice.error)
            .collect();
        assert_eq!(
            errors,
            vec![
                CatalogError::NotFound,
                CatalogError::RateLimited,
                CatalogError::Other("boom".to_string()),
                CatalogError::Other("Error while fetching artist albums".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_forces_refresh() {
        let source = FakeSource::failing(vec![status(401, None)]);
        let (catalog, tokens) = authenticated(source).await;
        let mut notices = catalog.subscribe_notices();

        assert!(
            catalog
                .album_tracks(&AlbumId("al1".to_string()))
                .await
                .is_empty()
        );
        assert_eq!(notices.try_recv().unwrap().error, CatalogError::Unauthorized);

        for _ in 0..10 {
            if tokens.calls.load(Ordering::SeqCst) == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(
            catalog.credentials().current_token().as_deref(),
            Some("tok-2")
        );
    }

    #[tokio::test]
    async fn test_requests_wait_for_first_token() {
        let source = Arc::new(FakeSource::default());
        let credentials = CredentialManager::new(Arc::new(CountingTokens::default()));
        let catalog = Arc::new(Catalog::new(
            source.clone(),
            credentials.clone(),
            CatalogSettings::default(),
        ));

        let pending = tokio::spawn({
            let catalog = catalog.clone();
            async move { catalog.track(&TrackId("t1".to_string())).await }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());
        assert!(source.requests().is_empty());

        credentials.acquire().await.unwrap();
        let track = pending.await.unwrap().unwrap();
        assert_eq!(track.id.0, "t1");
        assert_eq!(source.requests(), vec!["tok-1 track t1"]);
    }

    #[tokio::test]
    async fn test_album_tracks_carry_album_name() {
        let (catalog, _) = authenticated(Arc::new(FakeSource::default())).await;

        let tracks = catalog.album_tracks(&AlbumId("al1".to_string())).await;

        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().all(|t| t.album_name == "Record"));
        assert_eq!(tracks[1].name, "Two");
    }

    #[tokio::test]
    async fn test_artist_requests_use_configured_markets() {
        let source = Arc::new(FakeSource::default());
        let (catalog, _) = authenticated(source.clone()).await;
        let id = ArtistId("ar1".to_string());

        assert_eq!(catalog.artist_top_tracks(&id).await[0].name, "Hit");
        assert_eq!(catalog.artist_albums(&id).await[0].name, "Record");
        assert_eq!(
            source.requests(),
            vec![
                "tok-1 top ar1 market=US".to_string(),
                r#"tok-1 albums ar1 groups=Some("album,single") limit=Some(10) market=Some("MX")"#
                    .to_string(),
            ]
        );
    }
}
