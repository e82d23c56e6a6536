//! The playback and search state store.
//!
//! Every slice of state lives in its own [`watch`] channel, so views can
//! subscribe to exactly what they render. Operations that fetch from the
//! catalog await completion; by default the last response to arrive wins,
//! and with [`StoreOptions::supersede_stale_requests`] a newer request of the
//! same family discards the result of an older one.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    catalog::MusicCatalog,
    tonearm_state::{Album, Artist, SearchResult, Track, dedup_albums_by_name},
};

/// What the current track queue was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlaybackContext {
    #[default]
    None,
    Artist(Artist),
    Album(Album),
}
impl PlaybackContext {
    pub fn artist(&self) -> Option<&Artist> {
        match self {
            PlaybackContext::Artist(artist) => Some(artist),
            _ => None,
        }
    }

    pub fn album(&self) -> Option<&Album> {
        match self {
            PlaybackContext::Album(album) => Some(album),
            _ => None,
        }
    }
}

/// A user-facing problem with the last operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    InvalidTrack,
    InvalidAlbum,
    InvalidArtist,
    EmptyAlbum,
    EmptyArtist,
    NoRecommendations,
}
impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidTrack => write!(f, "Invalid track"),
            StoreError::InvalidAlbum => write!(f, "Invalid album"),
            StoreError::InvalidArtist => write!(f, "Invalid artist"),
            StoreError::EmptyAlbum => write!(f, "No tracks found on this album"),
            StoreError::EmptyArtist => write!(f, "No tracks found for this artist"),
            StoreError::NoRecommendations => write!(f, "No recommendations found"),
        }
    }
}
impl std::error::Error for StoreError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub search_limit: u32,
    pub home_query: String,
    pub home_limit: u32,
    pub supersede_stale_requests: bool,
}
impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            search_limit: 15,
            home_query: "top hits 2024".to_string(),
            home_limit: 50,
            supersede_stale_requests: false,
        }
    }
}

/// A point-in-time copy of every slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub current_track: Option<Track>,
    pub track_queue: Vec<Track>,
    pub context: PlaybackContext,
    pub artist_albums: Vec<Album>,
    pub search_results: SearchResult,
    pub search_term: String,
    pub searching: bool,
    pub loading: bool,
    pub error: Option<StoreError>,
}

struct Slices {
    current_track: watch::Sender<Option<Track>>,
    track_queue: watch::Sender<Vec<Track>>,
    context: watch::Sender<PlaybackContext>,
    artist_albums: watch::Sender<Vec<Album>>,
    search_results: watch::Sender<SearchResult>,
    search_term: watch::Sender<String>,
    searching: watch::Sender<bool>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<StoreError>>,
}
impl Default for Slices {
    fn default() -> Self {
        Self {
            current_track: watch::Sender::new(None),
            track_queue: watch::Sender::new(vec![]),
            context: watch::Sender::new(PlaybackContext::None),
            artist_albums: watch::Sender::new(vec![]),
            search_results: watch::Sender::new(SearchResult::empty()),
            search_term: watch::Sender::new(String::new()),
            searching: watch::Sender::new(false),
            loading: watch::Sender::new(false),
            error: watch::Sender::new(None),
        }
    }
}

/// Families of requests that supersede each other.
#[derive(Debug, Clone, Copy)]
enum Family {
    Search,
    /// Anything that replaces the track queue.
    Queue,
}

#[derive(Default)]
struct InFlight {
    search: Option<CancellationToken>,
    queue: Option<CancellationToken>,
}

/// Shared playback and search state.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct MusicStore {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<dyn MusicCatalog>,
    options: StoreOptions,
    slices: Slices,
    in_flight: Mutex<InFlight>,
}

impl MusicStore {
    pub fn new(catalog: Arc<dyn MusicCatalog>, options: StoreOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                catalog,
                options,
                slices: Slices::default(),
                in_flight: Mutex::default(),
            }),
        }
    }

    fn slices(&self) -> &Slices {
        &self.inner.slices
    }
}

/// Operations.
impl MusicStore {
    /// Make `track` the current track. The queue and context are untouched.
    pub fn select_track(&self, track: &Track) {
        if !track.has_id() {
            tracing::warn!("ignoring selection of a track without an id");
            self.set_error(StoreError::InvalidTrack);
            return;
        }
        self.clear_error();
        tracing::debug!("selecting track {} ({})", track.id, track.name);
        self.slices().current_track.send_replace(Some(track.clone()));
    }

    /// Make `album` the context and replace the queue with its tracks,
    /// starting playback from the first.
    pub async fn select_album(&self, album: &Album) {
        if !album.has_id() {
            tracing::warn!("ignoring selection of an album without an id");
            self.set_error(StoreError::InvalidAlbum);
            return;
        }
        self.slices()
            .context
            .send_replace(PlaybackContext::Album(album.clone()));
        self.clear_error();
        self.slices().loading.send_replace(true);

        let fence = self.supersede(Family::Queue);
        let catalog = self.inner.catalog.clone();
        let Some(tracks) = fenced(fence, catalog.album_tracks(&album.id)).await else {
            tracing::debug!("discarding superseded tracks of album {}", album.id);
            return;
        };

        if tracks.is_empty() {
            tracing::warn!("album {} has no tracks", album.id);
            self.set_error(StoreError::EmptyAlbum);
        } else {
            tracing::debug!("loaded {} tracks of album {}", tracks.len(), album.id);
            self.replace_queue(tracks);
        }
        self.slices().loading.send_replace(false);
    }

    /// Make `artist` the context, replace the queue with their top tracks,
    /// and list their albums. Both fetches run concurrently.
    pub async fn select_artist(&self, artist: &Artist) {
        if !artist.has_id() {
            tracing::warn!("ignoring selection of an artist without an id");
            self.set_error(StoreError::InvalidArtist);
            return;
        }
        self.slices()
            .context
            .send_replace(PlaybackContext::Artist(artist.clone()));
        self.slices().artist_albums.send_replace(vec![]);
        self.clear_error();
        self.slices().loading.send_replace(true);

        let fence = self.supersede(Family::Queue);
        let catalog = self.inner.catalog.clone();

        let top_tracks = async {
            let Some(tracks) = fenced(fence.clone(), catalog.artist_top_tracks(&artist.id)).await
            else {
                tracing::debug!("discarding superseded top tracks of artist {}", artist.id);
                return;
            };
            if tracks.is_empty() {
                tracing::warn!("artist {} has no top tracks", artist.id);
                self.set_error(StoreError::EmptyArtist);
            } else {
                self.replace_queue(tracks);
            }
            self.slices().loading.send_replace(false);
        };

        let albums = async {
            let Some(albums) = fenced(fence.clone(), catalog.artist_albums(&artist.id)).await
            else {
                tracing::debug!("discarding superseded albums of artist {}", artist.id);
                return;
            };
            let albums = dedup_albums_by_name(albums);
            tracing::debug!("artist {} has {} distinct albums", artist.id, albums.len());
            self.slices().artist_albums.send_replace(albums);
        };

        tokio::join!(top_tracks, albums);
    }

    /// Search the catalog, publishing the results. A blank query clears the
    /// results instead. `limit` defaults to [`StoreOptions::search_limit`].
    pub async fn search(&self, query: &str, limit: Option<u32>) {
        let query = query.trim();
        if query.is_empty() {
            if self.inner.options.supersede_stale_requests {
                self.supersede(Family::Search);
                self.slices().searching.send_replace(false);
            }
            self.clear_search_results();
            return;
        }

        self.slices().searching.send_replace(true);
        self.slices().search_term.send_replace(query.to_string());

        let limit = limit.unwrap_or(self.inner.options.search_limit);
        let fence = self.supersede(Family::Search);
        let catalog = self.inner.catalog.clone();
        let Some(results) = fenced(fence, catalog.search(query, limit)).await else {
            tracing::debug!("discarding superseded results for {query:?}");
            return;
        };

        self.slices().search_results.send_replace(results);
        self.slices().searching.send_replace(false);
    }

    /// Fill the queue with recommendations from a home-page search. The
    /// context is cleared; the current track is not changed.
    pub async fn load_home_tracks(&self, query: Option<&str>) {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(self.inner.options.home_query.as_str())
            .to_string();
        self.slices().context.send_replace(PlaybackContext::None);
        self.slices().loading.send_replace(true);

        let fence = self.supersede(Family::Queue);
        let catalog = self.inner.catalog.clone();
        let limit = self.inner.options.home_limit;
        let Some(results) = fenced(fence, catalog.search(&query, limit)).await else {
            tracing::debug!("discarding superseded home tracks for {query:?}");
            return;
        };

        if results.tracks.is_empty() {
            tracing::warn!("no home tracks found for {query:?}");
            self.set_error(StoreError::NoRecommendations);
        } else {
            tracing::info!("loaded {} home tracks", results.tracks.len());
            self.slices().track_queue.send_replace(results.tracks);
        }
        self.slices().loading.send_replace(false);
    }

    /// Advance to the next track in the queue, wrapping around.
    pub fn next_track(&self) {
        self.step(true);
    }

    /// Go back to the previous track in the queue, wrapping around.
    pub fn prev_track(&self) {
        self.step(false);
    }

    fn step(&self, forward: bool) {
        let Some(current) = self.current_track() else {
            return;
        };
        let target = {
            let queue = self.slices().track_queue.borrow();
            let Some(index) = queue.iter().position(|t| t.id == current.id) else {
                return;
            };
            let len = queue.len();
            let target = if forward {
                (index + 1) % len
            } else {
                (index + len - 1) % len
            };
            queue[target].clone()
        };
        self.select_track(&target);
    }

    /// Clear the current track, queue, context, artist albums and error.
    pub fn clear_selection(&self) {
        let slices = self.slices();
        slices.current_track.send_replace(None);
        slices.track_queue.send_replace(vec![]);
        slices.context.send_replace(PlaybackContext::None);
        slices.artist_albums.send_replace(vec![]);
        slices.error.send_replace(None);
    }

    pub fn clear_search_results(&self) {
        self.slices()
            .search_results
            .send_replace(SearchResult::empty());
        self.slices().search_term.send_replace(String::new());
    }

    pub fn set_search_results(&self, results: SearchResult) {
        self.slices().search_results.send_replace(results);
    }

    pub fn clear_error(&self) {
        self.slices().error.send_replace(None);
    }

    fn set_error(&self, error: StoreError) {
        self.slices().error.send_replace(Some(error));
    }

    fn replace_queue(&self, tracks: Vec<Track>) {
        let first = tracks.first().cloned();
        self.slices().track_queue.send_replace(tracks);
        self.slices().current_track.send_replace(first);
    }

    /// Begin a request of `family`, cancelling the previous one. Returns
    /// `None` when stale requests are not superseded.
    fn supersede(&self, family: Family) -> Option<CancellationToken> {
        if !self.inner.options.supersede_stale_requests {
            return None;
        }
        let token = CancellationToken::new();
        let mut in_flight = self.inner.in_flight.lock().unwrap();
        let slot = match family {
            Family::Search => &mut in_flight.search,
            Family::Queue => &mut in_flight.queue,
        };
        if let Some(previous) = slot.replace(token.clone()) {
            previous.cancel();
        }
        Some(token)
    }
}

/// Await `fetch`, unless `fence` is cancelled first.
async fn fenced<T>(fence: Option<CancellationToken>, fetch: impl Future<Output = T>) -> Option<T> {
    match fence {
        None => Some(fetch.await),
        Some(fence) => tokio::select! {
            _ = fence.cancelled() => None,
            value = fetch => Some(value),
        },
    }
}

/// Reads.
impl MusicStore {
    pub fn current_track(&self) -> Option<Track> {
        self.slices().current_track.borrow().clone()
    }

    pub fn track_queue(&self) -> Vec<Track> {
        self.slices().track_queue.borrow().clone()
    }

    pub fn has_track_queue(&self) -> bool {
        !self.slices().track_queue.borrow().is_empty()
    }

    pub fn context(&self) -> PlaybackContext {
        self.slices().context.borrow().clone()
    }

    pub fn selected_artist(&self) -> Option<Artist> {
        self.slices().context.borrow().artist().cloned()
    }

    pub fn selected_album(&self) -> Option<Album> {
        self.slices().context.borrow().album().cloned()
    }

    pub fn artist_albums(&self) -> Vec<Album> {
        self.slices().artist_albums.borrow().clone()
    }

    pub fn search_results(&self) -> SearchResult {
        self.slices().search_results.borrow().clone()
    }

    pub fn has_search_results(&self) -> bool {
        self.slices().search_results.borrow().has_results()
    }

    pub fn search_term(&self) -> String {
        self.slices().search_term.borrow().clone()
    }

    pub fn is_searching(&self) -> bool {
        *self.slices().searching.borrow()
    }

    pub fn is_loading(&self) -> bool {
        *self.slices().loading.borrow()
    }

    pub fn error(&self) -> Option<StoreError> {
        self.slices().error.borrow().clone()
    }

    pub fn has_error(&self) -> bool {
        self.slices().error.borrow().is_some()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            current_track: self.current_track(),
            track_queue: self.track_queue(),
            context: self.context(),
            artist_albums: self.artist_albums(),
            search_results: self.search_results(),
            search_term: self.search_term(),
            searching: self.is_searching(),
            loading: self.is_loading(),
            error: self.error(),
        }
    }
}

/// Subscriptions. Each receiver starts with the current value.
impl MusicStore {
    pub fn subscribe_current_track(&self) -> watch::Receiver<Option<Track>> {
        self.slices().current_track.subscribe()
    }

    pub fn subscribe_track_queue(&self) -> watch::Receiver<Vec<Track>> {
        self.slices().track_queue.subscribe()
    }

    pub fn subscribe_context(&self) -> watch::Receiver<PlaybackContext> {
        self.slices().context.subscribe()
    }

    pub fn subscribe_artist_albums(&self) -> watch::Receiver<Vec<Album>> {
        self.slices().artist_albums.subscribe()
    }

    pub fn subscribe_search_results(&self) -> watch::Receiver<SearchResult> {
        self.slices().search_results.subscribe()
    }

    pub fn subscribe_search_term(&self) -> watch::Receiver<String> {
        self.slices().search_term.subscribe()
    }

    pub fn subscribe_searching(&self) -> watch::Receiver<bool> {
        self.slices().searching.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.slices().loading.subscribe()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<StoreError>> {
        self.slices().error.subscribe()
    }
}
