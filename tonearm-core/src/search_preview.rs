//! Search-as-you-type: a small, debounced preview of search results.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::Instant,
};

use crate::{catalog::MusicCatalog, tonearm_state::SearchResult};

pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const PREVIEW_LIMIT: u32 = 3;
pub const NO_RESULTS_MESSAGE: &str = "No results found";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    /// The term the current results belong to.
    pub term: String,
    pub results: SearchResult,
    pub searching: bool,
    pub visible: bool,
    pub message: Option<String>,
}

/// Debounces typed input into catalog searches.
///
/// Only the latest term is ever searched; a newer term abandons an older
/// search still in flight. The worker task is aborted on drop.
pub struct SearchPreview {
    input: mpsc::UnboundedSender<String>,
    state: Arc<watch::Sender<PreviewState>>,
    worker: JoinHandle<()>,
}

impl SearchPreview {
    pub fn new(catalog: Arc<dyn MusicCatalog>) -> Self {
        let (input, inputs) = mpsc::unbounded_channel();
        let state = Arc::new(watch::Sender::new(PreviewState::default()));
        let worker = tokio::spawn(run(catalog, inputs, state.clone()));
        Self {
            input,
            state,
            worker,
        }
    }

    /// Feed the current contents of the search box.
    pub fn input(&self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            self.state.send_replace(PreviewState::default());
        }
        if self.input.send(term.to_string()).is_err() {
            tracing::warn!("search preview worker is gone; dropping input");
        }
    }

    pub fn state(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.state.subscribe()
    }
}

impl Drop for SearchPreview {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct InFlight {
    term: String,
    search: Pin<Box<dyn Future<Output = SearchResult> + Send>>,
}

async fn run(
    catalog: Arc<dyn MusicCatalog>,
    mut inputs: mpsc::UnboundedReceiver<String>,
    state: Arc<watch::Sender<PreviewState>>,
) {
    let debounce = tokio::time::sleep(DEBOUNCE);
    tokio::pin!(debounce);

    let mut pending: Option<String> = None;
    let mut in_flight: Option<InFlight> = None;
    let mut last_dispatched: Option<String> = None;

    loop {
        tokio::select! {
            biased;

            input = inputs.recv() => {
                let Some(term) = input else {
                    break;
                };
                if term.is_empty() {
                    pending = None;
                    in_flight = None;
                    last_dispatched = None;
                    state.send_replace(PreviewState::default());
                } else {
                    pending = Some(term);
                    debounce.as_mut().reset(Instant::now() + DEBOUNCE);
                }
            }

            () = &mut debounce, if pending.is_some() => {
                let Some(term) = pending.take() else {
                    continue;
                };
                if last_dispatched.as_deref() == Some(term.as_str()) {
                    continue;
                }

                tracing::debug!("previewing results for {term:?}");
                state.send_modify(|state| {
                    state.searching = true;
                    state.visible = true;
                    state.message = None;
                });
                let catalog = catalog.clone();
                let query = term.clone();
                last_dispatched = Some(term.clone());
                // Replacing the slot drops any older search still running.
                in_flight = Some(InFlight {
                    term,
                    search: Box::pin(async move { catalog.search(&query, PREVIEW_LIMIT).await }),
                });
            }

            (term, results) = settle(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                let message = results.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());
                state.send_replace(PreviewState {
                    term,
                    results,
                    searching: false,
                    visible: true,
                    message,
                });
            }
        }
    }
}

async fn settle(in_flight: &mut Option<InFlight>) -> (String, SearchResult) {
    match in_flight {
        Some(in_flight) => {
            let results = in_flight.search.as_mut().await;
            (in_flight.term.clone(), results)
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::tonearm_state::{Album, AlbumId, Artist, ArtistId, Track, TrackId};

    #[derive(Default)]
    struct SearchOnlyCatalog {
        results: HashMap<String, SearchResult>,
        gates: HashMap<String, Arc<Notify>>,
        searches: Mutex<Vec<(String, u32)>>,
    }
    impl SearchOnlyCatalog {
        fn searches(&self) -> Vec<(String, u32)> {
            self.searches.lock().unwrap().clone()
        }
    }
    #[async_trait]
    impl MusicCatalog for SearchOnlyCatalog {
        async fn search(&self, query: &str, limit: u32) -> SearchResult {
            self.searches
                .lock()
                .unwrap()
                .push((query.to_string(), limit));
            if let Some(gate) = self.gates.get(query) {
                gate.notified().await;
            }
            self.results.get(query).cloned().unwrap_or_default()
        }
        async fn track(&self, _id: &TrackId) -> Option<Track> {
            None
        }
        async fn album(&self, _id: &AlbumId) -> Option<Album> {
            None
        }
        async fn album_tracks(&self, _id: &AlbumId) -> Vec<Track> {
            vec![]
        }
        async fn artist(&self, _id: &ArtistId) -> Option<Artist> {
            None
        }
        async fn artist_top_tracks(&self, _id: &ArtistId) -> Vec<Track> {
            vec![]
        }
        async fn artist_albums(&self, _id: &ArtistId) -> Vec<Album> {
            vec![]
        }
    }

    fn result(track_id: &str) -> SearchResult {
        SearchResult {
            tracks: vec![Track {
                id: TrackId(track_id.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn catalog() -> SearchOnlyCatalog {
        SearchOnlyCatalog {
            results: HashMap::from([
                ("abc".to_string(), result("t-abc")),
                ("abcd".to_string(), result("t-abcd")),
                ("slow".to_string(), result("t-slow")),
                ("fast".to_string(), result("t-fast")),
            ]),
            ..Default::default()
        }
    }

    async fn wait(millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_searches_once() {
        let catalog = Arc::new(catalog());
        let preview = SearchPreview::new(catalog.clone());

        for term in ["a", "ab", "abc"] {
            preview.input(term);
            wait(100).await;
        }
        assert!(catalog.searches().is_empty());

        wait(300).await;
        assert_eq!(catalog.searches(), [("abc".to_string(), PREVIEW_LIMIT)]);
        let state = preview.state();
        assert_eq!(state.term, "abc");
        assert_eq!(state.results, result("t-abc"));
        assert!(state.visible);
        assert!(!state.searching);
        assert_eq!(state.message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_term_is_not_searched_again() {
        let catalog = Arc::new(catalog());
        let preview = SearchPreview::new(catalog.clone());

        preview.input("abc");
        wait(400).await;
        preview.input(" abc ");
        wait(400).await;
        assert_eq!(catalog.searches().len(), 1);

        preview.input("abcd");
        wait(400).await;
        assert_eq!(catalog.searches().len(), 2);
        assert_eq!(preview.state().results, result("t-abcd"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_resets_and_abandons_pending() {
        let catalog = Arc::new(catalog());
        let preview = SearchPreview::new(catalog.clone());
        preview.input("abc");
        wait(400).await;

        preview.input("abcd");
        preview.input("   ");
        assert_eq!(preview.state(), PreviewState::default());

        wait(400).await;
        assert_eq!(catalog.searches().len(), 1);
        assert_eq!(preview.state(), PreviewState::default());

        // Clearing forgets the last term, so it is searched again.
        preview.input("abc");
        wait(400).await;
        assert_eq!(catalog.searches().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_results_show_message() {
        let preview = SearchPreview::new(Arc::new(catalog()));

        preview.input("nothing");
        wait(400).await;

        let state = preview.state();
        assert!(state.visible);
        assert!(state.results.is_empty());
        assert_eq!(state.message.as_deref(), Some(NO_RESULTS_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_term_abandons_in_flight_search() {
        let gate = Arc::new(Notify::new());
        let catalog = Arc::new(SearchOnlyCatalog {
            gates: HashMap::from([("slow".to_string(), gate.clone())]),
            ..catalog()
        });
        let preview = SearchPreview::new(catalog.clone());

        preview.input("slow");
        wait(350).await;
        assert!(preview.state().searching);

        preview.input("fast");
        wait(350).await;
        assert_eq!(preview.state().term, "fast");
        assert_eq!(preview.state().results, result("t-fast"));

        gate.notify_one();
        wait(10).await;
        assert_eq!(preview.state().results, result("t-fast"));
        assert_eq!(
            catalog.searches(),
            [
                ("slow".to_string(), PREVIEW_LIMIT),
                ("fast".to_string(), PREVIEW_LIMIT)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_returning_to_earlier_term_abandons_in_flight_search() {
        let gate = Arc::new(Notify::new());
        let catalog = Arc::new(SearchOnlyCatalog {
            gates: HashMap::from([("slow".to_string(), gate.clone())]),
            ..catalog()
        });
        let preview = SearchPreview::new(catalog.clone());

        preview.input("abc");
        wait(400).await;
        preview.input("slow");
        wait(350).await;
        assert!(preview.state().searching);

        preview.input("abc");
        wait(350).await;
        gate.notify_one();
        wait(10).await;

        let state = preview.state();
        assert_eq!(state.term, "abc");
        assert_eq!(state.results, result("t-abc"));
        assert!(!state.searching);
        assert_eq!(
            catalog.searches(),
            [
                ("abc".to_string(), PREVIEW_LIMIT),
                ("slow".to_string(), PREVIEW_LIMIT),
                ("abc".to_string(), PREVIEW_LIMIT)
            ]
        );
    }
}
