//! A simulated playback clock for the current track.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};

use crate::{store::MusicStore, tonearm_state::Track};

pub const TICK: Duration = Duration::from_millis(100);
const TICK_MS: u64 = TICK.as_millis() as u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub playing: bool,
}

/// Advances a position through the current track while "playing".
///
/// Owns at most one ticking task and one store follower; both are aborted
/// when this is dropped.
pub struct PlaybackProgress {
    clock: Arc<Clock>,
    follower: Mutex<Option<JoinHandle<()>>>,
}

struct Clock {
    state: watch::Sender<ProgressState>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}
impl Clock {
    fn load(&self, duration_ms: u64) {
        self.stop();
        self.state.send_replace(ProgressState {
            position_ms: 0,
            duration_ms,
            playing: false,
        });
    }

    fn stop(&self) {
        if let Some(ticker) = self.ticker.lock().unwrap().take() {
            ticker.abort();
        }
        self.state.send_if_modified(|state| {
            let was_playing = state.playing;
            state.playing = false;
            was_playing
        });
    }

    fn start(self: &Arc<Self>) {
        let mut ticker = self.ticker.lock().unwrap();
        if let Some(previous) = ticker.take() {
            previous.abort();
        }
        self.state.send_modify(|state| state.playing = true);

        let clock = self.clone();
        *ticker = Some(tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                let mut finished = false;
                clock.state.send_modify(|state| {
                    if state.position_ms < state.duration_ms {
                        state.position_ms = (state.position_ms + TICK_MS).min(state.duration_ms);
                    } else {
                        state.playing = false;
                        state.position_ms = 0;
                        finished = true;
                    }
                });
                if finished {
                    break;
                }
            }
        }));
    }
}

impl Default for PlaybackProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackProgress {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(Clock {
                state: watch::Sender::new(ProgressState::default()),
                ticker: Mutex::new(None),
            }),
            follower: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ProgressState {
        *self.clock.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.clock.state.subscribe()
    }

    /// Load `track`: stop, rewind, and take its duration.
    pub fn set_track(&self, track: &Track) {
        self.clock.load(track.duration_ms);
    }

    pub fn toggle_play(&self) {
        if self.state().playing {
            self.clock.stop();
        } else {
            self.clock.start();
        }
    }

    pub fn seek(&self, position_ms: u64) {
        self.clock.state.send_modify(|state| {
            state.position_ms = position_ms.min(state.duration_ms);
        });
    }

    /// Track the store's current track, reloading on every change.
    pub fn follow(&self, store: &MusicStore) {
        let mut current = store.subscribe_current_track();
        let clock = self.clock.clone();
        let task = tokio::spawn(async move {
            loop {
                let duration_ms = current
                    .borrow_and_update()
                    .as_ref()
                    .map_or(0, |track| track.duration_ms);
                clock.load(duration_ms);
                if current.changed().await.is_err() {
                    break;
                }
            }
        });
        if let Some(previous) = self.follower.lock().unwrap().replace(task) {
            previous.abort();
        }
    }
}

impl Drop for PlaybackProgress {
    fn drop(&mut self) {
        if let Some(follower) = self.follower.get_mut().ok().and_then(Option::take) {
            follower.abort();
        }
        if let Some(ticker) = self.clock.ticker.lock().ok().and_then(|mut t| t.take()) {
            ticker.abort();
        }
    }
}
