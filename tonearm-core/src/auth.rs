//! Client-credentials token management.
//!
//! A [`CredentialManager`] owns the current bearer token, publishes every new
//! token to subscribers, and refreshes the token shortly before it expires.

use std::{
    sync::{
        Arc, Mutex, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle, time::Instant};

use crate::{source::TokenSource, tc};

/// How long before expiry a token is refreshed.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);
/// The longest a token is trusted before refreshing, whatever lifetime the
/// endpoint claims.
pub const MAX_REFRESH_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token endpoint rejected the client id/secret pair.
    InvalidCredentials,
    /// The token endpoint could not be reached.
    Connectivity(String),
    /// The token endpoint answered with some other failure status.
    Rejected {
        status: u16,
        message: Option<String>,
    },
    /// The token endpoint answered with something that is not a token.
    Malformed(String),
}
impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => {
                write!(f, "Invalid client credentials; check the client id and secret")
            }
            AuthError::Connectivity(e) => write!(f, "Could not reach the token endpoint: {e}"),
            AuthError::Rejected { status, message } => {
                write!(f, "Token endpoint rejected the request (HTTP {status})")?;
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
            AuthError::Malformed(e) => {
                write!(f, "Token endpoint returned an unexpected response: {e}")
            }
        }
    }
}
impl std::error::Error for AuthError {}
impl From<tc::ClientError> for AuthError {
    fn from(e: tc::ClientError) -> Self {
        match e {
            tc::ClientError::StatusError {
                status: 400 | 401, ..
            } => AuthError::InvalidCredentials,
            tc::ClientError::StatusError { status, message } => {
                AuthError::Rejected { status, message }
            }
            tc::ClientError::ConnectionError(e) => AuthError::Connectivity(e),
            tc::ClientError::ReqwestError(e) => AuthError::Connectivity(e.to_string()),
            tc::ClientError::DeserializationError(e) => AuthError::Malformed(e.to_string()),
        }
    }
}

/// Holds the current bearer token and keeps it fresh.
///
/// Cloning is cheap; all clones share the same token and refresh schedule.
#[derive(Clone)]
pub struct CredentialManager {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn TokenSource>,
    /// The empty string means "no token".
    token: watch::Sender<String>,
    refresh: Mutex<Option<ScheduledRefresh>>,
    refresh_generation: AtomicU64,
}
impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(refresh) = self.refresh.get_mut().ok().and_then(Option::take) {
            refresh.task.abort();
        }
    }
}

struct ScheduledRefresh {
    generation: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

impl CredentialManager {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        let (token, _) = watch::channel(String::new());
        Self {
            inner: Arc::new(Inner {
                source,
                token,
                refresh: Mutex::new(None),
                refresh_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Request a new token, publish it, and schedule its refresh.
    ///
    /// Any previously scheduled refresh is cancelled. On failure the current
    /// token (if any) is left untouched and nothing is scheduled.
    pub async fn acquire(&self) -> Result<(), AuthError> {
        tracing::debug!("requesting catalog credential");
        let response = match self.inner.source.request_token().await {
            Ok(response) => response,
            Err(e) => {
                let error = AuthError::from(e);
                tracing::error!("failed to acquire catalog credential: {error}");
                return Err(error);
            }
        };
        if response.access_token.is_empty() {
            let error = AuthError::Malformed("empty access token".to_string());
            tracing::error!("failed to acquire catalog credential: {error}");
            return Err(error);
        }

        let expires_in = response.expires_in;
        self.inner.token.send_replace(response.access_token);
        self.schedule_refresh(Duration::from_secs(expires_in));
        tracing::info!("acquired catalog credential, valid for {expires_in}s");
        Ok(())
    }

    /// Acquire a new token immediately, regardless of the current one.
    pub async fn force_refresh(&self) -> Result<(), AuthError> {
        tracing::info!("forcing catalog credential refresh");
        self.acquire().await
    }

    pub fn current_token(&self) -> Option<String> {
        let token = self.inner.token.borrow();
        (!token.is_empty()).then(|| token.clone())
    }

    pub fn is_valid(&self) -> bool {
        !self.inner.token.borrow().is_empty()
    }

    /// Observe token changes. The current value is available immediately;
    /// an empty string means no token is held.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.inner.token.subscribe()
    }

    /// Wait until a token is held, and return it.
    pub async fn wait_for_token(&self) -> Option<String> {
        let mut receiver = self.subscribe();
        let token = receiver.wait_for(|token| !token.is_empty()).await.ok()?;
        Some(token.as_str().to_owned())
    }

    /// When the pending refresh will fire, if one is scheduled.
    pub fn refresh_deadline(&self) -> Option<Instant> {
        self.inner
            .refresh
            .lock()
            .unwrap()
            .as_ref()
            .map(|refresh| refresh.deadline)
    }

    /// Drop the current token and cancel any pending refresh.
    pub fn release(&self) {
        if let Some(refresh) = self.inner.refresh.lock().unwrap().take() {
            refresh.task.abort();
        }
        self.inner.token.send_replace(String::new());
        tracing::debug!("released catalog credential");
    }

    fn schedule_refresh(&self, expires_in: Duration) {
        let delay = expires_in
            .saturating_sub(REFRESH_MARGIN)
            .min(MAX_REFRESH_DELAY);
        let deadline = Instant::now() + delay;
        let generation = self.inner.refresh_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let inner = Arc::downgrade(&self.inner);

        // The slot stays locked until the new task is recorded, so the task
        // can never observe a slot that predates it.
        let mut slot = self.inner.refresh.lock().unwrap();
        let task = tokio::spawn(refresh_at(inner, generation, deadline));
        if let Some(previous) = slot.replace(ScheduledRefresh {
            generation,
            deadline,
            task,
        }) {
            previous.task.abort();
        }
    }
}

async fn refresh_at(inner: Weak<Inner>, generation: u64, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;
    let Some(inner) = inner.upgrade() else {
        return;
    };

    {
        let mut slot = inner.refresh.lock().unwrap();
        if slot.as_ref().is_some_and(|r| r.generation == generation) {
            slot.take();
        }
    }

    tracing::info!("refreshing catalog credential");
    let manager = CredentialManager { inner };
    if let Err(e) = manager.acquire().await {
        tracing::error!("scheduled credential refresh failed: {e}");
    }
}
