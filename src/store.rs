use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::session::Session;

/// A stored session. Whoever holds the lock owns the session for one whole
/// render cycle; requests on the same session id queue behind it.
pub type SharedSession = Arc<Mutex<Session>>;

/// SessionStore
///
/// Holds one [`Session`] per interaction context, keyed by the session id carried
/// in the client's token. Nothing about a session lives in process-wide variables.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a fresh `LoggedOut` session and returns a snapshot of it.
    async fn open(&self) -> (Uuid, Session);
    /// Looks up a live session and marks it as seen.
    async fn load(&self, id: Uuid) -> Option<SharedSession>;
    /// Drops sessions not touched for longer than `max_idle`. Returns how many.
    async fn purge_idle(&self, max_idle: Duration) -> usize;
}

pub type SessionStoreState = Arc<dyn SessionStore>;

struct StoredSession {
    session: SharedSession,
    last_seen: DateTime<Utc>,
}

/// InMemorySessionStore
///
/// Process-local store. Each entry is independent, so concurrent principals never
/// contend on one another's state.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<Uuid, StoredSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn open(&self) -> (Uuid, Session) {
        let id = Uuid::new_v4();
        let session = Session::new();
        self.sessions.insert(
            id,
            StoredSession {
                session: Arc::new(Mutex::new(session.clone())),
                last_seen: Utc::now(),
            },
        );
        tracing::debug!(session_id = %id, "session opened");
        (id, session)
    }

    async fn load(&self, id: Uuid) -> Option<SharedSession> {
        let mut stored = self.sessions.get_mut(&id)?;
        stored.last_seen = Utc::now();
        Some(Arc::clone(&stored.session))
    }

    async fn purge_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let before = self.sessions.len();
        self.sessions.retain(|_, stored| stored.last_seen >= cutoff);
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            tracing::info!(purged, "idle sessions purged");
        }
        purged
    }
}
