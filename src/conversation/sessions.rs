//! Session-scoped message stores.
//!
//! Each browser session gets its own [`MessageStore`], created on first
//! contact. Stores are dropped on explicit teardown or once they have been
//! idle longer than the configured timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::MessageStore;

/// Session used when a request does not name one.
pub const DEFAULT_SESSION: &str = "default";

struct SessionEntry {
    store: Arc<MessageStore>,
    last_seen: Instant,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    system_prompt: String,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(system_prompt: impl Into<String>, idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            system_prompt: system_prompt.into(),
            idle_timeout,
        }
    }

    /// Start a fresh session and return its id.
    pub fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.get_or_create(&id);
        info!(session = %id, "Session created");
        id
    }

    /// Store for `id`, creating it if this is the first contact.
    pub fn get_or_create(&self, id: &str) -> Arc<MessageStore> {
        let mut sessions = self.sessions.lock();
        let entry = sessions.entry(id.to_string()).or_insert_with(|| {
            debug!(session = %id, "Seeding new message store");
            SessionEntry {
                store: Arc::new(MessageStore::new(&self.system_prompt)),
                last_seen: Instant::now(),
            }
        });
        entry.last_seen = Instant::now();
        entry.store.clone()
    }

    /// Store for `id` if the session exists. Does not refresh its idle timer.
    pub fn get(&self, id: &str) -> Option<Arc<MessageStore>> {
        self.sessions.lock().get(id).map(|e| e.store.clone())
    }

    /// Tear a session down. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.lock().remove(id).is_some();
        if removed {
            info!(session = %id, "Session removed");
        }
        removed
    }

    /// Drop every session idle for longer than the timeout.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_idle_since(Instant::now())
    }

    fn sweep_idle_since(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= self.idle_timeout);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Expired idle sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

/// Periodically expire idle sessions until the runtime shuts down.
pub fn spawn_sweeper(sessions: Arc<SessionStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sessions.sweep_expired();
        }
    })
}
