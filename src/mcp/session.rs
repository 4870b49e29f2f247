//! Streamable HTTP session tracking
//!
//! A session is opened by a successful `initialize` and closed by `DELETE /mcp`. The
//! registry is bounded: once full, opening a session evicts the oldest one.

use std::{
    collections::{HashSet, VecDeque},
    sync::Mutex,
};

use tracing::warn;
use uuid::Uuid;

pub const SESSION_HEADER: &str = "mcp-session-id";
pub const MAX_SESSIONS: usize = 1_024;

#[derive(Debug, Default)]
struct Sessions {
    ids: HashSet<String>,
    opened: VecDeque<String>,
}

#[derive(Debug)]
pub struct SessionRegistry {
    capacity: usize,
    sessions: Mutex<Sessions>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            sessions: Mutex::new(Sessions::default()),
        }
    }

    pub fn open(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.lock();

        while sessions.ids.len() >= self.capacity {
            let Some(oldest) = sessions.opened.pop_front() else {
                break;
            };
            if sessions.ids.remove(&oldest) {
                warn!(session_id = %oldest, "session registry full, evicting oldest session");
            }
        }

        sessions.ids.insert(id.clone());
        sessions.opened.push_back(id.clone());
        id
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().ids.contains(id)
    }

    /// Returns false when the session was never opened, already closed, or evicted.
    pub fn close(&self, id: &str) -> bool {
        let mut sessions = self.lock();
        if !sessions.ids.remove(id) {
            return false;
        }
        sessions.opened.retain(|opened| opened != id);
        true
    }

    pub fn len(&self) -> usize {
        self.lock().ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Sessions> {
        // every mutation leaves both collections consistent before returning
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
