use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::prompts::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    role: Role,
    content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Append-only log of turns for the conversational category.
#[derive(Debug, Default)]
pub struct ConversationState {
    turns: Vec<ChatTurn>,
}

impl ConversationState {
    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn all_turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Where a session is in the select → submit → render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingInput(Category),
    Requesting(Category),
    Appended(Category),
    Rendered(Category),
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    pub conversation: ConversationState,
    pub(crate) phase: Phase,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            conversation: ConversationState::default(),
            phase: Phase::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

pub type SessionHandle = Arc<AsyncMutex<Session>>;

/// Sessions untouched for this long are dropped.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Live sessions keyed by id.
///
/// The outer lock only guards the map. Each session has its own async lock,
/// held by the caller for a whole interaction so one session's requests run
/// strictly one after another. Sessions idle longer than `idle_timeout` are
/// evicted whenever a new session is created and on [`SessionStore::sweep`].
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_SESSION_IDLE)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Return the session for `id`, creating it if it does not exist yet.
    /// With no id a fresh session is started.
    pub fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SessionHandle) {
        let id = id.unwrap_or_else(Uuid::new_v4);
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = sessions.get_mut(&id) {
            entry.last_seen = now;
            return (id, entry.handle.clone());
        }

        evict_idle(&mut sessions, now, self.idle_timeout);
        info!("Starting session {}", id);
        let handle = Arc::new(AsyncMutex::new(Session::new(id)));
        sessions.insert(
            id,
            Entry {
                handle: handle.clone(),
                last_seen: now,
            },
        );
        (id, handle)
    }

    pub fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    /// Drop the session and everything it holds. Returns false if unknown.
    pub fn end(&self, id: Uuid) -> bool {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            info!("Ended session {}", id);
        }
        removed
    }

    /// Evict idle sessions now. Returns how many were dropped.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        evict_idle(&mut sessions, now, self.idle_timeout)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, Entry>, now: Instant, idle_timeout: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|id, entry| {
        let keep = now.saturating_duration_since(entry.last_seen) <= idle_timeout;
        if !keep {
            debug!("Evicting idle session {}", id);
        }
        keep
    });
    before - sessions.len()
}
