//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-browser-session registry.

use code_docs_core::{DocumentationService, InteractionController};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(docs_adapter: Arc<dyn DocumentationService>) -> Self {
        Self::with_session_limits(docs_adapter, DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_session_limits(
        docs_adapter: Arc<dyn DocumentationService>,
        idle_ttl: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            sessions: SessionRegistry::new(docs_adapter, idle_ttl, max_sessions),
        }
    }
}

//=========================================================================================
// Session Registry (One Controller Per Browser Session)
//=========================================================================================

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1_000;

/// The controller for one browser session, as seen by a handler.
#[derive(Clone)]
pub struct SessionHandle {
    pub session_id: Uuid,
    pub controller: Arc<InteractionController>,
}

struct SessionEntry {
    controller: Arc<InteractionController>,
    last_seen: Instant,
}

impl SessionEntry {
    /// A handler still holds the controller (e.g. a submit is in flight).
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.controller) > 1
    }
}

/// In-memory map from session cookie to controller.
///
/// Sessions idle for longer than `idle_ttl` are dropped on the next lookup,
/// and the least recently seen idle session makes room once `max_sessions`
/// is reached. Sessions with a request in flight are never dropped.
pub struct SessionRegistry {
    docs_adapter: Arc<dyn DocumentationService>,
    idle_ttl: Duration,
    max_sessions: usize,
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(
        docs_adapter: Arc<dyn DocumentationService>,
        idle_ttl: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            docs_adapter,
            idle_ttl,
            max_sessions: max_sessions.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the session for `session_id`, or a fresh one when the id is
    /// missing, unknown or expired. The flag is true when a session was created.
    pub async fn get_or_create(&self, session_id: Option<Uuid>) -> (SessionHandle, bool) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.in_use() || now.duration_since(entry.last_seen) < self.idle_ttl
        });
        if sessions.len() < before {
            debug!("Expired {} idle session(s).", before - sessions.len());
        }

        if let Some(id) = session_id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return (
                    SessionHandle {
                        session_id: id,
                        controller: entry.controller.clone(),
                    },
                    false,
                );
            }
        }

        if sessions.len() >= self.max_sessions {
            let oldest_idle = sessions
                .iter()
                .filter(|(_, entry)| !entry.in_use())
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest_idle {
                sessions.remove(&oldest);
                debug!("Session limit reached; dropped least recently seen session {}.", oldest);
            }
        }

        let id = Uuid::new_v4();
        let controller = Arc::new(InteractionController::new(self.docs_adapter.clone()));
        sessions.insert(
            id,
            SessionEntry {
                controller: controller.clone(),
                last_seen: now,
            },
        );
        info!("Created documentation session {} ({} active).", id, sessions.len());
        (
            SessionHandle {
                session_id: id,
                controller,
            },
            true,
        )
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
