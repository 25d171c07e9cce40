//! Session management
//!
//! Sessions live in process memory, keyed by an opaque random id that the
//! browser holds in a cookie. Nothing is persisted; a restart logs
//! everyone out.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use rand::RngCore;

use crate::config::SessionConfig;

/// Per-browser login state
#[derive(Clone)]
pub struct Session {
    /// Clever access token for this user
    pub access_token: String,
    /// "First Last", known once the profile has been fetched
    pub display_name: Option<String>,
    /// When the OAuth exchange completed
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// In-memory session store
///
/// Entries unused for `idle_timeout_seconds` expire on their own.
pub struct SessionStore {
    sessions: Cache<String, Arc<Session>>,
}

impl SessionStore {
    /// Create new session store
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = Cache::builder()
            .max_capacity(config.max_sessions)
            .time_to_idle(Duration::from_secs(config.idle_timeout_seconds))
            .build();

        Self { sessions }
    }

    /// Start a session for a freshly exchanged access token
    ///
    /// # Returns
    /// The opaque session id to hand to the browser
    pub async fn create(&self, access_token: String) -> String {
        let id = generate_session_id();
        let session = Session {
            access_token,
            display_name: None,
            created_at: Utc::now(),
        };
        self.sessions.insert(id.clone(), Arc::new(session)).await;
        self.record_size().await;

        tracing::debug!("Session created");
        id
    }

    /// Look up a live session
    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).await
    }

    /// Remember the user's display name
    ///
    /// Returns false if the session no longer exists.
    pub async fn set_display_name(&self, id: &str, display_name: String) -> bool {
        let Some(current) = self.sessions.get(id).await else {
            return false;
        };

        if current.display_name.as_deref() == Some(display_name.as_str()) {
            return true;
        }

        let mut updated = (*current).clone();
        updated.display_name = Some(display_name);
        self.sessions.insert(id.to_string(), Arc::new(updated)).await;
        true
    }

    /// End a session
    ///
    /// Returns whether a session existed.
    pub async fn destroy(&self, id: &str) -> bool {
        let existed = self.sessions.remove(id).await.is_some();
        self.record_size().await;
        existed
    }

    /// Number of live sessions
    pub async fn len(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }

    async fn record_size(&self) {
        use crate::metrics::SESSIONS_ACTIVE;
        SESSIONS_ACTIVE.set(self.len().await as i64);
    }
}

/// Generate a random URL-safe session id
fn generate_session_id() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
