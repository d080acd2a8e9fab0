//! Session storage keyed by user identity
//!
//! Each session sits behind its own async mutex. A request holds that mutex
//! for its whole transition, so requests from one user run one at a time in
//! arrival order (tokio's mutex is fair) while different users proceed in
//! parallel. The outer map lock is only held long enough to find or insert
//! the entry.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, RwLock};

use super::Session;
use crate::auth::UserId;

/// Shared, lockable handle to one user's session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory session store
///
/// Sessions are created on first login and never removed while the server
/// runs. Cloning the store shares the underlying map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<UserId, SessionHandle>>>,
}

impl SessionStore {
    /// Create a new empty session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for `user`, creating an empty one on first use.
    pub async fn get_or_create(&self, user: &UserId) -> SessionHandle {
        if let Some(session) = self.get(user).await {
            return session;
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user.clone())
            .or_insert_with(|| {
                tracing::info!(user = %user, "Creating session");
                Arc::new(Mutex::new(Session::new(user.clone())))
            })
            .clone()
    }

    /// Get the session for `user` if one exists.
    pub async fn get(&self, user: &UserId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(user).cloned()
    }

    /// Number of sessions (for the health endpoint)
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
