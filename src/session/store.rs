// Session storage backends
// Session state is server-held: the client only ever sees the opaque
// identifier, never the fields keyed by it.

use super::types::SessionState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Trait for session storage backends
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session for an identifier, `None` if no such session exists
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, String>;

    /// Persist a session under its current identifier
    async fn save(&self, session: SessionState) -> Result<(), String>;

    /// Destroy a session; destroying an unknown identifier is a no-op
    async fn destroy(&self, session_id: &str) -> Result<(), String>;

    /// Replace a session's identifier, preserving every other field.
    ///
    /// The swap is atomic: the old identifier becomes unusable in the same
    /// operation that makes the new one valid. Returns the new identifier.
    async fn rotate(&self, old_id: &str) -> Result<String, String>;
}

/// In-memory session store
///
/// The single map-wide write lock serializes read-modify-write for
/// concurrent requests bearing the same identifier, which is what keeps
/// `rotate` a lost-update-free critical section.
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, String> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn save(&self, session: SessionState) -> Result<(), String> {
        let mut sessions = self.sessions.write().await;
        debug!("Saving session {}", session.session_id);
        sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), String> {
        let mut sessions = self.sessions.write().await;

        if sessions.remove(session_id).is_some() {
            info!("Destroyed session {}", session_id);
        }

        Ok(())
    }

    async fn rotate(&self, old_id: &str) -> Result<String, String> {
        let mut sessions = self.sessions.write().await;

        let mut session = sessions
            .remove(old_id)
            .ok_or_else(|| format!("Session not found: {}", old_id))?;

        let new_id = uuid::Uuid::new_v4().to_string();
        session.session_id = new_id.clone();
        sessions.insert(new_id.clone(), session);

        debug!("Rotated session {} -> {}", old_id, new_id);

        Ok(new_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::Utc;

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let store = MemorySessionStore::new();
        let session =
            SessionState::authenticated("user-123".to_string(), UserRole::Admin, Utc::now());
        let session_id = session.session_id.clone();

        store.save(session.clone()).await.unwrap();

        let loaded = store.load(&session_id).await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_load_unknown_session_is_none() {
        let store = MemorySessionStore::new();
        assert!(store.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_destroy_removes_session() {
        let store = MemorySessionStore::new();
        let session = SessionState::anonymous(Utc::now());
        let session_id = session.session_id.clone();

        store.save(session).await.unwrap();
        store.destroy(&session_id).await.unwrap();

        assert!(store.load(&session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_destroy_unknown_session_is_noop() {
        let store = MemorySessionStore::new();
        assert!(store.destroy("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_rotate_swaps_identifier_and_preserves_fields() {
        let store = MemorySessionStore::new();
        let mut session =
            SessionState::authenticated("user-123".to_string(), UserRole::Employee, Utc::now());
        session.fingerprint = "Mozilla/5.0".to_string();
        let old_id = session.session_id.clone();

        store.save(session.clone()).await.unwrap();

        let new_id = store.rotate(&old_id).await.unwrap();
        assert_ne!(new_id, old_id);

        // Old identifier is unusable
        assert!(store.load(&old_id).await.unwrap().is_none());

        // All fields but the identifier survive
        let rotated = store.load(&new_id).await.unwrap().unwrap();
        assert_eq!(rotated.session_id, new_id);
        assert_eq!(rotated.user_id, session.user_id);
        assert_eq!(rotated.role, session.role);
        assert_eq!(rotated.fingerprint, session.fingerprint);
        assert_eq!(rotated.last_activity_at, session.last_activity_at);
        assert_eq!(rotated.last_rotation_at, session.last_rotation_at);
    }

    #[tokio::test]
    async fn test_rotate_unknown_session_fails() {
        let store = MemorySessionStore::new();
        assert!(store.rotate("missing").await.is_err());
    }
}
