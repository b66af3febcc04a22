// Security event logger

use super::storage::EventStorage;
use super::types::{SecurityEvent, SecurityEventKind, SecurityEventLevel};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Logger for security events emitted by the session layer
///
/// Fire-and-forget from the caller's perspective: a storage failure is
/// traced and swallowed so it can never block a security decision.
#[derive(Clone)]
pub struct EventLogger {
    storage: Arc<dyn EventStorage>,
}

impl EventLogger {
    /// Create a new event logger with the specified storage backend
    pub fn new(storage: Arc<dyn EventStorage>) -> Self {
        Self { storage }
    }

    /// Log a security event
    pub async fn log(&self, event: SecurityEvent) {
        match event.level {
            SecurityEventLevel::Info => info!(
                "Security event: {} - user {} - {}",
                event.kind.as_str(),
                event.user_id,
                event.message
            ),
            _ => warn!(
                "Security event: {} - user {} - {}",
                event.kind.as_str(),
                event.user_id,
                event.message
            ),
        }

        if let Err(e) = self.storage.store(event).await {
            error!("Failed to store security event: {}", e);
        }
    }

    /// Log a session destroyed for exceeding its idle lifetime
    pub async fn log_session_timeout(&self, user_id: &str, session_id: &str) {
        let event = SecurityEvent::new(
            SecurityEventKind::SessionTimeout,
            SecurityEventLevel::Info,
            user_id,
            "session expired after idle timeout",
        )
        .with_session_id(session_id);

        self.log(event).await;
    }

    /// Log a fingerprint mismatch on an authenticated session
    ///
    /// Warning, not a hard error: the fingerprint is a heuristic, not proof.
    pub async fn log_hijack_attempt(&self, user_id: &str, session_id: &str, presented: &str) {
        let event = SecurityEvent::new(
            SecurityEventKind::HijackAttempt,
            SecurityEventLevel::Warning,
            user_id,
            "session fingerprint mismatch, possible hijack",
        )
        .with_session_id(session_id)
        .with_user_agent(presented);

        self.log(event).await;
    }

    /// Log the guard failing closed on an infrastructure fault
    pub async fn log_guard_failure(&self, user_id: &str, detail: &str) {
        let event = SecurityEvent::new(
            SecurityEventKind::GuardFailure,
            SecurityEventLevel::Security,
            user_id,
            detail,
        );

        self.log(event).await;
    }

    /// Log a successful login
    pub async fn log_login(&self, user_id: &str, session_id: &str, user_agent: Option<&str>) {
        let mut event = SecurityEvent::new(
            SecurityEventKind::Login,
            SecurityEventLevel::Info,
            user_id,
            "user logged in",
        )
        .with_session_id(session_id);

        if let Some(ua) = user_agent {
            event = event.with_user_agent(ua);
        }

        self.log(event).await;
    }

    /// Log an explicit logout
    pub async fn log_logout(&self, user_id: &str, session_id: &str) {
        let event = SecurityEvent::new(
            SecurityEventKind::Logout,
            SecurityEventLevel::Info,
            user_id,
            "user logged out",
        )
        .with_session_id(session_id);

        self.log(event).await;
    }
}
