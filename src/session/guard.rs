// Session guard: the per-request session lifecycle decision
// Evaluates, in strict order, idle timeout, activity stamp + identifier
// rotation, and the fingerprint hijack heuristic. Infrastructure faults
// fail closed: an unverifiable session is terminated, never waved through.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use super::store::SessionStore;
use super::types::{SessionSecurityConfig, SessionState};
use crate::audit::EventLogger;
use crate::clock::Clock;

/// What the caller presented with the request
#[derive(Debug, Clone, Default)]
pub struct GuardRequest {
    /// Session identifier from the request cookie, if any
    pub session_id: Option<String>,
    /// Client identifier used as the hijack heuristic
    pub user_agent: Option<String>,
}

/// Why a session was terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateReason {
    /// Idle beyond the session lifetime
    SessionExpired,
    /// Fingerprint mismatch on an authenticated session
    SecurityViolation,
    /// Infrastructure fault; the guard failed closed
    SessionError,
}

impl TerminateReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminateReason::SessionExpired => "session_expired",
            TerminateReason::SecurityViolation => "security_violation",
            TerminateReason::SessionError => "session_error",
        }
    }
}

/// Outcome of a session check
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Request may proceed. Carries the identifier the client should hold,
    /// which differs from the presented one after activation or rotation,
    /// and a snapshot of the session for downstream handlers.
    Continue { session: SessionState },
    /// Session terminated; the client is redirected with a reason code
    Terminate {
        reason: TerminateReason,
        redirect_to: String,
    },
}

impl Decision {
    pub fn is_continue(&self) -> bool {
        matches!(self, Decision::Continue { .. })
    }
}

/// The gate that runs on every protected request
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    events: EventLogger,
    clock: Arc<dyn Clock>,
    config: SessionSecurityConfig,
}

impl SessionGuard {
    pub fn new(
        store: Arc<dyn SessionStore>,
        events: EventLogger,
        clock: Arc<dyn Clock>,
        config: SessionSecurityConfig,
    ) -> Self {
        Self {
            store,
            events,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SessionSecurityConfig {
        &self.config
    }

    /// Decide the fate of one request's session.
    ///
    /// Steps run in fixed order and each may short-circuit the rest:
    /// activation, timeout, activity stamp + rotation (authenticated only),
    /// fingerprint (authenticated only). Every `Terminate` path emits
    /// exactly one security event; `Continue` emits none.
    pub async fn check(&self, request: GuardRequest) -> Decision {
        let now = match self.clock.now() {
            Ok(now) => now,
            Err(e) => {
                warn!("Clock unavailable, failing closed: {}", e);
                self.events
                    .log_guard_failure("unknown", "clock unavailable during session check")
                    .await;
                return self.terminate(TerminateReason::SessionError);
            }
        };

        // Activation: load the presented session, or start a fresh empty one
        let (mut session, fresh) = match request.session_id.as_deref() {
            Some(id) => match self.store.load(id).await {
                Ok(Some(session)) => (session, false),
                Ok(None) => (SessionState::anonymous(now), true),
                Err(e) => {
                    warn!("Session store unavailable, failing closed: {}", e);
                    self.events
                        .log_guard_failure("unknown", "session store unavailable during load")
                        .await;
                    return self.terminate(TerminateReason::SessionError);
                }
            },
            None => (SessionState::anonymous(now), true),
        };

        // Timeout: a session idle past its lifetime is destroyed before any
        // further state is read. `last_activity_at` is only ever stamped on
        // authenticated requests, so anonymous sessions never trip this.
        if let Some(last_activity) = session.last_activity_at
            && now - last_activity > Duration::seconds(self.config.session_lifetime_secs)
        {
            self.events
                .log_session_timeout(session.user_id_or_unknown(), &session.session_id)
                .await;
            self.destroy_session(&session.session_id).await;
            return self.terminate(TerminateReason::SessionExpired);
        }

        let mut mutated = false;

        // Activity stamp + rotation, authenticated callers only
        if session.is_authenticated() {
            session.last_activity_at = Some(now);
            mutated = true;

            match session.last_rotation_at {
                // First touch after login: start the rotation window
                None => session.last_rotation_at = Some(now),
                Some(last_rotation)
                    if now - last_rotation
                        > Duration::seconds(self.config.rotation_interval_secs) =>
                {
                    match self.store.rotate(&session.session_id).await {
                        Ok(new_id) => {
                            debug!(
                                "Rotated session identifier for user {}",
                                session.user_id_or_unknown()
                            );
                            session.session_id = new_id;
                            session.last_rotation_at = Some(now);
                        }
                        Err(e) => {
                            warn!("Session rotation failed, failing closed: {}", e);
                            self.events
                                .log_guard_failure(
                                    session.user_id_or_unknown(),
                                    "session store unavailable during rotation",
                                )
                                .await;
                            return self.terminate(TerminateReason::SessionError);
                        }
                    }
                }
                Some(_) => {}
            }
        }

        // Fingerprint: first observation wins; afterwards the presented
        // value must match byte for byte
        if session.is_authenticated() {
            let presented = request.user_agent.as_deref().unwrap_or("");

            if session.fingerprint.is_empty() {
                session.fingerprint = presented.to_string();
            } else if session.fingerprint != presented {
                self.events
                    .log_hijack_attempt(
                        session.user_id_or_unknown(),
                        &session.session_id,
                        presented,
                    )
                    .await;
                self.destroy_session(&session.session_id).await;
                return self.terminate(TerminateReason::SecurityViolation);
            }
        }

        // Persist accumulated mutations as one committed write. A
        // pre-existing anonymous session was not touched and is not saved.
        if fresh || mutated {
            if let Err(e) = self.store.save(session.clone()).await {
                warn!("Session store unavailable, failing closed: {}", e);
                self.events
                    .log_guard_failure(
                        session.user_id_or_unknown(),
                        "session store unavailable during save",
                    )
                    .await;
                return self.terminate(TerminateReason::SessionError);
            }
        }

        Decision::Continue { session }
    }

    /// Destruction is terminal for the request: a store failure here is
    /// traced but the terminate decision stands
    async fn destroy_session(&self, session_id: &str) {
        if let Err(e) = self.store.destroy(session_id).await {
            warn!("Failed to destroy session {}: {}", session_id, e);
        }
    }

    fn terminate(&self, reason: TerminateReason) -> Decision {
        Decision::Terminate {
            reason,
            redirect_to: format!("{}?reason={}", self.config.login_path, reason.as_str()),
        }
    }
}

/// Guard state for use in Axum middleware
#[derive(Clone)]
pub struct SessionGuardState {
    pub guard: Arc<SessionGuard>,
}

impl SessionGuardState {
    pub fn new(
        store: Arc<dyn SessionStore>,
        events: EventLogger,
        clock: Arc<dyn Clock>,
        config: SessionSecurityConfig,
    ) -> Self {
        Self {
            guard: Arc::new(SessionGuard::new(store, events, clock, config)),
        }
    }
}
