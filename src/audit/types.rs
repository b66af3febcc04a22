// Security event types and structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single security-relevant event emitted by the session layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique identifier for the event
    pub id: String,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub kind: SecurityEventKind,
    /// Severity of the event
    pub level: SecurityEventLevel,
    /// User the event concerns, "unknown" when no identity was established
    pub user_id: String,
    /// Session the event concerns, if any
    pub session_id: Option<String>,
    /// Human-readable description
    pub message: String,
    /// IP address of the requester
    pub ip_address: Option<String>,
    /// User agent string from the request
    pub user_agent: Option<String>,
}

/// Kinds of security events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    Login,
    Logout,
    /// Session destroyed after exceeding the idle lifetime
    SessionTimeout,
    /// Fingerprint mismatch on an authenticated session
    HijackAttempt,
    /// The guard failed closed on an infrastructure fault
    GuardFailure,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventKind::Login => "login",
            SecurityEventKind::Logout => "logout",
            SecurityEventKind::SessionTimeout => "session_timeout",
            SecurityEventKind::HijackAttempt => "session_hijack_attempt",
            SecurityEventKind::GuardFailure => "guard_failure",
        }
    }
}

/// Severity level of security events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventLevel {
    /// Normal operations
    Info,
    /// Unusual but heuristic, not proof of an attack
    Warning,
    /// Security-relevant failures
    Security,
}

/// Query parameters for searching security events
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityEventQuery {
    /// Filter by event kind
    pub kind: Option<SecurityEventKind>,
    /// Filter by user ID
    pub user_id: Option<String>,
    /// Filter by session ID
    pub session_id: Option<String>,
    /// Filter by minimum severity level
    pub min_level: Option<SecurityEventLevel>,
    /// Filter by start timestamp
    pub start_time: Option<DateTime<Utc>>,
    /// Filter by end timestamp
    pub end_time: Option<DateTime<Utc>>,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Offset for pagination
    pub offset: Option<usize>,
}

impl SecurityEvent {
    pub fn new(
        kind: SecurityEventKind,
        level: SecurityEventLevel,
        user_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            level,
            user_id: user_id.into(),
            session_id: None,
            message: message.into(),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_construction() {
        let event = SecurityEvent::new(
            SecurityEventKind::SessionTimeout,
            SecurityEventLevel::Info,
            "user-123",
            "session expired after idle timeout",
        )
        .with_session_id("session-abc");

        assert_eq!(event.kind, SecurityEventKind::SessionTimeout);
        assert_eq!(event.user_id, "user-123");
        assert_eq!(event.session_id, Some("session-abc".to_string()));
        assert!(event.ip_address.is_none());
    }

    #[test]
    fn test_level_ordering() {
        assert!(SecurityEventLevel::Info < SecurityEventLevel::Warning);
        assert!(SecurityEventLevel::Warning < SecurityEventLevel::Security);
    }

    #[test]
    fn test_kind_string_mapping() {
        assert_eq!(SecurityEventKind::SessionTimeout.as_str(), "session_timeout");
        assert_eq!(
            SecurityEventKind::HijackAttempt.as_str(),
            "session_hijack_attempt"
        );
    }
}
