// Session types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserRole;

/// Session security configuration
///
/// Both durations are deployment parameters, not invariants of the guard
/// itself. `rotation_interval_secs` must be materially smaller than
/// `session_lifetime_secs` for rotation to ever fire before expiry;
/// `validate` enforces the ordering.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSecurityConfig {
    /// Idle timeout: a session untouched for longer than this is destroyed
    #[serde(default = "default_session_lifetime_secs")]
    pub session_lifetime_secs: i64,
    /// How often the session identifier is replaced
    #[serde(default = "default_rotation_interval_secs")]
    pub rotation_interval_secs: i64,
    /// Where terminated sessions are redirected to
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_session_lifetime_secs() -> i64 {
    1800 // 30 minutes
}

fn default_rotation_interval_secs() -> i64 {
    300 // 5 minutes
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_cookie_name() -> String {
    "taskboard_session".to_string()
}

impl Default for SessionSecurityConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: default_session_lifetime_secs(),
            rotation_interval_secs: default_rotation_interval_secs(),
            login_path: default_login_path(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl SessionSecurityConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.session_lifetime_secs <= 0 {
            return Err("session_lifetime_secs must be a positive duration".to_string());
        }

        if self.rotation_interval_secs <= 0 {
            return Err("rotation_interval_secs must be a positive duration".to_string());
        }

        if self.rotation_interval_secs >= self.session_lifetime_secs {
            return Err(
                "rotation_interval_secs must be smaller than session_lifetime_secs".to_string(),
            );
        }

        if self.login_path.is_empty() {
            return Err("login_path must not be empty".to_string());
        }

        Ok(())
    }
}

/// Server-held session state, keyed by an opaque identifier
///
/// `last_activity_at` is stamped only on allowed authenticated requests, so
/// it stays `None` for a session no authenticated request has touched. The
/// timeout check keys off that: anonymous sessions never expire mid-request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    /// Opaque session identifier, exclusively owned by the store
    pub session_id: String,
    /// User ID; absent for an anonymous session
    pub user_id: Option<String>,
    /// Role tag, present only when `user_id` is present
    pub role: Option<UserRole>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Last allowed authenticated request
    pub last_activity_at: Option<DateTime<Utc>>,
    /// When the identifier was last rotated
    pub last_rotation_at: Option<DateTime<Utc>>,
    /// Client identifier captured from the first authenticated request;
    /// empty until first set
    pub fingerprint: String,
}

impl SessionState {
    /// Create a fresh, empty anonymous session
    pub fn anonymous(created_at: DateTime<Utc>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            role: None,
            created_at,
            last_activity_at: None,
            last_rotation_at: None,
            fingerprint: String::new(),
        }
    }

    /// Create an authenticated session, as the login handler does after a
    /// successful credential check
    pub fn authenticated(user_id: String, role: UserRole, now: DateTime<Utc>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_id: Some(user_id),
            role: Some(role),
            created_at: now,
            last_activity_at: Some(now),
            last_rotation_at: Some(now),
            fingerprint: String::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// User ID for event logging, "unknown" when the session is anonymous
    pub fn user_id_or_unknown(&self) -> &str {
        self.user_id.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session_has_no_identity() {
        let session = SessionState::anonymous(Utc::now());

        assert!(!session.is_authenticated());
        assert!(session.user_id.is_none());
        assert!(session.role.is_none());
        assert!(session.last_activity_at.is_none());
        assert!(session.last_rotation_at.is_none());
        assert!(session.fingerprint.is_empty());
        assert_eq!(session.user_id_or_unknown(), "unknown");
    }

    #[test]
    fn test_authenticated_session_is_stamped() {
        let now = Utc::now();
        let session = SessionState::authenticated("user-123".to_string(), UserRole::Employee, now);

        assert!(session.is_authenticated());
        assert_eq!(session.last_activity_at, Some(now));
        assert_eq!(session.last_rotation_at, Some(now));
        assert!(session.fingerprint.is_empty());
        assert_eq!(session.user_id_or_unknown(), "user-123");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionSecurityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_lifetime_secs, 1800);
        assert_eq!(config.rotation_interval_secs, 300);
    }

    #[test]
    fn test_config_rejects_non_positive_durations() {
        let mut config = SessionSecurityConfig::default();
        config.session_lifetime_secs = 0;
        assert!(config.validate().is_err());

        let mut config = SessionSecurityConfig::default();
        config.rotation_interval_secs = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_rotation_slower_than_lifetime() {
        let mut config = SessionSecurityConfig::default();
        config.rotation_interval_secs = config.session_lifetime_secs;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("smaller"));
    }
}
