// Login and logout handlers
// Session creation on login and destruction on logout happen here, outside
// the guard; the guard only ever sees the result on later requests.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::audit::EventLogger;
use crate::auth::CredentialVerifier;
use crate::clock::Clock;
use crate::middleware::session_guard::{removal_cookie, session_cookie};
use crate::models::{LoginRequest, LoginResponse};
use crate::session::{SessionSecurityConfig, SessionState, SessionStore};

/// Shared state for the auth handlers
#[derive(Clone)]
pub struct AuthState {
    pub store: Arc<dyn SessionStore>,
    pub events: EventLogger,
    pub clock: Arc<dyn Clock>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub config: SessionSecurityConfig,
}

/// POST /api/v1/auth/login
///
/// On success the previous session (if any) is destroyed and a fresh
/// authenticated one replaces it, so a pre-login identifier never carries
/// over into the logged-in context.
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Response {
    let verified = match state.verifier.verify(&body.username, &body.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid_credentials" })),
            )
                .into_response();
        }
        Err(e) => {
            warn!("Credential backend unavailable: {}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "verification_unavailable" })),
            )
                .into_response();
        }
    };

    let now = match state.clock.now() {
        Ok(now) => now,
        Err(e) => {
            warn!("Clock unavailable during login: {}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "session_error" })),
            )
                .into_response();
        }
    };

    // Replace any session the client was already holding
    if let Some(old) = jar.get(&state.config.cookie_name)
        && let Err(e) = state.store.destroy(old.value()).await
    {
        warn!("Failed to destroy pre-login session: {}", e);
    }

    let session = SessionState::authenticated(verified.user_id.clone(), verified.role, now);

    if let Err(e) = state.store.save(session.clone()).await {
        warn!("Session store unavailable during login: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "session_error" })),
        )
            .into_response();
    }

    let user_agent = headers.get(USER_AGENT).and_then(|h| h.to_str().ok());
    state
        .events
        .log_login(&verified.user_id, &session.session_id, user_agent)
        .await;

    info!("User {} logged in", verified.user_id);

    let jar = jar.add(session_cookie(
        &state.config.cookie_name,
        &session.session_id,
    ));

    (
        jar,
        Json(LoginResponse {
            user_id: verified.user_id,
            role: verified.role,
        }),
    )
        .into_response()
}

/// POST /api/v1/auth/logout
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(&state.config.cookie_name) {
        let session_id = cookie.value().to_string();

        // Load first so the event carries the user, then destroy
        let user_id = match state.store.load(&session_id).await {
            Ok(Some(session)) => session.user_id_or_unknown().to_string(),
            _ => "unknown".to_string(),
        };

        if let Err(e) = state.store.destroy(&session_id).await {
            warn!("Failed to destroy session on logout: {}", e);
        }

        state.events.log_logout(&user_id, &session_id).await;
    }

    let jar = jar.remove(removal_cookie(&state.config.cookie_name));

    (jar, StatusCode::NO_CONTENT).into_response()
}
