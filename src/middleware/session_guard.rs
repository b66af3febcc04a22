// Session guard middleware
// Bridges the HTTP surface to the guard: cookie in, decision out. The
// guard itself never touches axum types, which keeps it testable without
// an HTTP runtime.

use axum::{
    extract::{Request, State},
    http::header::USER_AGENT,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::session::{Decision, GuardRequest, SessionGuardState, SessionState};

/// Snapshot of the checked session, stored in request extensions for
/// downstream handlers
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionState);

/// Build the session cookie with the attributes every set-path uses
pub fn session_cookie(name: &str, value: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that clears the session from the client
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/")
        .build()
}

/// Middleware guarding every protected route
///
/// `Continue` refreshes the cookie when the identifier changed (activation
/// or rotation) and runs the inner handler; `Terminate` clears the cookie
/// and redirects to the login page with the reason code. No other response
/// body is produced here.
pub async fn session_guard_middleware(
    State(state): State<SessionGuardState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.guard.config().cookie_name.clone();

    let presented_id = jar.get(&cookie_name).map(|c| c.value().to_string());
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let decision = state
        .guard
        .check(GuardRequest {
            session_id: presented_id.clone(),
            user_agent,
        })
        .await;

    match decision {
        Decision::Continue { session } => {
            let jar = if presented_id.as_deref() != Some(session.session_id.as_str()) {
                jar.add(session_cookie(&cookie_name, &session.session_id))
            } else {
                jar
            };

            request.extensions_mut().insert(CurrentSession(session));

            (jar, next.run(request).await).into_response()
        }
        Decision::Terminate { redirect_to, .. } => {
            let jar = jar.remove(removal_cookie(&cookie_name));
            (jar, Redirect::to(&redirect_to)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("taskboard_session", "abc-123");

        assert_eq!(cookie.name(), "taskboard_session");
        assert_eq!(cookie.value(), "abc-123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_removal_cookie_is_empty() {
        let cookie = removal_cookie("taskboard_session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
    }
}
