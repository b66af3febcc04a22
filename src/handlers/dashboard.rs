// Protected sample endpoint
// Everything behind the guard sees the checked session via request
// extensions; the dashboards themselves (widgets, charts, task CRUD) are
// separate services and not part of this crate.

use axum::{Extension, Json};
use serde_json::{Value, json};

use crate::middleware::CurrentSession;

/// GET /api/v1/dashboard
pub async fn overview(Extension(CurrentSession(session)): Extension<CurrentSession>) -> Json<Value> {
    Json(json!({
        "authenticated": session.is_authenticated(),
        "user_id": session.user_id,
        "role": session.role,
    }))
}
