use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::models::AuthUser;
use crate::AppState;

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"error": {"kind": "unauthorized", "message": message}})),
    )
        .into_response()
}

/// Resolve a session token to an AuthUser, or None if the token is
/// unknown or expired.
pub async fn resolve_token(state: &AppState, token: &str) -> Option<AuthUser> {
    let row = sqlx::query_as::<_, (i64, String, String)>(
        r#"SELECT u.id, u.username, s.expires_at
           FROM sessions s
           JOIN users u ON u.id = s.user_id
           WHERE s.token = ?"#,
    )
    .bind(token)
    .fetch_optional(&state.db)
    .await
    .ok()??;

    let now = chrono::Utc::now().to_rfc3339();
    if row.2 < now {
        return None;
    }

    Some(AuthUser {
        id: row.0,
        username: row.1,
    })
}

/// Pull a session token from the Authorization header or the session cookie.
pub fn token_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    let cookie_prefix = format!("{}=", amora_shared::constants::SESSION_COOKIE);
    let from_cookie = headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .split(';')
        .filter_map(|c| {
            let c = c.trim();
            c.strip_prefix(cookie_prefix.as_str()).map(|t| t.to_string())
        })
        .next();

    bearer.or(from_cookie).filter(|t| !t.is_empty())
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = match token_from_headers(&parts.headers) {
            Some(t) => t,
            None => return Err(unauthorized("Not authenticated")),
        };

        match resolve_token(state, &token).await {
            Some(user) => Ok(user),
            None => Err(unauthorized("Invalid session")),
        }
    }
}
