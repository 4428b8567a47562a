use axum::{extract::State, Json};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::AuthUser;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchBody {
    pub timezone_offset_minutes: Option<i32>,
}

/// Overwrite the user's last-active instant with now (UTC, last writer
/// wins) and return the stored instant. Also called from the ws lifecycle.
pub async fn touch_last_active(
    db: &sqlx::SqlitePool,
    user_id: i64,
) -> Result<DateTime<Utc>, ApiError> {
    let now = Utc::now();

    let result = sqlx::query("UPDATE users SET last_active = ? WHERE id = ?")
        .bind(now.to_rfc3339())
        .bind(user_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("User not found".into()));
    }

    Ok(now)
}

/// POST /api/presence/touch
///
/// The stored value is always UTC; a client-supplied offset only shifts
/// the rendering returned in `lastActiveLocal`.
pub async fn touch(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Option<Json<TouchBody>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let now = touch_last_active(&state.db, user.id).await?;

    let local = body
        .timezone_offset_minutes
        .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
        .map(|offset| now.with_timezone(&offset).to_rfc3339());

    let mut response = serde_json::json!({ "lastActiveUtc": now.to_rfc3339() });
    if let Some(local) = local {
        response["lastActiveLocal"] = serde_json::Value::String(local);
    }

    Ok(Json(response))
}
