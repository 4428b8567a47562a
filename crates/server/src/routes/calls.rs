use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{AuthUser, Call};
use crate::ws::events::ServerEvent;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateBody {
    pub receiver_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondBody {
    pub call_id: Option<String>,
    pub caller_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub response: Option<String>,
}

/// POST /api/calls
///
/// Creates the call in `ringing` and pushes `incoming-call` to the
/// receiver's private address.
pub async fn initiate_call(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<InitiateBody>,
) -> Result<Json<Call>, ApiError> {
    let receiver_id = body
        .receiver_id
        .ok_or_else(|| ApiError::Validation("Missing parameters".into()))?;

    let receiver_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(receiver_id)
            .fetch_one(&state.db)
            .await?;
    if receiver_exists == 0 {
        return Err(ApiError::NotFound("Receiver not found".into()));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"INSERT INTO calls (id, caller_id, receiver_id, status, started_at)
           VALUES (?, ?, ?, 'ringing', ?)"#,
    )
    .bind(&id)
    .bind(user.id)
    .bind(receiver_id)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let call = Call {
        id,
        caller_id: user.id,
        receiver_id,
        status: "ringing".into(),
        started_at: now,
        ended_at: None,
    };

    state
        .gateway
        .publish_user(
            receiver_id,
            &ServerEvent::IncomingCall {
                call: call.clone(),
                caller_username: user.username.clone(),
            },
        )
        .await;

    Ok(Json(call))
}

/// POST /api/calls/respond
///
/// Transition the ringing call per the receiver's answer, then notify the
/// caller's private address. The persisted status is authoritative; a
/// failed publish is logged and the response still succeeds.
pub async fn respond_call(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(body): Json<RespondBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (call_id, _caller_id, receiver_id, response) =
        match (body.call_id, body.caller_id, body.receiver_id, body.response) {
            (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
            _ => return Err(ApiError::Validation("Missing parameters".into())),
        };

    // ringing -> ongoing on accept, ringing -> declined on decline;
    // a decline also stamps ended_at.
    let (target_status, ended_at) = match response.as_str() {
        "accepted" => ("ongoing", None),
        "declined" => ("declined", Some(chrono::Utc::now().to_rfc3339())),
        _ => {
            return Err(ApiError::Validation(
                "Response must be 'accepted' or 'declined'".into(),
            ))
        }
    };

    let call = sqlx::query_as::<_, Call>("SELECT * FROM calls WHERE id = ?")
        .bind(&call_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Call not found".into()))?;

    let result = sqlx::query(
        r#"UPDATE calls SET status = ?, ended_at = COALESCE(?, ended_at)
           WHERE id = ? AND status = 'ringing'"#,
    )
    .bind(target_status)
    .bind(&ended_at)
    .bind(&call_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(format!(
            "Call is no longer ringing (status: {})",
            call.status
        )));
    }

    let updated = sqlx::query_as::<_, Call>("SELECT * FROM calls WHERE id = ?")
        .bind(&call_id)
        .fetch_one(&state.db)
        .await?;

    // Notify the caller; the state change above is the source of truth.
    state
        .gateway
        .publish_user(
            updated.caller_id,
            &ServerEvent::CallResponse {
                receiver_id,
                response: response.clone(),
            },
        )
        .await;

    Ok(Json(serde_json::json!({
        "status": updated.status,
        "call": updated,
    })))
}
