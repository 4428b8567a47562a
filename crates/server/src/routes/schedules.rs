use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::constants::{DEFAULT_RESCHEDULE_REASON, MESSAGE_TYPE_RESCHEDULE};

use crate::error::ApiError;
use crate::models::{AuthUser, Message, Schedule};
use crate::ws::events::ServerEvent;
use crate::ws::gateway::room_address;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBody {
    pub new_date: Option<String>,
    pub receiver_id: Option<i64>,
    pub reason: Option<String>,
}

/// POST /api/schedules/:scheduleId/reschedule
///
/// Moves the schedule to `rescheduled` and spawns a system-authored notice
/// message back to the original sender. If the notice insert fails after
/// the schedule update succeeded, the caller gets `partial_failure` so it
/// can retry just the missing step.
pub async fn reschedule(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(schedule_id): Path<i64>,
    Json(body): Json<RescheduleBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (new_date, receiver_id) = match (body.new_date, body.receiver_id) {
        (Some(d), Some(r)) => (d, r),
        _ => return Err(ApiError::Validation("Missing parameters".into())),
    };

    if chrono::NaiveDate::parse_from_str(&new_date, "%Y-%m-%d").is_err() {
        return Err(ApiError::Validation(
            "newDate must be a YYYY-MM-DD date".into(),
        ));
    }

    let schedule = sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = ?")
        .bind(schedule_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Schedule not found".into()))?;

    sqlx::query(
        "UPDATE schedules SET rescheduled_date = ?, status = 'rescheduled' WHERE id = ?",
    )
    .bind(&new_date)
    .bind(schedule_id)
    .execute(&state.db)
    .await?;

    // Notice goes back to the schedule's original sender, authored on
    // behalf of the party proposing the new date.
    let reason = body
        .reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RESCHEDULE_REASON.to_string());
    let content = format!("Your date has been rescheduled to {}. Reason: {}", new_date, reason);

    let message_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let insert = sqlx::query(
        r#"INSERT INTO messages (id, sender_id, receiver_id, content, message_type, status, reactions, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, 'sent', '[]', ?, ?)"#,
    )
    .bind(&message_id)
    .bind(receiver_id)
    .bind(schedule.sender_id)
    .bind(&content)
    .bind(MESSAGE_TYPE_RESCHEDULE)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await;

    if let Err(e) = insert {
        tracing::error!("reschedule notice insert failed for schedule {}: {}", schedule_id, e);
        return Err(ApiError::PartialFailure(
            "Schedule was rescheduled but the notice message could not be saved".into(),
        ));
    }

    let message = Message {
        id: message_id,
        sender_id: receiver_id,
        receiver_id: schedule.sender_id,
        content,
        message_type: MESSAGE_TYPE_RESCHEDULE.into(),
        status: "sent".into(),
        reactions: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    };

    let updated = Schedule {
        rescheduled_date: Some(new_date),
        status: "rescheduled".into(),
        ..schedule
    };

    state
        .gateway
        .publish_room(
            &room_address(updated.sender_id, receiver_id),
            &ServerEvent::MessageNew {
                message: message.clone(),
            },
            None,
        )
        .await;

    Ok(Json(serde_json::json!({
        "schedule": updated,
        "message": message,
    })))
}
