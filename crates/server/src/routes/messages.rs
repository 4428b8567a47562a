use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{AuthUser, MessageRow};
use crate::ws::gateway::room_address;
use crate::AppState;

#[derive(Deserialize)]
pub struct MessageQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/messages/:peerId
///
/// Conversation history between the authed user and one peer, newest
/// first with cursor pagination. Missed fabric events are recovered here,
/// not replayed by the gateway.
pub async fn list_conversation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(peer_id): Path<i64>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(amora_shared::constants::MESSAGE_PAGE_SIZE)
        .min(100);

    let rows = if let Some(cursor) = &query.cursor {
        sqlx::query_as::<_, MessageRow>(
            r#"SELECT * FROM messages
               WHERE ((sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?))
                 AND created_at < ?
               ORDER BY created_at DESC LIMIT ?"#,
        )
        .bind(user.id)
        .bind(peer_id)
        .bind(peer_id)
        .bind(user.id)
        .bind(cursor)
        .bind(limit + 1)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as::<_, MessageRow>(
            r#"SELECT * FROM messages
               WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)
               ORDER BY created_at DESC LIMIT ?"#,
        )
        .bind(user.id)
        .bind(peer_id)
        .bind(peer_id)
        .bind(user.id)
        .bind(limit + 1)
        .fetch_all(&state.db)
        .await?
    };

    let has_more = rows.len() as i64 > limit;
    let mut rows = rows;
    if has_more {
        rows.pop();
    }
    rows.reverse(); // chronological order

    let cursor = rows.first().map(|m| m.created_at.clone());
    let items: Vec<_> = rows.into_iter().map(MessageRow::into_message).collect();

    Ok(Json(serde_json::json!({
        "room": room_address(user.id, peer_id),
        "items": items,
        "cursor": cursor,
        "hasMore": has_more,
    })))
}
