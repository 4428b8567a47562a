use crate::error::ApiError;
use crate::models::{AuthUser, MessageRow, Reaction};
use crate::ws::events::ServerEvent;
use crate::ws::gateway::{room_address, ClientId};
use crate::AppState;

/// Toggle or replace one user's reaction on a message and re-broadcast the
/// full list to the message's room.
///
/// The read-modify-write runs under an optimistic compare-and-set on the
/// row's revision counter, so two concurrent reactions on the same message
/// never lose a write. Different messages proceed fully in parallel.
pub async fn set_reaction(
    state: &AppState,
    user: &AuthUser,
    message_id: &str,
    emoji: &str,
) -> Result<(Vec<Reaction>, String), ApiError> {
    amora_shared::validation::validate_emoji(emoji).map_err(ApiError::Validation)?;

    for _ in 0..state.config.reaction_retry_max {
        let row = sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = ?")
            .bind(message_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Message not found".into()))?;

        let mut reactions = row.parse_reactions();

        let existing = reactions.iter().position(|r| r.user_id == user.id);
        match existing {
            // Same emoji again: toggle off.
            Some(i) if reactions[i].emoji == emoji => {
                reactions.remove(i);
            }
            // Replace or append, keeping list order stable for display.
            Some(i) => {
                reactions.remove(i);
                reactions.push(Reaction {
                    user_id: user.id,
                    emoji: emoji.to_string(),
                    username: user.username.clone(),
                });
            }
            None => {
                reactions.push(Reaction {
                    user_id: user.id,
                    emoji: emoji.to_string(),
                    username: user.username.clone(),
                });
            }
        }

        let serialized = serde_json::to_string(&reactions)
            .map_err(|e| ApiError::Downstream(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"UPDATE messages
               SET reactions = ?, updated_at = ?, revision = revision + 1
               WHERE id = ? AND revision = ?"#,
        )
        .bind(&serialized)
        .bind(&now)
        .bind(message_id)
        .bind(row.revision)
        .execute(&state.db)
        .await?;

        if result.rows_affected() == 0 {
            // Lost the CAS race; re-read and try again.
            continue;
        }

        let room = room_address(row.sender_id, row.receiver_id);
        state
            .gateway
            .publish_room(
                &room,
                &ServerEvent::MessageReaction {
                    message_id: message_id.to_string(),
                    reactions: reactions.clone(),
                    updated_at: now.clone(),
                },
                None,
            )
            .await;

        return Ok((reactions, now));
    }

    Err(ApiError::Downstream(
        "Reaction update kept conflicting, try again".into(),
    ))
}

pub async fn handle_set_reaction(
    state: &AppState,
    client_id: ClientId,
    user: &AuthUser,
    message_id: &str,
    emoji: &str,
) {
    if let Err(e) = set_reaction(state, user, message_id, emoji).await {
        super::send_error(state, client_id, e.to_string()).await;
    }
}
