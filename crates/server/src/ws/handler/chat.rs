use crate::error::ApiError;
use crate::models::{AuthUser, Message};
use crate::ws::events::ServerEvent;
use crate::ws::gateway::{room_address, ClientId};
use crate::AppState;

/// Validate and forward a chat message into the sender/receiver room.
///
/// The persisted insert is authoritative; the room publish is best-effort
/// and excludes the originating connection, which gets an `ack` instead.
pub async fn relay_message(
    state: &AppState,
    user: &AuthUser,
    origin: Option<ClientId>,
    receiver_id: Option<i64>,
    content: String,
) -> Result<Message, ApiError> {
    let receiver_id = receiver_id
        .ok_or_else(|| ApiError::Validation("Sender and receiver are required".into()))?;

    amora_shared::validation::validate_message_content(&content).map_err(ApiError::Validation)?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"INSERT INTO messages (id, sender_id, receiver_id, content, message_type, status, reactions, created_at, updated_at)
           VALUES (?, ?, ?, ?, 'text', 'sent', '[]', ?, ?)"#,
    )
    .bind(&id)
    .bind(user.id)
    .bind(receiver_id)
    .bind(&content)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let message = Message {
        id,
        sender_id: user.id,
        receiver_id,
        content,
        message_type: "text".into(),
        status: "sent".into(),
        reactions: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    };

    let room = room_address(user.id, receiver_id);
    let event = ServerEvent::MessageNew {
        message: message.clone(),
    };

    state.gateway.publish_room(&room, &event, origin).await;

    // A connected receiver who hasn't joined the room yet still gets the
    // message on their private address.
    if !state.gateway.is_user_subscribed(receiver_id, &room).await {
        state.gateway.publish_user(receiver_id, &event).await;
    }

    Ok(message)
}

pub async fn handle_send_message(
    state: &AppState,
    client_id: ClientId,
    user: &AuthUser,
    receiver_id: Option<i64>,
    content: String,
) {
    match relay_message(state, user, Some(client_id), receiver_id, content).await {
        Ok(message) => {
            state
                .gateway
                .send_to(
                    client_id,
                    &ServerEvent::Ack {
                        message_id: message.id,
                        created_at: message.created_at,
                    },
                )
                .await;
        }
        Err(e) => {
            super::send_error(state, client_id, e.to_string()).await;
        }
    }
}
