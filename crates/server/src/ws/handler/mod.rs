mod chat;
mod lifecycle;
mod reactions;

pub use chat::relay_message;
pub use reactions::set_reaction;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::middleware::auth::{resolve_token, token_from_headers};
use crate::models::AuthUser;
use crate::ws::events::{ClientEvent, ServerEvent};
use crate::ws::gateway::{room_address, ClientId};
use crate::AppState;

/// WebSocket upgrade handler; this endpoint is the fabric's subscribe
/// surface for connected clients.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    query: axum::extract::Query<std::collections::HashMap<String, String>>,
    headers: axum::http::HeaderMap,
) -> impl IntoResponse {
    let auth_user = extract_session(&state, &headers, &query).await;
    ws.on_upgrade(move |socket| handle_socket(socket, state, auth_user))
}

async fn extract_session(
    state: &AppState,
    headers: &axum::http::HeaderMap,
    query: &std::collections::HashMap<String, String>,
) -> Option<AuthUser> {
    let token = query
        .get("token")
        .cloned()
        .or_else(|| token_from_headers(headers))?;

    if token.is_empty() {
        return None;
    }

    resolve_token(state, &token).await
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, auth_user: Option<AuthUser>) {
    let user = match auth_user {
        Some(u) => u,
        None => return,
    };

    let client_id = state.gateway.next_client_id().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state
        .gateway
        .register(client_id, user.id, user.username.clone(), tx)
        .await;

    lifecycle::handle_connect(&state, &user).await;

    // Task to forward messages from mpsc to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive loop
    let state_clone = state.clone();
    let user_clone = user.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => {
                    let text_str: &str = &text;
                    if let Ok(event) = serde_json::from_str::<ClientEvent>(text_str) {
                        handle_client_event(&state_clone, client_id, &user_clone, event).await;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    lifecycle::handle_disconnect(&state, client_id, &user).await;
}

async fn handle_client_event(
    state: &AppState,
    client_id: ClientId,
    user: &AuthUser,
    event: ClientEvent,
) {
    match event {
        ClientEvent::JoinRoom { peer_id } => {
            let room = room_address(user.id, peer_id);
            state.gateway.subscribe_room(client_id, &room).await;
        }
        ClientEvent::LeaveRoom { peer_id } => {
            let room = room_address(user.id, peer_id);
            state.gateway.unsubscribe_room(client_id, &room).await;
        }
        ClientEvent::SendMessage {
            receiver_id,
            content,
        } => {
            chat::handle_send_message(state, client_id, user, receiver_id, content).await;
        }
        ClientEvent::SetReaction { message_id, emoji } => {
            reactions::handle_set_reaction(state, client_id, user, &message_id, &emoji).await;
        }
        ClientEvent::Ping => {}
    }
}

/// Report a component failure back to the originating connection only.
pub(crate) async fn send_error(state: &AppState, client_id: ClientId, message: String) {
    state
        .gateway
        .send_to(client_id, &ServerEvent::Error { message })
        .await;
}
