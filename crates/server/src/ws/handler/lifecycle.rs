use crate::models::AuthUser;
use crate::routes::presence::touch_last_active;
use crate::ws::events::ServerEvent;
use crate::ws::gateway::ClientId;
use crate::AppState;

pub async fn handle_connect(state: &AppState, user: &AuthUser) {
    let last_active = match touch_last_active(&state.db, user.id).await {
        Ok(t) => Some(t.to_rfc3339()),
        Err(e) => {
            tracing::warn!("presence touch on connect failed for {}: {}", user.id, e);
            None
        }
    };

    state
        .gateway
        .broadcast_all(
            &ServerEvent::Presence {
                user_id: user.id,
                online: true,
                last_active,
            },
            None,
        )
        .await;
}

pub async fn handle_disconnect(state: &AppState, client_id: ClientId, user: &AuthUser) {
    state.gateway.unregister(client_id).await;

    let last_active = touch_last_active(&state.db, user.id)
        .await
        .ok()
        .map(|t| t.to_rfc3339());

    state
        .gateway
        .broadcast_all(
            &ServerEvent::Presence {
                user_id: user.id,
                online: false,
                last_active,
            },
            None,
        )
        .await;
}
