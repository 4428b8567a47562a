use super::{ClientId, GatewayState};
use crate::ws::events::ServerEvent;

/// Fabric publish paths. Delivery is best-effort, at-most-once per
/// connection: sends go into each client's unbounded outbox and never
/// block the request path; a closed receiver is a dropped event.
impl GatewayState {
    pub async fn publish_room(&self, room: &str, event: &ServerEvent, exclude: Option<ClientId>) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let subs = self.room_subs.read().await;
        let clients = self.clients.read().await;

        if let Some(subscriber_ids) = subs.get(room) {
            for &cid in subscriber_ids {
                if Some(cid) == exclude {
                    continue;
                }
                if let Some(client) = clients.get(&cid) {
                    if client.tx.send(msg.clone()).is_err() {
                        tracing::warn!("dropped fabric event for client {}", cid);
                    }
                }
            }
        }
    }

    /// Private-address path: deliver to every live connection of one user.
    pub async fn publish_user(&self, user_id: i64, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let clients = self.clients.read().await;
        for (cid, client) in clients.iter() {
            if client.user_id == user_id && client.tx.send(msg.clone()).is_err() {
                tracing::warn!("dropped fabric event for client {}", cid);
            }
        }
    }

    pub async fn broadcast_all(&self, event: &ServerEvent, exclude: Option<ClientId>) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let clients = self.clients.read().await;
        for (&cid, client) in clients.iter() {
            if Some(cid) == exclude {
                continue;
            }
            let _ = client.tx.send(msg.clone());
        }
    }

    pub async fn send_to(&self, client_id: ClientId, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let clients = self.clients.read().await;
        if let Some(client) = clients.get(&client_id) {
            let _ = client.tx.send(msg);
        }
    }
}
