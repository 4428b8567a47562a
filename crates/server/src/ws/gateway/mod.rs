mod publish;

use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, RwLock};

pub type ClientId = u64;

/// Canonical room address for the unordered pair of user ids. Both
/// participants compute the same address regardless of who initiates.
pub fn room_address(a: i64, b: i64) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{}-{}", lo, hi)
}

pub struct ConnectedClient {
    pub user_id: i64,
    pub username: String,
    pub tx: mpsc::UnboundedSender<String>,
    pub subscribed_rooms: HashSet<String>,
}

/// Process-wide connection registry backing both fabric address kinds:
/// room addresses (pair channels) and private addresses (per-user fan-out).
/// Held behind an Arc in AppState so tests can stand up their own instance.
pub struct GatewayState {
    next_id: RwLock<u64>,
    pub clients: RwLock<HashMap<ClientId, ConnectedClient>>,
    pub room_subs: RwLock<HashMap<String, HashSet<ClientId>>>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayState {
    pub fn new() -> Self {
        Self {
            next_id: RwLock::new(1),
            clients: RwLock::new(HashMap::new()),
            room_subs: RwLock::new(HashMap::new()),
        }
    }

    pub async fn next_client_id(&self) -> ClientId {
        let mut id = self.next_id.write().await;
        let current = *id;
        *id += 1;
        current
    }

    pub async fn register(
        &self,
        client_id: ClientId,
        user_id: i64,
        username: String,
        tx: mpsc::UnboundedSender<String>,
    ) {
        let client = ConnectedClient {
            user_id,
            username,
            tx,
            subscribed_rooms: HashSet::new(),
        };
        self.clients.write().await.insert(client_id, client);
    }

    pub async fn unregister(&self, client_id: ClientId) -> Option<ConnectedClient> {
        let client = self.clients.write().await.remove(&client_id)?;

        let mut subs = self.room_subs.write().await;
        for room in &client.subscribed_rooms {
            if let Some(set) = subs.get_mut(room) {
                set.remove(&client_id);
                if set.is_empty() {
                    subs.remove(room);
                }
            }
        }

        Some(client)
    }

    pub async fn subscribe_room(&self, client_id: ClientId, room: &str) {
        self.room_subs
            .write()
            .await
            .entry(room.to_string())
            .or_default()
            .insert(client_id);

        if let Some(client) = self.clients.write().await.get_mut(&client_id) {
            client.subscribed_rooms.insert(room.to_string());
        }
    }

    pub async fn unsubscribe_room(&self, client_id: ClientId, room: &str) {
        let mut subs = self.room_subs.write().await;
        if let Some(set) = subs.get_mut(room) {
            set.remove(&client_id);
            if set.is_empty() {
                subs.remove(room);
            }
        }

        if let Some(client) = self.clients.write().await.get_mut(&client_id) {
            client.subscribed_rooms.remove(room);
        }
    }

    pub async fn is_user_subscribed(&self, user_id: i64, room: &str) -> bool {
        let subs = self.room_subs.read().await;
        let clients = self.clients.read().await;
        if let Some(subscriber_ids) = subs.get(room) {
            for &cid in subscriber_ids {
                if let Some(client) = clients.get(&cid) {
                    if client.user_id == user_id {
                        return true;
                    }
                }
            }
        }
        false
    }
}
