use serde::{Deserialize, Serialize};

/// One user's reaction on a message. `username` is a display-name snapshot
/// taken at write time; it is not refreshed if the user later renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: i64,
    pub emoji: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub message_type: String,
    pub status: String,
    pub reactions: Vec<Reaction>,
    pub created_at: String,
    pub updated_at: String,
}

/// Raw messages row. `reactions` is the JSON column as stored; `revision`
/// is the compare-and-set token guarding reaction updates and never leaves
/// the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRow {
    pub id: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub message_type: String,
    pub status: String,
    pub reactions: String,
    pub revision: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl MessageRow {
    pub fn parse_reactions(&self) -> Vec<Reaction> {
        serde_json::from_str(&self.reactions).unwrap_or_default()
    }

    pub fn into_message(self) -> Message {
        let reactions = self.parse_reactions();
        Message {
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            message_type: self.message_type,
            status: self.status,
            reactions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
