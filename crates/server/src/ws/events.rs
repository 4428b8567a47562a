use serde::{Deserialize, Serialize};

use crate::models::{Call, Message, Reaction};

// ── Server → Client Events ──

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A chat message entered the room, including system-authored notices.
    #[serde(rename = "message:new")]
    MessageNew { message: Message },
    /// Delivery acknowledgement, sent to the originating connection only.
    #[serde(rename = "ack")]
    Ack {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(rename = "createdAt")]
        created_at: String,
    },
    /// Full replacement of a message's reaction list.
    #[serde(rename = "message:reaction")]
    MessageReaction {
        #[serde(rename = "messageId")]
        message_id: String,
        reactions: Vec<Reaction>,
        #[serde(rename = "updatedAt")]
        updated_at: String,
    },
    #[serde(rename = "incoming-call")]
    IncomingCall {
        call: Call,
        #[serde(rename = "callerUsername")]
        caller_username: String,
    },
    #[serde(rename = "call-response")]
    CallResponse {
        #[serde(rename = "receiverId")]
        receiver_id: i64,
        response: String,
    },
    #[serde(rename = "presence")]
    Presence {
        #[serde(rename = "userId")]
        user_id: i64,
        online: bool,
        #[serde(rename = "lastActive", skip_serializing_if = "Option::is_none")]
        last_active: Option<String>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

// ── Client → Server Events ──

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    SendMessage {
        #[serde(rename = "receiverId")]
        receiver_id: Option<i64>,
        content: String,
    },
    SetReaction {
        #[serde(rename = "messageId")]
        message_id: String,
        emoji: String,
    },
    JoinRoom {
        #[serde(rename = "peerId")]
        peer_id: i64,
    },
    LeaveRoom {
        #[serde(rename = "peerId")]
        peer_id: i64,
    },
    Ping,
}
