use serde::{Deserialize, Serialize};

/// `status` moves ringing -> ongoing (accepted) or ringing -> declined;
/// declined and ended are terminal.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: String,
    pub caller_id: i64,
    pub receiver_id: i64,
    pub status: String,
    pub started_at: String,
    pub ended_at: Option<String>,
}
