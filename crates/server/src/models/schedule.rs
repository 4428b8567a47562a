use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub date: String,
    pub rescheduled_date: Option<String>,
    pub status: String,
}
