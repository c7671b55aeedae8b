use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub file_url: Option<String>,
    pub channel_id: String,
    pub member_id: String,
    pub deleted: bool,
    pub is_updated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const MESSAGE_COLUMNS: &str =
    "id, content, file_url, channel_id, member_id, deleted, is_updated, created_at, updated_at";
