use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name of the channel every server is born with; the default landing target.
pub const DEFAULT_CHANNEL: &str = "general";

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub server_id: String,
    pub created_at: DateTime<Utc>,
}
