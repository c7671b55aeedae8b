use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    /// Globally unique and rotatable; rotation kills old links immediately.
    pub invite_code: String,
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const SERVER_COLUMNS: &str =
    "id, name, image_url, invite_code, profile_id, created_at, updated_at";
