use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Guest,
    Moderator,
    Admin,
}

impl MemberRole {
    /// Moderation rights cover deleting other members' messages, never editing them.
    pub fn can_moderate(self) -> bool {
        matches!(self, MemberRole::Admin | MemberRole::Moderator)
    }
}

/// A profile's role-scoped participation in a server.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Member {
    pub id: String,
    pub role: MemberRole,
    pub profile_id: String,
    pub server_id: String,
    pub created_at: DateTime<Utc>,
}
