use crate::{
    auth::{self, AuthUser},
    db::Db,
    errors::ApiError,
    fanout::Fanout,
    membership,
    models::channel::Channel,
};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use sqlx::Row;

async fn load_channel(db: &Db, channel_id: &str) -> Result<Channel, ApiError> {
    let channel = sqlx::query_as::<_, Channel>(
        "SELECT id, name, server_id, created_at FROM channels WHERE id = ?",
    )
    .bind(channel_id)
    .fetch_optional(&db.0)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(channel)
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub before: Option<String>,
    pub limit: Option<i64>,
}

// Newest-first page of a channel's history. The cursor is keyed on
// (created_at, id) so rows sharing the cursor's timestamp are not skipped,
// and an unknown cursor id is a client error, not a reset to the newest page.
async fn page_messages(
    db: &Db,
    channel_id: &str,
    before: Option<&str>,
    limit: i64,
) -> Result<Vec<serde_json::Value>, ApiError> {
    let limit = limit.clamp(1, 200);
    let rows = if let Some(before_id) = before {
        let ref_row = sqlx::query("SELECT created_at FROM messages WHERE id = ? AND channel_id = ?")
            .bind(before_id)
            .bind(channel_id)
            .fetch_optional(&db.0)
            .await?
            .ok_or(ApiError::NotFound)?;
        let ts: chrono::DateTime<chrono::Utc> = ref_row.get("created_at");
        sqlx::query(
            "SELECT m.id, m.content, m.file_url, m.channel_id, m.member_id, m.deleted, m.is_updated,
                    m.created_at, m.updated_at, mb.role, p.name, p.image_url
             FROM messages m
             INNER JOIN members mb ON mb.id = m.member_id
             INNER JOIN profiles p ON p.id = mb.profile_id
             WHERE m.channel_id = ?
               AND (m.created_at < ? OR (m.created_at = ? AND m.id < ?))
             ORDER BY m.created_at DESC, m.id DESC LIMIT ?",
        )
        .bind(channel_id)
        .bind(ts)
        .bind(ts)
        .bind(before_id)
        .bind(limit)
        .fetch_all(&db.0)
        .await?
    } else {
        sqlx::query(
            "SELECT m.id, m.content, m.file_url, m.channel_id, m.member_id, m.deleted, m.is_updated,
                    m.created_at, m.updated_at, mb.role, p.name, p.image_url
             FROM messages m
             INNER JOIN members mb ON mb.id = m.member_id
             INNER JOIN profiles p ON p.id = mb.profile_id
             WHERE m.channel_id = ?
             ORDER BY m.created_at DESC, m.id DESC LIMIT ?",
        )
        .bind(channel_id)
        .bind(limit)
        .fetch_all(&db.0)
        .await?
    };

    let msgs = rows
        .into_iter()
        .map(|r| {
            serde_json::json!({
                "id": r.get::<String, _>("id"),
                "channel_id": r.get::<String, _>("channel_id"),
                "member_id": r.get::<String, _>("member_id"),
                "content": r.get::<String, _>("content"),
                "file_url": r.get::<Option<String>, _>("file_url"),
                "deleted": r.get::<bool, _>("deleted"),
                "is_updated": r.get::<bool, _>("is_updated"),
                "created_at": r.get::<chrono::DateTime<chrono::Utc>, _>("created_at"),
                "updated_at": r.get::<chrono::DateTime<chrono::Utc>, _>("updated_at"),
                "member": {
                    "role": r.get::<String, _>("role"),
                    "name": r.get::<String, _>("name"),
                    "image_url": r.get::<Option<String>, _>("image_url"),
                },
            })
        })
        .collect();
    Ok(msgs)
}

// Deleted messages stay in the stream as tombstones.
pub async fn list_messages(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    q: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let channel_id = path.into_inner();
    let profile = auth::current_profile(&db, &user).await?;
    let channel = load_channel(&db, &channel_id).await?;
    membership::find_member(&db, &channel.server_id, &profile.id)
        .await?
        .ok_or(ApiError::Forbidden)?;

    let msgs = page_messages(&db, &channel_id, q.before.as_deref(), q.limit.unwrap_or(50)).await?;
    Ok(HttpResponse::Ok().json(msgs))
}

#[derive(Deserialize)]
pub struct PostMessageReq {
    pub content: Option<String>,
    pub file_url: Option<String>,
}

pub async fn post_message(
    db: web::Data<Db>,
    fanout: web::Data<Fanout>,
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<PostMessageReq>,
) -> Result<HttpResponse, ApiError> {
    let channel_id = path.into_inner();
    let profile = auth::current_profile(&db, &user).await?;
    let channel = load_channel(&db, &channel_id).await?;
    let member = membership::find_member(&db, &channel.server_id, &profile.id)
        .await?
        .ok_or(ApiError::Forbidden)?;

    let text = body.content.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let file_url = body.file_url.as_deref().map(str::trim).filter(|s| !s.is_empty());
    // File-only messages carry the URL as their content.
    let content = match (text, file_url) {
        (Some(t), _) => t.to_string(),
        (None, Some(f)) => f.to_string(),
        (None, None) => {
            return Err(ApiError::BadRequest("message must have content or file".into()));
        }
    };

    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO messages(id, content, file_url, channel_id, member_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&content)
    .bind(file_url)
    .bind(&channel_id)
    .bind(&member.id)
    .bind(now)
    .bind(now)
    .execute(&db.0)
    .await?;

    fanout.publish(serde_json::json!({
        "type": "message_created",
        "id": id,
        "channel_id": channel_id,
        "member_id": member.id,
        "content": content,
        "file_url": file_url,
        "created_at": now,
    }));

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
