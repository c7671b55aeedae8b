use crate::{
    auth::{self, AuthUser},
    db::Db,
    errors::ApiError,
    fanout::Fanout,
    membership, moderation,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

// Server/channel context the chat UI sends alongside per-message calls; the
// acting member is resolved from it server-side, whatever the UI allowed.
#[derive(Deserialize)]
pub struct MessageCtx {
    #[serde(rename = "serverId")]
    pub server_id: String,
    #[serde(rename = "channelId")]
    pub channel_id: String,
}

#[derive(Deserialize)]
pub struct EditMessageReq {
    pub content: String,
}

pub async fn edit_message(
    db: web::Data<Db>,
    fanout: web::Data<Fanout>,
    user: AuthUser,
    path: web::Path<String>,
    ctx: web::Query<MessageCtx>,
    body: web::Json<EditMessageReq>,
) -> Result<HttpResponse, ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("content required".into()));
    }

    let message_id = path.into_inner();
    let profile = auth::current_profile(&db, &user).await?;
    let member = membership::find_member(&db, &ctx.server_id, &profile.id)
        .await?
        .ok_or(ApiError::Forbidden)?;

    let message = moderation::edit_message(&db, &message_id, &ctx.channel_id, &member, content).await?;

    fanout.publish(serde_json::json!({
        "type": "message_edited",
        "id": message.id,
        "channel_id": message.channel_id,
        "content": message.content,
        "is_updated": message.is_updated,
        "updated_at": message.updated_at,
    }));

    Ok(HttpResponse::Ok().json(message))
}

pub async fn delete_message(
    db: web::Data<Db>,
    fanout: web::Data<Fanout>,
    user: AuthUser,
    path: web::Path<String>,
    ctx: web::Query<MessageCtx>,
) -> Result<HttpResponse, ApiError> {
    let message_id = path.into_inner();
    let profile = auth::current_profile(&db, &user).await?;
    let member = membership::find_member(&db, &ctx.server_id, &profile.id)
        .await?
        .ok_or(ApiError::Forbidden)?;

    let message = moderation::delete_message(&db, &message_id, &ctx.channel_id, &member).await?;

    fanout.publish(serde_json::json!({
        "type": "message_deleted",
        "id": message.id,
        "channel_id": message.channel_id,
        "content": message.content,
        "updated_at": message.updated_at,
    }));

    Ok(HttpResponse::Ok().json(message))
}
