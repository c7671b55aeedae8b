use crate::{
    auth::{self, AuthUser},
    db::Db,
    errors::ApiError,
    membership,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateServerReq {
    pub name: String,
    pub image_url: Option<String>,
}

pub async fn create_server(
    db: web::Data<Db>,
    user: AuthUser,
    body: web::Json<CreateServerReq>,
) -> Result<HttpResponse, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("server name required".into()));
    }
    let profile = auth::current_profile(&db, &user).await?;
    let server = membership::create_server(&db, &profile.id, name, body.image_url.as_deref()).await?;
    Ok(HttpResponse::Ok().json(server))
}

pub async fn get_server(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let server_id = path.into_inner();
    let profile = auth::current_profile(&db, &user).await?;
    // Non-members see nothing, not even that the server exists.
    let member = membership::find_member(&db, &server_id, &profile.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let server = membership::find_server(&db, &server_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "server": server,
        "role": member.role,
    })))
}

// Owner-only rotation; returns the full server, new code included.
pub async fn regenerate_invite_code(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let server_id = path.into_inner();
    if server_id.trim().is_empty() {
        return Err(ApiError::BadRequest("server id missing".into()));
    }
    let profile = auth::current_profile(&db, &user).await?;
    let server = membership::regenerate_invite_code(&db, &server_id, &profile.id).await?;
    Ok(HttpResponse::Ok().json(server))
}

// Where the client should go after joining or opening a server.
pub async fn landing(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let server_id = path.into_inner();
    let profile = auth::current_profile(&db, &user).await?;
    let channel = membership::resolve_landing_channel(&db, &server_id, &profile.id).await?;
    let redirect = format!("/servers/{}/channels/{}", channel.server_id, channel.id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "channel": channel,
        "redirect": redirect,
    })))
}
