use crate::{
    auth::{self, AuthUser},
    db::Db,
    errors::ApiError,
    membership,
};
use actix_web::{HttpResponse, web};

// Idempotent: an existing member gets the same server back, no new row.
pub async fn redeem(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    if code.trim().is_empty() {
        return Err(ApiError::BadRequest("invite code missing".into()));
    }
    let profile = auth::current_profile(&db, &user).await?;
    let server = membership::redeem_invite(&db, &code, &profile.id).await?;
    let landing = format!("/servers/{}", server.id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "server": server,
        "landing": landing,
    })))
}
