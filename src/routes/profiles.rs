use crate::{
    auth::{self, AuthUser},
    db::Db,
    errors::ApiError,
    membership,
};
use actix_web::{HttpResponse, web};

pub async fn me(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let profile = auth::current_profile(&db, &user).await?;
    Ok(HttpResponse::Ok().json(profile))
}

// First-contact landing: mirror the profile, then point the client at an
// existing server or leave it to the create flow.
pub async fn setup(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let profile = auth::current_profile(&db, &user).await?;
    let body = match membership::find_default_server(&db, &profile.id).await? {
        Some(server) => {
            let landing = format!("/servers/{}", server.id);
            serde_json::json!({ "server": server, "landing": landing })
        }
        None => serde_json::json!({ "server": null, "landing": null }),
    };
    Ok(HttpResponse::Ok().json(body))
}
