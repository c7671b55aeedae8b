use crate::{attachments, auth::AuthUser, errors::ApiError};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct KindQuery {
    pub url: String,
}

// Rendering hint for the chat UI.
pub async fn attachment_kind(
    http: web::Data<reqwest::Client>,
    _user: AuthUser,
    q: web::Query<KindQuery>,
) -> Result<HttpResponse, ApiError> {
    let url = q.url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("url required".into()));
    }
    let kind = attachments::classify_url(&http, url).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "url": url,
        "kind": kind,
    })))
}
