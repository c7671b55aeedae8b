use crate::{auth::AuthUser, config::Config, errors::ApiError};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AssistantReq {
    pub prompt: String,
}

// Stateless text generation proxied upstream; the shared client carries the
// bounded timeout, and failures are reported, never retried.
pub async fn generate(
    cfg: web::Data<Config>,
    http: web::Data<reqwest::Client>,
    _user: AuthUser,
    body: web::Json<AssistantReq>,
) -> Result<HttpResponse, ApiError> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("prompt required".into()));
    }
    let api_key = cfg.assistant_api_key.as_ref().ok_or_else(|| {
        log::error!("assistant requested but assistant_api_key is unconfigured");
        ApiError::Internal
    })?;

    let url = format!(
        "{}/models/{}:generateContent",
        cfg.assistant_endpoint.trim_end_matches('/'),
        cfg.assistant_model,
    );
    let resp = http
        .post(&url)
        .query(&[("key", api_key.as_str())])
        .json(&serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        }))
        .send()
        .await
        .map_err(|e| ApiError::DependencyUnavailable(format!("assistant request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(ApiError::DependencyUnavailable(format!(
            "assistant returned {}",
            resp.status()
        )));
    }
    let payload: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| ApiError::DependencyUnavailable(format!("assistant response unreadable: {e}")))?;

    let reply = payload["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| ApiError::DependencyUnavailable("assistant response missing text".into()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "reply": reply })))
}
