use crate::{config::Config, errors::ApiError};
use actix_web::{HttpResponse, http::header, web};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Room-scoped grant embedded in the media token, in the shape the external
/// media service expects.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoGrant {
    pub room: String,
    #[serde(rename = "roomJoin")]
    pub room_join: bool,
    #[serde(rename = "canPublish")]
    pub can_publish: bool,
    #[serde(rename = "canSubscribe")]
    pub can_subscribe: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MediaClaims {
    pub iss: String,
    pub sub: String,
    pub name: String,
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrant,
}

/// Collapse whitespace runs to `_`, then keep only `[A-Za-z0-9_-]`.
pub fn sanitize_identity(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                out.push(c);
            }
        }
    }
    out
}

#[derive(Deserialize)]
pub struct MediaTokenQuery {
    pub room: Option<String>,
    pub username: Option<String>,
}

// Short-lived, room-scoped token for the external media service. Never cached.
pub async fn media_token(
    cfg: web::Data<Config>,
    q: web::Query<MediaTokenQuery>,
) -> Result<HttpResponse, ApiError> {
    let room = q
        .room
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing \"room\" query parameter".into()))?;
    let raw_username = q
        .username
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing \"username\" query parameter".into()))?;

    let (api_key, api_secret) = match (&cfg.media_api_key, &cfg.media_api_secret) {
        (Some(k), Some(s)) => (k, s),
        _ => {
            log::error!("media token requested but media credentials are unconfigured");
            return Err(ApiError::Internal);
        }
    };

    let identity = sanitize_identity(raw_username);
    let now = Utc::now().timestamp();
    let claims = MediaClaims {
        iss: api_key.clone(),
        sub: identity.clone(),
        name: identity,
        nbf: now,
        exp: now + cfg.media_token_ttl_secs,
        video: VideoGrant {
            room: room.to_string(),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
        },
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
    .map_err(|_| ApiError::Internal)?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(serde_json::json!({ "token": token })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode};
    use jsonwebtoken::{DecodingKey, Validation};

    #[test]
    fn identity_sanitization() {
        assert_eq!(sanitize_identity("Alice Smith!"), "Alice_Smith");
        assert_eq!(sanitize_identity("bob"), "bob");
        assert_eq!(sanitize_identity("a  b\tc"), "a_b_c");
        assert_eq!(sanitize_identity("weird/../name"), "weirdname");
    }

    fn cfg() -> Config {
        Config {
            media_api_key: Some("api-key".to_string()),
            media_api_secret: Some("api-secret".to_string()),
            ..Config::default()
        }
    }

    async fn call(cfg: Config, uri: &str) -> actix_web::dev::ServiceResponse {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(cfg))
                .route("/media/token", web::get().to(media_token)),
        )
        .await;
        let req = actix_web::test::TestRequest::get().uri(uri).to_request();
        actix_web::test::call_service(&app, req).await
    }

    #[actix_web::test]
    async fn missing_room_is_a_structured_400() {
        let resp = call(cfg(), "/media/token?username=Alice").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("room"));
    }

    #[actix_web::test]
    async fn unconfigured_credentials_are_a_500() {
        let resp = call(Config::default(), "/media/token?room=general&username=bob").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn token_embeds_sanitized_identity_and_room_grant() {
        let resp = call(cfg(), "/media/token?room=general&username=Alice%20Smith!").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );

        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        let token = body["token"].as_str().unwrap();
        let decoded = jsonwebtoken::decode::<MediaClaims>(
            token,
            &DecodingKey::from_secret(b"api-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap()
        .claims;

        assert_eq!(decoded.sub, "Alice_Smith");
        assert_eq!(decoded.iss, "api-key");
        assert_eq!(decoded.video.room, "general");
        assert!(decoded.video.room_join && decoded.video.can_publish && decoded.video.can_subscribe);
        assert!(decoded.exp > decoded.nbf);
    }
}
