use crate::config::Config;
use crate::db::Db;
use crate::errors::ApiError;
use crate::models::profile::Profile;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::Utc;
use futures_util::future::{Ready, err, ok};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Access-token claims as issued by the external identity provider.
/// Besides the subject they carry the profile fields we mirror locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub exp: usize,
}

pub fn verify_access_token(token: &str, cfg: &Config) -> Result<Claims, ApiError> {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(cfg.auth_secret_bytes()), &v)
        .map(|data| data.claims)
        .map_err(|_| ApiError::Unauthorized)
}

/// The authenticated identity of the caller, straight from the token.
/// Routes that need the local mirror row call [`current_profile`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub name: String,
    pub image_url: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let cfg = req.app_data::<actix_web::web::Data<Config>>().unwrap();
        if let Some(h) = req.headers().get("Authorization") {
            if let Ok(s) = h.to_str() {
                if let Some(token) = s.strip_prefix("Bearer ") {
                    if let Ok(claims) = verify_access_token(token, cfg) {
                        return ok(AuthUser {
                            user_id: claims.sub,
                            name: claims.name,
                            image_url: claims.image_url,
                        });
                    }
                }
            }
        }
        err(ApiError::Unauthorized)
    }
}

/// Resolve the local profile mirror for the caller, creating it on first
/// sight and syncing name/image from the provider claims on every sighting.
pub async fn current_profile(db: &Db, user: &AuthUser) -> Result<Profile, ApiError> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO profiles(id, user_id, name, image_url, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(user_id) DO UPDATE SET
             name = excluded.name,
             image_url = excluded.image_url,
             updated_at = excluded.updated_at",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&user.user_id)
    .bind(&user.name)
    .bind(&user.image_url)
    .bind(now)
    .bind(now)
    .execute(&db.0)
    .await?;

    let profile = sqlx::query_as::<_, Profile>(
        "SELECT id, user_id, name, image_url, created_at, updated_at FROM profiles WHERE user_id = ?",
    )
    .bind(&user.user_id)
    .fetch_one(&db.0)
    .await?;
    Ok(profile)
}
