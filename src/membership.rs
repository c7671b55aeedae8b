use crate::db::Db;
use crate::errors::ApiError;
use crate::models::channel::{Channel, DEFAULT_CHANNEL};
use crate::models::member::Member;
use crate::models::server::{SERVER_COLUMNS, Server};
use chrono::Utc;

fn select_server(where_clause: &str) -> String {
    format!("SELECT {SERVER_COLUMNS} FROM servers WHERE {where_clause}")
}

pub async fn find_server(db: &Db, server_id: &str) -> Result<Option<Server>, ApiError> {
    let server = sqlx::query_as::<_, Server>(&select_server("id = ?"))
        .bind(server_id)
        .fetch_optional(&db.0)
        .await?;
    Ok(server)
}

pub async fn find_member(
    db: &Db,
    server_id: &str,
    profile_id: &str,
) -> Result<Option<Member>, ApiError> {
    let member = sqlx::query_as::<_, Member>(
        "SELECT id, role, profile_id, server_id, created_at FROM members
         WHERE server_id = ? AND profile_id = ?",
    )
    .bind(server_id)
    .bind(profile_id)
    .fetch_optional(&db.0)
    .await?;
    Ok(member)
}

/// First server the profile belongs to, if any. Drives the post-login setup
/// flow: land on an existing server or prompt to create one.
pub async fn find_default_server(db: &Db, profile_id: &str) -> Result<Option<Server>, ApiError> {
    let server = sqlx::query_as::<_, Server>(
        "SELECT s.id, s.name, s.image_url, s.invite_code, s.profile_id, s.created_at, s.updated_at
         FROM servers s
         INNER JOIN members m ON m.server_id = s.id
         WHERE m.profile_id = ?
         ORDER BY s.created_at ASC
         LIMIT 1",
    )
    .bind(profile_id)
    .fetch_optional(&db.0)
    .await?;
    Ok(server)
}

/// Create a server together with its "general" channel and an ADMIN
/// membership for the creator, all in one transaction.
pub async fn create_server(
    db: &Db,
    profile_id: &str,
    name: &str,
    image_url: Option<&str>,
) -> Result<Server, ApiError> {
    let server_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    let mut tx = db.0.begin().await?;
    let res = sqlx::query(
        "INSERT INTO servers(id, name, image_url, invite_code, profile_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&server_id)
    .bind(name)
    .bind(image_url)
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(profile_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await;
    if let Err(e) = res {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.message().contains("UNIQUE") {
                return Err(ApiError::Conflict("invite code already in use".into()));
            }
        }
        return Err(e.into());
    }

    sqlx::query("INSERT INTO channels(id, name, server_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(DEFAULT_CHANNEL)
        .bind(&server_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO members(id, role, profile_id, server_id, created_at) VALUES (?, 'ADMIN', ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(profile_id)
    .bind(&server_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(find_server(db, &server_id).await?.ok_or(ApiError::Internal)?)
}

/// Replace the invite code with a fresh token. Only the owning profile may
/// rotate; every previously distributed link dies the moment this commits.
pub async fn regenerate_invite_code(
    db: &Db,
    server_id: &str,
    profile_id: &str,
) -> Result<Server, ApiError> {
    let server = find_server(db, server_id).await?.ok_or(ApiError::NotFound)?;
    if server.profile_id != profile_id {
        return Err(ApiError::Forbidden);
    }

    // Guarded single-statement write; no lost-update window between the
    // ownership check above and the rotation.
    let res = sqlx::query(
        "UPDATE servers SET invite_code = ?, updated_at = ? WHERE id = ? AND profile_id = ?",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(Utc::now())
    .bind(server_id)
    .bind(profile_id)
    .execute(&db.0)
    .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }

    Ok(find_server(db, server_id).await?.ok_or(ApiError::NotFound)?)
}

/// Redeem an invite code for a profile. Idempotent: a repeat redemption (or a
/// concurrent one) leaves exactly one membership, enforced by the unique
/// (profile_id, server_id) constraint plus conflict-ignore.
pub async fn redeem_invite(db: &Db, invite_code: &str, profile_id: &str) -> Result<Server, ApiError> {
    let server = sqlx::query_as::<_, Server>(&select_server("invite_code = ?"))
        .bind(invite_code)
        .fetch_optional(&db.0)
        .await?
        .ok_or(ApiError::NotFound)?;

    sqlx::query(
        "INSERT INTO members(id, role, profile_id, server_id, created_at)
         VALUES (?, 'GUEST', ?, ?, ?)
         ON CONFLICT(profile_id, server_id) DO NOTHING",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(profile_id)
    .bind(&server.id)
    .bind(Utc::now())
    .execute(&db.0)
    .await?;

    Ok(server)
}

/// The canonical redirect target after joining or opening a server: the
/// oldest channel named "general". Non-members are turned away.
pub async fn resolve_landing_channel(
    db: &Db,
    server_id: &str,
    profile_id: &str,
) -> Result<Channel, ApiError> {
    find_member(db, server_id, profile_id)
        .await?
        .ok_or(ApiError::Forbidden)?;

    let channel = sqlx::query_as::<_, Channel>(
        "SELECT id, name, server_id, created_at FROM channels
         WHERE server_id = ? AND name = ?
         ORDER BY created_at ASC
         LIMIT 1",
    )
    .bind(server_id)
    .bind(DEFAULT_CHANNEL)
    .fetch_optional(&db.0)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(channel)
}
