use crate::db::Db;
use crate::errors::ApiError;
use crate::models::member::Member;
use crate::models::message::{MESSAGE_COLUMNS, Message};
use crate::permissions;
use chrono::Utc;

/// Placeholder content left behind by a delete. Deletion is irreversible.
pub const TOMBSTONE: &str = "This message has been deleted.";

async fn load_message(
    tx: &mut sqlx::SqliteConnection,
    message_id: &str,
    channel_id: &str,
    server_id: &str,
) -> Result<Message, ApiError> {
    // The channel must belong to the acting member's server, otherwise a role
    // held elsewhere could be replayed against this message.
    let channel: Option<(String,)> =
        sqlx::query_as("SELECT id FROM channels WHERE id = ? AND server_id = ?")
            .bind(channel_id)
            .bind(server_id)
            .fetch_optional(&mut *tx)
            .await?;
    channel.ok_or(ApiError::NotFound)?;

    let query = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ? AND channel_id = ?");
    let message = sqlx::query_as::<_, Message>(&query)
        .bind(message_id)
        .bind(channel_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(message)
}

/// Edit a message's text. The permission predicate is evaluated against the
/// row state read inside the same transaction that writes, and the write is
/// additionally guarded on `deleted = 0`, so a concurrent delete cannot slip
/// between check and mutation.
pub async fn edit_message(
    db: &Db,
    message_id: &str,
    channel_id: &str,
    acting: &Member,
    content: &str,
) -> Result<Message, ApiError> {
    let mut tx = db.0.begin().await?;
    let mut message = load_message(&mut tx, message_id, channel_id, &acting.server_id).await?;
    if !permissions::can_edit(&message, acting) {
        return Err(ApiError::Forbidden);
    }

    let now = Utc::now();
    let res = sqlx::query(
        "UPDATE messages SET content = ?, is_updated = 1, updated_at = ? WHERE id = ? AND deleted = 0",
    )
    .bind(content)
    .bind(now)
    .bind(message_id)
    .execute(&mut *tx)
    .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::Forbidden);
    }
    tx.commit().await?;

    message.content = content.to_string();
    message.is_updated = true;
    message.updated_at = now;
    Ok(message)
}

/// Delete a message: content becomes the tombstone, the attachment reference
/// is dropped, and the state is terminal. There is no undelete.
pub async fn delete_message(
    db: &Db,
    message_id: &str,
    channel_id: &str,
    acting: &Member,
) -> Result<Message, ApiError> {
    let mut tx = db.0.begin().await?;
    let mut message = load_message(&mut tx, message_id, channel_id, &acting.server_id).await?;
    if !permissions::can_delete(&message, acting) {
        return Err(ApiError::Forbidden);
    }

    let now = Utc::now();
    let res = sqlx::query(
        "UPDATE messages SET deleted = 1, content = ?, file_url = NULL, updated_at = ? WHERE id = ? AND deleted = 0",
    )
    .bind(TOMBSTONE)
    .bind(now)
    .bind(message_id)
    .execute(&mut *tx)
    .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::Forbidden);
    }
    tx.commit().await?;

    message.deleted = true;
    message.content = TOMBSTONE.to_string();
    message.file_url = None;
    message.updated_at = now;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;
    use crate::membership::{self, tests::mk_profile};
    use crate::models::channel::Channel;
    use crate::models::member::MemberRole;
    use crate::models::server::Server;

    async fn insert_message(
        db: &Db,
        channel_id: &str,
        member_id: &str,
        content: &str,
        file_url: Option<&str>,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO messages(id, content, file_url, channel_id, member_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(content)
        .bind(file_url)
        .bind(channel_id)
        .bind(member_id)
        .bind(now)
        .bind(now)
        .execute(&db.0)
        .await
        .unwrap();
        id
    }

    async fn fetch_message(db: &Db, id: &str) -> Message {
        let query = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_one(&db.0)
            .await
            .unwrap()
    }

    async fn set_role(db: &Db, member_id: &str, role: &str) {
        sqlx::query("UPDATE members SET role = ? WHERE id = ?")
            .bind(role)
            .bind(member_id)
            .execute(&db.0)
            .await
            .unwrap();
    }

    struct Fixture {
        db: Db,
        _dir: tempfile::TempDir,
        server: Server,
        channel: Channel,
        author: Member,
        other: Member,
    }

    async fn fixture() -> Fixture {
        let (db, _dir) = test_db().await;
        let owner = mk_profile(&db, "owner").await;
        let joiner = mk_profile(&db, "joiner").await;
        let server = membership::create_server(&db, &owner, "s", None).await.unwrap();
        membership::redeem_invite(&db, &server.invite_code, &joiner).await.unwrap();

        let channel = membership::resolve_landing_channel(&db, &server.id, &owner).await.unwrap();
        // The joining guest authors the messages under test; the owner is the
        // admin-side actor.
        let author = membership::find_member(&db, &server.id, &joiner).await.unwrap().unwrap();
        let other = membership::find_member(&db, &server.id, &owner).await.unwrap().unwrap();
        Fixture { db, _dir, server, channel, author, other }
    }

    #[actix_web::test]
    async fn author_edit_updates_content_and_flags() {
        let f = fixture().await;
        let id = insert_message(&f.db, &f.channel.id, &f.author.id, "hi", None).await;

        let edited = edit_message(&f.db, &id, &f.channel.id, &f.author, "hi there").await.unwrap();
        assert_eq!(edited.content, "hi there");
        assert!(edited.is_updated);
        assert!(edited.file_url.is_none());

        let row = fetch_message(&f.db, &id).await;
        assert_eq!(row.content, "hi there");
        assert!(row.is_updated);
        assert!(!row.deleted);
    }

    #[actix_web::test]
    async fn non_author_edit_is_forbidden_and_leaves_row_unchanged() {
        let f = fixture().await;
        let id = insert_message(&f.db, &f.channel.id, &f.author.id, "hi", None).await;

        // The other member is an admin; even admins may not edit.
        assert_eq!(f.other.role, MemberRole::Admin);
        let err = edit_message(&f.db, &id, &f.channel.id, &f.other, "hijack").await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        let row = fetch_message(&f.db, &id).await;
        assert_eq!(row.content, "hi");
        assert!(!row.is_updated);
    }

    #[actix_web::test]
    async fn file_messages_cannot_be_edited_even_by_the_author() {
        let f = fixture().await;
        let id = insert_message(
            &f.db,
            &f.channel.id,
            &f.author.id,
            "https://files.example/a.pdf",
            Some("https://files.example/a.pdf"),
        )
        .await;

        let err = edit_message(&f.db, &id, &f.channel.id, &f.author, "x").await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[actix_web::test]
    async fn delete_tombstones_and_clears_the_attachment() {
        let f = fixture().await;
        let id = insert_message(
            &f.db,
            &f.channel.id,
            &f.author.id,
            "see attachment",
            Some("https://files.example/a.png"),
        )
        .await;

        let deleted = delete_message(&f.db, &id, &f.channel.id, &f.author).await.unwrap();
        assert!(deleted.deleted);
        assert_eq!(deleted.content, TOMBSTONE);
        assert!(deleted.file_url.is_none());

        let row = fetch_message(&f.db, &id).await;
        assert!(row.deleted);
        assert_eq!(row.content, TOMBSTONE);
        assert!(row.file_url.is_none());
    }

    #[actix_web::test]
    async fn deleted_is_terminal() {
        let f = fixture().await;
        let id = insert_message(&f.db, &f.channel.id, &f.author.id, "hi", None).await;
        delete_message(&f.db, &id, &f.channel.id, &f.author).await.unwrap();

        let err = edit_message(&f.db, &id, &f.channel.id, &f.author, "undo?").await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
        let err = delete_message(&f.db, &id, &f.channel.id, &f.other).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        let row = fetch_message(&f.db, &id).await;
        assert_eq!(row.content, TOMBSTONE);
    }

    #[actix_web::test]
    async fn moderators_may_delete_others_messages() {
        let f = fixture().await;
        let id = insert_message(&f.db, &f.channel.id, &f.other.id, "admin note", None).await;
        set_role(&f.db, &f.author.id, "MODERATOR").await;
        let moderator = membership::find_member(&f.db, &f.server.id, &f.author.profile_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moderator.role, MemberRole::Moderator);

        delete_message(&f.db, &id, &f.channel.id, &moderator).await.unwrap();
        assert!(fetch_message(&f.db, &id).await.deleted);
    }

    #[actix_web::test]
    async fn roles_from_another_server_do_not_carry_over() {
        let f = fixture().await;
        let id = insert_message(&f.db, &f.channel.id, &f.author.id, "hi", None).await;

        // The same profile owns (admins) a different server; that membership
        // must not authorize deletes here.
        let elsewhere = membership::create_server(&f.db, &f.other.profile_id, "other", None)
            .await
            .unwrap();
        let foreign_admin = membership::find_member(&f.db, &elsewhere.id, &f.other.profile_id)
            .await
            .unwrap()
            .unwrap();

        let err = delete_message(&f.db, &id, &f.channel.id, &foreign_admin).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
