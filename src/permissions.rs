use crate::models::member::Member;
use crate::models::message::Message;

/// Delete is delegated: moderators and admins may remove anyone's message,
/// the author may remove their own. Deleted messages are untouchable.
pub fn can_delete(message: &Message, acting: &Member) -> bool {
    !message.deleted && (acting.role.can_moderate() || acting.id == message.member_id)
}

/// Edit is never delegated: only the author, only on text-only messages,
/// and never after deletion. Attachments are immutable.
pub fn can_edit(message: &Message, acting: &Member) -> bool {
    !message.deleted && message.file_url.is_none() && acting.id == message.member_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::MemberRole;
    use chrono::Utc;

    fn member(id: &str, role: MemberRole) -> Member {
        Member {
            id: id.to_string(),
            role,
            profile_id: format!("p-{id}"),
            server_id: "s1".to_string(),
            created_at: Utc::now(),
        }
    }

    fn message(author_member_id: &str, file_url: Option<&str>, deleted: bool) -> Message {
        let now = Utc::now();
        Message {
            id: "m1".to_string(),
            content: "hello".to_string(),
            file_url: file_url.map(|s| s.to_string()),
            channel_id: "c1".to_string(),
            member_id: author_member_id.to_string(),
            deleted,
            is_updated: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn author_may_edit_and_delete_own_text_message() {
        let author = member("a", MemberRole::Guest);
        let msg = message("a", None, false);
        assert!(can_edit(&msg, &author));
        assert!(can_delete(&msg, &author));
    }

    #[test]
    fn attachments_are_immutable_for_every_role() {
        let msg = message("a", Some("https://files.example/x.png"), false);
        for role in [MemberRole::Guest, MemberRole::Moderator, MemberRole::Admin] {
            assert!(!can_edit(&msg, &member("a", role)), "author with {role:?}");
        }
        // Delete of a file message is still allowed for the author.
        assert!(can_delete(&msg, &member("a", MemberRole::Guest)));
    }

    #[test]
    fn moderators_and_admins_delete_but_never_edit_others_messages() {
        let msg = message("a", None, false);
        for role in [MemberRole::Moderator, MemberRole::Admin] {
            let staff = member("staff", role);
            assert!(can_delete(&msg, &staff), "{role:?} delete");
            assert!(!can_edit(&msg, &staff), "{role:?} edit");
        }
    }

    #[test]
    fn unrelated_guest_may_do_nothing() {
        let other = member("b", MemberRole::Guest);
        let msg = message("a", None, false);
        assert!(!can_delete(&msg, &other));
        assert!(!can_edit(&msg, &other));
    }

    #[test]
    fn deleted_is_terminal_for_all_roles() {
        let msg = message("a", None, true);
        for id in ["a", "staff"] {
            for role in [MemberRole::Guest, MemberRole::Moderator, MemberRole::Admin] {
                let m = member(id, role);
                assert!(!can_edit(&msg, &m));
                assert!(!can_delete(&msg, &m));
            }
        }
    }
}
