//! Misskey-dialect entity conversion.
//!
//! Pure functions from native shapes ([`super::entities`]) to the unified
//! domain model. This is the lossy side of the compatibility layer: fields
//! with no native equivalent get the declared neutral defaults, while values
//! outside a closed set (visibility) fail with
//! [`Error::UnexpectedValue`].

use chrono::Utc;

use super::entities as native;
use crate::entities::{
    Account, AccountField, Attachment, AttachmentKind, List, Notification, NotificationKind,
    Poll, PollOption, Relationship, Status, Visibility,
};
use crate::error::Error;

// ── Visibility bijection ─────────────────────────────────────────────

/// `public|home|followers|specified` → [`Visibility`]. Total over the
/// declared set; anything else is a protocol mismatch.
pub(crate) fn decode_visibility(value: &str) -> Result<Visibility, Error> {
    match value {
        "public" => Ok(Visibility::Public),
        "home" => Ok(Visibility::Unlisted),
        "followers" => Ok(Visibility::Private),
        "specified" => Ok(Visibility::Direct),
        other => Err(Error::UnexpectedValue {
            field: "visibility",
            value: other.to_string(),
        }),
    }
}

/// Reverse direction, used when encoding `notes/create` requests.
pub(crate) fn encode_visibility(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Unlisted => "home",
        Visibility::Private => "followers",
        Visibility::Direct => "specified",
    }
}

// ── Entities ─────────────────────────────────────────────────────────

pub(crate) fn account(u: native::User) -> Account {
    // Local users have no host and therefore no suffix in the handle.
    let acct = match u.host {
        Some(ref host) => format!("{}@{host}", u.username),
        None => u.username.clone(),
    };
    Account {
        id: u.id,
        acct,
        display_name: u.name.unwrap_or_else(|| u.username.clone()),
        username: u.username,
        note: u.description.unwrap_or_default(),
        url: String::new(),
        avatar: u.avatar_url.unwrap_or_default(),
        header: u.banner_url.unwrap_or_default(),
        locked: u.is_locked,
        bot: u.is_bot,
        created_at: u.created_at,
        followers_count: u.followers_count,
        following_count: u.following_count,
        statuses_count: u.notes_count,
        emojis: Vec::new(),
        fields: u
            .fields
            .into_iter()
            .map(|f| AccountField {
                name: f.name,
                value: f.value,
                verified_at: None,
            })
            .collect(),
    }
}

pub(crate) fn status(n: native::Note) -> Result<Status, Error> {
    let reblog = match n.renote {
        Some(inner) => Some(Box::new(status(*inner)?)),
        None => None,
    };
    let media_attachments: Vec<Attachment> = n.files.iter().map(attachment).collect();
    // Sensitivity lives on individual files in this dialect; the unified
    // flag is the disjunction over all of them.
    let sensitive = n.files.iter().any(|f| f.is_sensitive);
    // Reactions stand in for favourites; the count is their sum.
    let favourites_count = n.reactions.values().sum();
    let poll = n.poll.map(|p| poll(p, &n.id));
    Ok(Status {
        uri: n.uri.unwrap_or_default(),
        url: n.url,
        account: account(n.user),
        in_reply_to_id: n.reply_id,
        in_reply_to_account_id: None,
        reblog,
        content: n.text.unwrap_or_default(),
        created_at: n.created_at,
        visibility: decode_visibility(&n.visibility)?,
        sensitive,
        spoiler_text: n.cw.unwrap_or_default(),
        media_attachments,
        emojis: Vec::new(),
        poll,
        application: None,
        replies_count: n.replies_count,
        reblogs_count: n.renote_count,
        favourites_count,
        reblogged: false,
        favourited: n.my_reaction.is_some(),
        bookmarked: false,
        id: n.id,
    })
}

/// Polls carry no id of their own; the owning note's id is used so the poll
/// can still be addressed in follow-up calls.
pub(crate) fn poll(p: native::Poll, note_id: &str) -> Poll {
    let options: Vec<PollOption> = p
        .choices
        .iter()
        .map(|c| PollOption {
            title: c.text.clone(),
            votes_count: c.votes,
        })
        .collect();
    let votes_count = options.iter().map(|o| o.votes_count).sum();
    let expired = p.expires_at.is_some_and(|t| t <= Utc::now());
    let voted = p.choices.iter().any(|c| c.is_voted);
    Poll {
        id: note_id.to_string(),
        expires_at: p.expires_at,
        expired,
        multiple: p.multiple,
        votes_count,
        options,
        voted,
    }
}

pub(crate) fn attachment(f: &native::DriveFile) -> Attachment {
    let kind = match f.content_type.split('/').next().unwrap_or("") {
        "image" if f.content_type == "image/gif" => AttachmentKind::Gifv,
        "image" => AttachmentKind::Image,
        "video" => AttachmentKind::Video,
        "audio" => AttachmentKind::Audio,
        _ => AttachmentKind::Unknown,
    };
    Attachment {
        id: f.id.clone(),
        kind,
        url: f.url.clone().unwrap_or_default(),
        remote_url: None,
        preview_url: f.thumbnail_url.clone(),
        description: f.comment.clone(),
        blurhash: f.blurhash.clone(),
    }
}

pub(crate) fn notification(n: native::Notification) -> Result<Notification, Error> {
    // Notification kinds are an open set across server versions; unknown
    // kinds degrade to `Unknown` instead of failing the payload.
    let kind = match n.kind.as_str() {
        "follow" => NotificationKind::Follow,
        "receiveFollowRequest" => NotificationKind::FollowRequest,
        "mention" | "reply" => NotificationKind::Mention,
        "renote" | "quote" => NotificationKind::Reblog,
        "reaction" => NotificationKind::Reaction,
        "pollEnded" => NotificationKind::PollEnded,
        _ => NotificationKind::Unknown,
    };
    Ok(Notification {
        id: n.id,
        kind,
        created_at: n.created_at,
        account: n.user.map(account),
        status: n.note.map(status).transpose()?,
        reaction: n.reaction,
    })
}

pub(crate) fn relationship(r: native::Relation) -> Relationship {
    Relationship {
        id: r.id,
        following: r.is_following,
        followed_by: r.is_followed,
        blocking: r.is_blocking,
        blocked_by: r.is_blocked,
        muting: r.is_muted,
        muting_notifications: false,
        requested: r.has_pending_follow_request_from_you,
        domain_blocking: false,
        notifying: false,
    }
}

pub(crate) fn list(l: native::UserList) -> List {
    List {
        id: l.id,
        title: l.name,
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn lite_user(id: &str, host: Option<&str>) -> native::User {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "username": "ada",
            "name": null,
            "host": host,
        }))
        .unwrap()
    }

    fn note_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "createdAt": "2024-03-01T11:00:00Z",
            "userId": "u1",
            "user": serde_json::to_value(lite_user("u1", None)).unwrap(),
            "text": "hello",
            "visibility": "public",
        })
    }

    #[test]
    fn visibility_round_trips_all_four_values() {
        for v in [
            Visibility::Public,
            Visibility::Unlisted,
            Visibility::Private,
            Visibility::Direct,
        ] {
            assert_eq!(decode_visibility(encode_visibility(v)).unwrap(), v);
        }
    }

    #[test]
    fn home_maps_to_unlisted() {
        assert_eq!(decode_visibility("home").unwrap(), Visibility::Unlisted);
        assert_eq!(encode_visibility(Visibility::Unlisted), "home");
    }

    #[test]
    fn unmapped_visibility_is_an_error() {
        assert!(matches!(
            decode_visibility("hidden"),
            Err(Error::UnexpectedValue {
                field: "visibility",
                ..
            })
        ));
    }

    #[test]
    fn local_user_handle_has_no_host_suffix() {
        let converted = account(lite_user("u1", None));
        assert_eq!(converted.acct, "ada");
        // Display name falls back to the username.
        assert_eq!(converted.display_name, "ada");
    }

    #[test]
    fn remote_user_handle_is_qualified() {
        let converted = account(lite_user("u1", Some("remote.example")));
        assert_eq!(converted.acct, "ada@remote.example");
    }

    #[test]
    fn note_id_is_preserved_exactly() {
        let n: native::Note = serde_json::from_value(note_json("9abcxyz")).unwrap();
        assert_eq!(status(n).unwrap().id, "9abcxyz");
    }

    #[test]
    fn sensitivity_is_derived_from_files() {
        let mut json = note_json("n1");
        json["files"] = serde_json::json!([
            { "id": "f1", "type": "image/png", "isSensitive": false },
            { "id": "f2", "type": "image/png", "isSensitive": true },
        ]);
        let n: native::Note = serde_json::from_value(json).unwrap();
        assert!(status(n).unwrap().sensitive);

        let mut json = note_json("n2");
        json["files"] = serde_json::json!([
            { "id": "f1", "type": "image/png", "isSensitive": false },
        ]);
        let n: native::Note = serde_json::from_value(json).unwrap();
        assert!(!status(n).unwrap().sensitive);
    }

    #[test]
    fn reactions_are_summed_into_favourites() {
        let mut json = note_json("n1");
        json["reactions"] = serde_json::json!({ "👍": 2, "🎉": 3 });
        let n: native::Note = serde_json::from_value(json).unwrap();
        assert_eq!(status(n).unwrap().favourites_count, 5);
    }

    #[test]
    fn renote_converts_one_level_deep() {
        let mut json = note_json("outer");
        json["renote"] = note_json("inner");
        json["text"] = serde_json::Value::Null;
        let n: native::Note = serde_json::from_value(json).unwrap();
        let converted = status(n).unwrap();
        assert_eq!(converted.content, "");
        let inner = converted.reblog.expect("renote should convert");
        assert_eq!(inner.id, "inner");
    }

    #[test]
    fn poll_takes_the_owning_note_id() {
        let p: native::Poll = serde_json::from_value(serde_json::json!({
            "expiresAt": null,
            "multiple": true,
            "choices": [
                { "text": "a", "votes": 3 },
                { "text": "b", "votes": 5, "isVoted": true },
                { "text": "c", "votes": 2 },
            ],
        }))
        .unwrap();
        let converted = poll(p, "note9");
        assert_eq!(converted.id, "note9");
        assert_eq!(converted.votes_count, 10);
        assert!(converted.voted);
        assert!(!converted.expired);
    }

    #[test]
    fn poll_expiry_is_computed_against_the_clock() {
        let past = Utc::now() - Duration::minutes(5);
        let p: native::Poll = serde_json::from_value(serde_json::json!({
            "expiresAt": past.to_rfc3339(),
            "choices": [],
        }))
        .unwrap();
        assert!(poll(p, "n").expired);
    }

    #[test]
    fn unknown_notification_kind_degrades_to_unknown() {
        let n: native::Notification = serde_json::from_value(serde_json::json!({
            "id": "x1",
            "createdAt": "2024-03-01T10:00:00Z",
            "type": "achievementEarned",
        }))
        .unwrap();
        assert_eq!(notification(n).unwrap().kind, NotificationKind::Unknown);
    }
}
