//! Mastodon-dialect entity conversion.
//!
//! Pure functions from native shapes ([`super::entities`]) to the unified
//! domain model. The unified model descends from the Mastodon shapes, so most
//! mappings are structural; the one closed value set is visibility, where an
//! unmapped value is a hard [`Error::UnexpectedValue`].

use chrono::Utc;

use super::entities as native;
use crate::entities::{
    Account, AccountField, Application, Attachment, AttachmentKind, Conversation, Emoji, Filter,
    Marker, MarkerPosition, Notification, NotificationKind, Poll, PollOption, Relationship,
    Report, ScheduledStatus, Status, Visibility,
};
use crate::error::Error;

// ── Visibility bijection ─────────────────────────────────────────────

/// `public|unlisted|private|direct` → [`Visibility`]. Total over the
/// declared set; anything else is a protocol mismatch.
pub(crate) fn decode_visibility(value: &str) -> Result<Visibility, Error> {
    match value {
        "public" => Ok(Visibility::Public),
        "unlisted" => Ok(Visibility::Unlisted),
        "private" => Ok(Visibility::Private),
        "direct" => Ok(Visibility::Direct),
        other => Err(Error::UnexpectedValue {
            field: "visibility",
            value: other.to_string(),
        }),
    }
}

/// Reverse direction, used when encoding requests.
pub(crate) fn encode_visibility(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Unlisted => "unlisted",
        Visibility::Private => "private",
        Visibility::Direct => "direct",
    }
}

// ── Entities ─────────────────────────────────────────────────────────

pub(crate) fn account(a: native::Account) -> Account {
    Account {
        id: a.id,
        acct: a.acct,
        display_name: if a.display_name.is_empty() {
            a.username.clone()
        } else {
            a.display_name
        },
        username: a.username,
        note: a.note,
        url: a.url,
        avatar: a.avatar,
        header: a.header,
        locked: a.locked,
        bot: a.bot,
        created_at: Some(a.created_at),
        followers_count: a.followers_count,
        following_count: a.following_count,
        statuses_count: a.statuses_count,
        emojis: a.emojis.into_iter().map(emoji).collect(),
        fields: a
            .fields
            .into_iter()
            .map(|f| AccountField {
                name: f.name,
                value: f.value,
                verified_at: f.verified_at,
            })
            .collect(),
    }
}

pub(crate) fn status(s: native::Status) -> Result<Status, Error> {
    let reblog = match s.reblog {
        Some(inner) => Some(Box::new(status(*inner)?)),
        None => None,
    };
    let media_attachments: Vec<Attachment> =
        s.media_attachments.into_iter().map(attachment).collect();
    Ok(Status {
        id: s.id.clone(),
        uri: s.uri,
        url: s.url,
        account: account(s.account),
        in_reply_to_id: s.in_reply_to_id,
        in_reply_to_account_id: s.in_reply_to_account_id,
        reblog,
        content: s.content,
        created_at: s.created_at,
        visibility: decode_visibility(&s.visibility)?,
        // This dialect flags sensitivity per post, not per attachment.
        sensitive: s.sensitive,
        spoiler_text: s.spoiler_text,
        media_attachments,
        emojis: s.emojis.into_iter().map(emoji).collect(),
        poll: s.poll.map(poll),
        application: s.application.map(application),
        replies_count: s.replies_count,
        reblogs_count: s.reblogs_count,
        favourites_count: s.favourites_count,
        reblogged: s.reblogged.unwrap_or(false),
        favourited: s.favourited.unwrap_or(false),
        bookmarked: s.bookmarked.unwrap_or(false),
    })
}

pub(crate) fn attachment(a: native::Attachment) -> Attachment {
    let kind = match a.kind.as_str() {
        "image" => AttachmentKind::Image,
        "video" => AttachmentKind::Video,
        "gifv" => AttachmentKind::Gifv,
        "audio" => AttachmentKind::Audio,
        _ => AttachmentKind::Unknown,
    };
    Attachment {
        id: a.id,
        kind,
        url: a.url,
        remote_url: a.remote_url,
        preview_url: a.preview_url,
        description: a.description,
        blurhash: a.blurhash,
    }
}

pub(crate) fn emoji(e: native::Emoji) -> Emoji {
    Emoji {
        shortcode: e.shortcode,
        url: e.url,
        static_url: e.static_url,
        visible_in_picker: e.visible_in_picker,
    }
}

pub(crate) fn poll(p: native::Poll) -> Poll {
    let options: Vec<PollOption> = p
        .options
        .into_iter()
        .map(|o| PollOption {
            title: o.title,
            votes_count: o.votes_count.unwrap_or(0),
        })
        .collect();
    // The sum of option tallies, never the server's (possibly stale) total.
    let votes_count = options.iter().map(|o| o.votes_count).sum();
    let expired = p.expires_at.is_some_and(|t| t <= Utc::now());
    Poll {
        id: p.id,
        expires_at: p.expires_at,
        expired,
        multiple: p.multiple,
        votes_count,
        options,
        voted: p.voted.unwrap_or(false),
    }
}

pub(crate) fn notification(n: native::Notification) -> Result<Notification, Error> {
    let kind = match n.kind.as_str() {
        "follow" => NotificationKind::Follow,
        "follow_request" => NotificationKind::FollowRequest,
        "mention" => NotificationKind::Mention,
        "reblog" => NotificationKind::Reblog,
        "favourite" => NotificationKind::Favourite,
        "poll" => NotificationKind::PollEnded,
        "update" => NotificationKind::Update,
        "emoji_reaction" | "reaction" => NotificationKind::Reaction,
        _ => NotificationKind::Unknown,
    };
    Ok(Notification {
        id: n.id,
        kind,
        created_at: n.created_at,
        account: n.account.map(account),
        status: n.status.map(status).transpose()?,
        reaction: None,
    })
}

pub(crate) fn relationship(r: native::Relationship) -> Relationship {
    Relationship {
        id: r.id,
        following: r.following,
        followed_by: r.followed_by,
        blocking: r.blocking,
        blocked_by: r.blocked_by,
        muting: r.muting,
        muting_notifications: r.muting_notifications,
        requested: r.requested,
        domain_blocking: r.domain_blocking,
        notifying: r.notifying,
    }
}

pub(crate) fn list(l: native::List) -> crate::entities::List {
    crate::entities::List {
        id: l.id,
        title: l.title,
    }
}

pub(crate) fn conversation(c: native::Conversation) -> Result<Conversation, Error> {
    Ok(Conversation {
        id: c.id,
        accounts: c.accounts.into_iter().map(account).collect(),
        last_status: c.last_status.map(status).transpose()?,
        unread: c.unread,
    })
}

pub(crate) fn application(a: native::Application) -> Application {
    Application {
        name: a.name,
        website: a.website,
    }
}

pub(crate) fn report(r: native::Report) -> Report {
    Report {
        id: r.id,
        action_taken: r.action_taken,
        comment: r.comment,
        status_ids: r.status_ids,
    }
}

pub(crate) fn filter(f: native::Filter) -> Filter {
    Filter {
        id: f.id,
        phrase: f.phrase,
        context: f.context,
        expires_at: f.expires_at,
        irreversible: f.irreversible,
        whole_word: f.whole_word,
    }
}

pub(crate) fn marker(m: native::Marker) -> Marker {
    Marker {
        home: m.home.map(marker_position),
        notifications: m.notifications.map(marker_position),
    }
}

fn marker_position(p: native::MarkerPosition) -> MarkerPosition {
    MarkerPosition {
        last_read_id: p.last_read_id,
        version: p.version,
        updated_at: p.updated_at,
    }
}

pub(crate) fn scheduled_status(s: native::ScheduledStatus) -> Result<ScheduledStatus, Error> {
    let visibility = match s.params.visibility.as_deref() {
        Some(v) => decode_visibility(v)?,
        None => Visibility::Public,
    };
    Ok(ScheduledStatus {
        id: s.id,
        scheduled_at: s.scheduled_at,
        text: s.params.text,
        visibility,
        sensitive: s.params.sensitive.unwrap_or(false),
        spoiler_text: s.params.spoiler_text.unwrap_or_default(),
        in_reply_to_id: s.params.in_reply_to_id,
        media_attachments: s.media_attachments.into_iter().map(attachment).collect(),
    })
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn native_account(id: &str) -> native::Account {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "username": "ada",
            "acct": "ada@remote.example",
            "display_name": "Ada",
            "created_at": "2024-03-01T10:00:00Z",
            "followers_count": 12,
            "following_count": 7,
            "statuses_count": 41,
        }))
        .unwrap()
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
    fn unmapped_visibility_is_an_error() {
        let err = decode_visibility("mutual").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedValue {
                field: "visibility",
                ..
            }
        ));
    }

    #[test]
    fn account_preserves_native_id() {
        let converted = account(native_account("109384"));
        assert_eq!(converted.id, "109384");
        assert_eq!(converted.acct, "ada@remote.example");
    }

    #[test]
    fn conversion_is_deterministic() {
        let a = account(native_account("1"));
        let b = account(native_account("1"));
        assert_eq!(a, b);
    }

    #[test]
    fn poll_votes_are_summed_from_options() {
        let p: native::Poll = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "expires_at": null,
            "multiple": false,
            "votes_count": 99,
            "options": [
                { "title": "a", "votes_count": 3 },
                { "title": "b", "votes_count": 5 },
                { "title": "c", "votes_count": 2 },
            ],
        }))
        .unwrap();

        let converted = poll(p);
        assert_eq!(converted.votes_count, 10);
    }

    #[test]
    fn poll_expiry_is_computed_against_the_clock() {
        let past = Utc::now() - Duration::hours(1);
        let future = Utc::now() + Duration::hours(1);

        for (ts, expected) in [(past, true), (future, false)] {
            let p: native::Poll = serde_json::from_value(serde_json::json!({
                "id": "p1",
                "expires_at": ts.to_rfc3339(),
                "multiple": false,
                "options": [],
            }))
            .unwrap();
            assert_eq!(poll(p).expired, expected, "expires_at = {ts}");
        }
    }

    #[test]
    fn status_converts_nested_reblog() {
        let s: native::Status = serde_json::from_value(serde_json::json!({
            "id": "2",
            "uri": "https://a.example/2",
            "account": serde_json::to_value(native_account("u1")).unwrap(),
            "content": "",
            "created_at": "2024-03-01T11:00:00Z",
            "visibility": "public",
            "reblog": {
                "id": "1",
                "uri": "https://b.example/1",
                "account": serde_json::to_value(native_account("u2")).unwrap(),
                "content": "<p>original</p>",
                "created_at": "2024-03-01T10:30:00Z",
                "visibility": "unlisted",
            },
        }))
        .unwrap();

        let converted = status(s).unwrap();
        assert_eq!(converted.id, "2");
        let inner = converted.reblog.expect("reblog should convert");
        assert_eq!(inner.id, "1");
        assert_eq!(inner.visibility, Visibility::Unlisted);
        assert!(inner.reblog.is_none());
    }

    #[test]
    fn unknown_notification_kind_maps_to_unknown() {
        let n: native::Notification = serde_json::from_value(serde_json::json!({
            "id": "n1",
            "type": "admin.sign_up",
            "created_at": "2024-03-01T10:00:00Z",
        }))
        .unwrap();
        assert_eq!(
            notification(n).unwrap().kind,
            NotificationKind::Unknown
        );
    }
}
