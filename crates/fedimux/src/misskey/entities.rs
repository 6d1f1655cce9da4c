//! Native entity shapes for the Misskey-style RPC dialect.
//!
//! Everything is camelCase on the wire. The API is loose about field
//! presence — a "lite" user embedded in a note carries far fewer fields than
//! a `users/show` response — so `#[serde(default)]` is pervasive and the
//! converter fills unified neutral defaults.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Error envelope ───────────────────────────────────────────────────

/// Error body returned with non-2xx responses:
/// `{"error": {"message": .., "code": .., "id": ..}}`.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

// ── User ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// Display name; `None` means the user never set one.
    #[serde(default)]
    pub name: Option<String>,
    /// `None` for local users, the bare domain for remote ones.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_locked: bool,
    /// Absent on lite users embedded in notes.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub notes_count: u64,
    #[serde(default)]
    pub fields: Vec<UserField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserField {
    pub name: String,
    pub value: String,
}

// ── Note ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Redundant with `user.id`; some delivery paths omit it.
    #[serde(default)]
    pub user_id: String,
    pub user: User,
    /// Body text; `None` for pure renotes.
    #[serde(default)]
    pub text: Option<String>,
    /// Content warning; doubles as the unified spoiler text.
    #[serde(default)]
    pub cw: Option<String>,
    pub visibility: String,
    #[serde(default)]
    pub reply_id: Option<String>,
    #[serde(default)]
    pub renote_id: Option<String>,
    /// At most one level of nesting by API construction.
    #[serde(default)]
    pub renote: Option<Box<Note>>,
    /// Absent on local notes.
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub files: Vec<DriveFile>,
    /// Reaction emoji → count. BTreeMap keeps iteration deterministic.
    #[serde(default)]
    pub reactions: BTreeMap<String, u64>,
    #[serde(default)]
    pub renote_count: u64,
    #[serde(default)]
    pub replies_count: u64,
    #[serde(default)]
    pub poll: Option<Poll>,
    /// The caller's own reaction, if any.
    #[serde(default)]
    pub my_reaction: Option<String>,
}

/// Envelope around `notes/create` responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNote {
    pub created_note: Note,
}

// ── DriveFile ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// MIME type, e.g. `image/png`.
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Sensitivity is flagged per file, not per note.
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default)]
    pub blurhash: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

// ── Poll ─────────────────────────────────────────────────────────────

/// A poll embedded in a note. Polls have no id of their own in this
/// dialect — they are addressed through the owning note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub multiple: bool,
    pub choices: Vec<PollChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollChoice {
    pub text: String,
    #[serde(default)]
    pub votes: u64,
    #[serde(default)]
    pub is_voted: bool,
}

// ── Notification ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub note: Option<Note>,
    #[serde(default)]
    pub reaction: Option<String>,
}

// ── Relation ─────────────────────────────────────────────────────────

/// Relationship state from `users/relation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    #[serde(default)]
    pub is_following: bool,
    #[serde(default)]
    pub is_followed: bool,
    #[serde(default)]
    pub has_pending_follow_request_from_you: bool,
    #[serde(default)]
    pub is_blocking: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_muted: bool,
}

// ── UserList ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user_ids: Vec<String>,
}
