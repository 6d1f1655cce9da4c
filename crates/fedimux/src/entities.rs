//! Unified domain model.
//!
//! Backend-agnostic value objects produced by the per-dialect converters.
//! Every field is always populated: when a backend has no equivalent, the
//! converter writes the declared neutral default (empty string, `None`,
//! `false`, `0`) so downstream code never branches on field presence.
//! Entities are constructed fresh per response and never mutated or cached
//! by this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Enumerations ──────────────────────────────────────────────────────

/// Post visibility, normalized across dialects.
///
/// Each dialect client carries a total 4-way bijection between this enum and
/// its native value set. A native value outside that set is a hard
/// [`UnexpectedValue`](crate::Error::UnexpectedValue), never a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to everyone, listed on public timelines.
    Public,
    /// Visible to everyone, excluded from public timelines.
    Unlisted,
    /// Followers only.
    Private,
    /// Mentioned users only.
    Direct,
}

/// Media attachment kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    Gifv,
    Audio,
    Unknown,
}

/// Notification kind.
///
/// Unlike [`Visibility`], this is a declared *open* set: servers add kinds
/// across versions, so converters map anything unrecognized to `Unknown`
/// instead of failing the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    FollowRequest,
    Mention,
    Reblog,
    Favourite,
    PollEnded,
    Update,
    Reaction,
    Unknown,
}

// ── Account ───────────────────────────────────────────────────────────

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Native primary id, copied byte-for-byte (usable as an opaque cursor).
    pub id: String,
    pub username: String,
    /// Qualified handle: `username` for local accounts,
    /// `username@host` for remote ones.
    pub acct: String,
    pub display_name: String,
    pub note: String,
    pub url: String,
    pub avatar: String,
    pub header: String,
    pub locked: bool,
    pub bot: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub followers_count: u64,
    pub following_count: u64,
    pub statuses_count: u64,
    pub emojis: Vec<Emoji>,
    pub fields: Vec<AccountField>,
}

/// One profile metadata row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountField {
    pub name: String,
    pub value: String,
    pub verified_at: Option<DateTime<Utc>>,
}

// ── Status ────────────────────────────────────────────────────────────

/// A post (status / note).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub uri: String,
    pub url: Option<String>,
    pub account: Account,
    pub in_reply_to_id: Option<String>,
    pub in_reply_to_account_id: Option<String>,
    /// The boosted/renoted original, converted recursively. Native payloads
    /// carry at most one level of nesting, so this recursion terminates.
    pub reblog: Option<Box<Status>>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub visibility: Visibility,
    /// True if the post or any attached media is individually flagged
    /// sensitive.
    pub sensitive: bool,
    pub spoiler_text: String,
    pub media_attachments: Vec<Attachment>,
    pub emojis: Vec<Emoji>,
    pub poll: Option<Poll>,
    /// Client the post was made with; not exposed by every dialect.
    pub application: Option<Application>,
    pub replies_count: u64,
    pub reblogs_count: u64,
    pub favourites_count: u64,
    pub reblogged: bool,
    pub favourited: bool,
    pub bookmarked: bool,
}

// ── Notification ──────────────────────────────────────────────────────

/// An inbound notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub account: Option<Account>,
    pub status: Option<Status>,
    /// Reaction emoji, populated only for `Reaction` notifications.
    pub reaction: Option<String>,
}

// ── Relationship ──────────────────────────────────────────────────────

/// The caller's relationship to one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Id of the *other* account.
    pub id: String,
    pub following: bool,
    pub followed_by: bool,
    pub blocking: bool,
    pub blocked_by: bool,
    pub muting: bool,
    pub muting_notifications: bool,
    pub requested: bool,
    pub domain_blocking: bool,
    pub notifying: bool,
}

// ── List ──────────────────────────────────────────────────────────────

/// A user-curated account list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub title: String,
}

// ── Poll ──────────────────────────────────────────────────────────────

/// A poll attached to a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// Computed at conversion time against the wall clock; a missing expiry
    /// means the poll never expires.
    pub expired: bool,
    pub multiple: bool,
    /// Sum of the per-option vote counts — never trusted from a native
    /// total field.
    pub votes_count: u64,
    pub options: Vec<PollOption>,
    pub voted: bool,
}

/// One poll option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub title: String,
    pub votes_count: u64,
}

// ── Attachment ────────────────────────────────────────────────────────

/// A media attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub kind: AttachmentKind,
    pub url: String,
    pub remote_url: Option<String>,
    pub preview_url: Option<String>,
    pub description: Option<String>,
    pub blurhash: Option<String>,
}

// ── Emoji ─────────────────────────────────────────────────────────────

/// A custom emoji.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emoji {
    pub shortcode: String,
    pub url: String,
    pub static_url: String,
    pub visible_in_picker: bool,
}

// ── Conversation ──────────────────────────────────────────────────────

/// A direct-message conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub accounts: Vec<Account>,
    pub last_status: Option<Status>,
    pub unread: bool,
}

// ── Application ───────────────────────────────────────────────────────

/// The application a status was posted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub website: Option<String>,
}

// ── Report ────────────────────────────────────────────────────────────

/// An abuse report filed by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub action_taken: bool,
    pub comment: String,
    pub status_ids: Vec<String>,
}

// ── Filter ────────────────────────────────────────────────────────────

/// A server-side keyword filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub phrase: String,
    pub context: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub irreversible: bool,
    pub whole_word: bool,
}

// ── Marker ────────────────────────────────────────────────────────────

/// Timeline read markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub home: Option<MarkerPosition>,
    pub notifications: Option<MarkerPosition>,
}

/// The read position within one timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPosition {
    pub last_read_id: String,
    pub version: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

// ── ScheduledStatus ───────────────────────────────────────────────────

/// A status queued for future publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStatus {
    pub id: String,
    pub scheduled_at: DateTime<Utc>,
    pub text: String,
    pub visibility: Visibility,
    pub sensitive: bool,
    pub spoiler_text: String,
    pub in_reply_to_id: Option<String>,
    pub media_attachments: Vec<Attachment>,
}
