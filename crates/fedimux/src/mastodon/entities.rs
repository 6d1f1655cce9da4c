//! Native entity shapes for the Mastodon-style REST dialect.
//!
//! Field names are snake_case on the wire, matching serde's default. Fields
//! the API is inconsistent about across server versions carry
//! `#[serde(default)]` so a missing key never fails the whole payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Error envelope ───────────────────────────────────────────────────

/// Error body returned with non-2xx responses: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: String,
}

// ── Account ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    /// Already qualified by the server: `user` or `user@host`.
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub bot: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub statuses_count: u64,
    #[serde(default)]
    pub emojis: Vec<Emoji>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub url: Option<String>,
    pub account: Account,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub in_reply_to_account_id: Option<String>,
    /// At most one level of nesting by API construction.
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub visibility: String,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub spoiler_text: String,
    #[serde(default)]
    pub media_attachments: Vec<Attachment>,
    #[serde(default)]
    pub emojis: Vec<Emoji>,
    #[serde(default)]
    pub poll: Option<Poll>,
    #[serde(default)]
    pub application: Option<Application>,
    #[serde(default)]
    pub replies_count: u64,
    #[serde(default)]
    pub reblogs_count: u64,
    #[serde(default)]
    pub favourites_count: u64,
    #[serde(default)]
    pub reblogged: Option<bool>,
    #[serde(default)]
    pub favourited: Option<bool>,
    #[serde(default)]
    pub bookmarked: Option<bool>,
}

// ── Attachment ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    /// `image`, `video`, `gifv`, `audio`, or `unknown`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub blurhash: Option<String>,
}

// ── Emoji ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emoji {
    pub shortcode: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub static_url: String,
    #[serde(default)]
    pub visible_in_picker: bool,
}

// ── Poll ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub multiple: bool,
    /// Server-reported total; the converter recomputes from the options.
    #[serde(default)]
    pub votes_count: u64,
    #[serde(default)]
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub voted: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub title: String,
    /// `None` while the poll is open and the server hides tallies.
    #[serde(default)]
    pub votes_count: Option<u64>,
}

// ── Notification ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub account: Option<Account>,
    #[serde(default)]
    pub status: Option<Status>,
}

// ── Relationship ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub followed_by: bool,
    #[serde(default)]
    pub blocking: bool,
    #[serde(default)]
    pub blocked_by: bool,
    #[serde(default)]
    pub muting: bool,
    #[serde(default)]
    pub muting_notifications: bool,
    #[serde(default)]
    pub requested: bool,
    #[serde(default)]
    pub domain_blocking: bool,
    #[serde(default)]
    pub notifying: bool,
}

// ── List ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub title: String,
}

// ── Conversation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub last_status: Option<Status>,
    #[serde(default)]
    pub unread: bool,
}

// ── Application ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
}

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub action_taken: bool,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub status_ids: Vec<String>,
}

// ── Filter ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub phrase: String,
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub irreversible: bool,
    #[serde(default)]
    pub whole_word: bool,
}

// ── Marker ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    #[serde(default)]
    pub home: Option<MarkerPosition>,
    #[serde(default)]
    pub notifications: Option<MarkerPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerPosition {
    pub last_read_id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ── ScheduledStatus ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledStatus {
    pub id: String,
    pub scheduled_at: DateTime<Utc>,
    pub params: ScheduledParams,
    #[serde(default)]
    pub media_attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledParams {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub sensitive: Option<bool>,
    #[serde(default)]
    pub spoiler_text: Option<String>,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
}
