//! Unified request parameters shared by both dialect clients.
//!
//! Optional fields follow the same rule as pagination: only caller-supplied
//! values are encoded into the outgoing request.

use crate::entities::Visibility;

/// Parameters for posting a status.
#[derive(Debug, Clone, Default)]
pub struct PostStatusParams {
    /// Id of the status being replied to.
    pub in_reply_to_id: Option<String>,
    pub visibility: Option<Visibility>,
    /// Mark the whole post sensitive. The Misskey dialect has no per-note
    /// flag; sensitivity there is set on the uploaded files.
    pub sensitive: Option<bool>,
    /// Content warning / spoiler text.
    pub spoiler_text: Option<String>,
    /// Ids of previously uploaded attachments.
    pub media_ids: Vec<String>,
    pub poll: Option<PostPollParams>,
}

/// A poll to attach to a new status.
#[derive(Debug, Clone)]
pub struct PostPollParams {
    pub options: Vec<String>,
    pub expires_in_secs: u64,
    pub multiple: bool,
}
