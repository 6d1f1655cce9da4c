// Mastodon-dialect status operations
//
// Posting, fetching, deleting, and per-status interactions. Request bodies
// only carry caller-supplied fields; the server keeps its own defaults for
// anything omitted.

use serde_json::json;
use tracing::debug;

use super::client::Client;
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::{Poll, Status};
use crate::error::Error;
use crate::params::PostStatusParams;

impl Client {
    /// Publish a status.
    ///
    /// `POST /api/v1/statuses`
    pub async fn post_status(
        &self,
        content: &str,
        params: &PostStatusParams,
    ) -> Result<Status, Error> {
        self.gate(Operation::PostStatus)?;
        debug!("posting status");

        let mut body = json!({ "status": content });
        let obj = body
            .as_object_mut()
            .ok_or_else(|| Error::Argument {
                message: "status body must be an object".into(),
            })?;
        if let Some(ref reply) = params.in_reply_to_id {
            obj.insert("in_reply_to_id".into(), json!(reply));
        }
        if let Some(visibility) = params.visibility {
            obj.insert(
                "visibility".into(),
                json!(convert::encode_visibility(visibility)),
            );
        }
        if let Some(sensitive) = params.sensitive {
            obj.insert("sensitive".into(), json!(sensitive));
        }
        if let Some(ref spoiler) = params.spoiler_text {
            obj.insert("spoiler_text".into(), json!(spoiler));
        }
        if !params.media_ids.is_empty() {
            obj.insert("media_ids".into(), json!(params.media_ids));
        }
        if let Some(ref poll) = params.poll {
            obj.insert(
                "poll".into(),
                json!({
                    "options": poll.options,
                    "expires_in": poll.expires_in_secs,
                    "multiple": poll.multiple,
                }),
            );
        }

        let s: native::Status = self.post("/api/v1/statuses", &body).await?;
        convert::status(s)
    }

    /// Fetch one status by id.
    ///
    /// `GET /api/v1/statuses/{id}`
    pub async fn get_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::GetStatus)?;
        let s: native::Status = self.get(&format!("/api/v1/statuses/{id}"), &[]).await?;
        convert::status(s)
    }

    /// Delete a status.
    ///
    /// `DELETE /api/v1/statuses/{id}`
    pub async fn delete_status(&self, id: &str) -> Result<(), Error> {
        self.gate(Operation::DeleteStatus)?;
        debug!(id, "deleting status");
        self.delete_unit(&format!("/api/v1/statuses/{id}"), None)
            .await
    }

    /// Boost a status.
    ///
    /// `POST /api/v1/statuses/{id}/reblog`
    pub async fn reblog_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::ReblogStatus)?;
        self.status_action(id, "reblog").await
    }

    /// Undo a boost.
    ///
    /// `POST /api/v1/statuses/{id}/unreblog`
    pub async fn unreblog_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::UnreblogStatus)?;
        self.status_action(id, "unreblog").await
    }

    /// Favourite a status.
    ///
    /// `POST /api/v1/statuses/{id}/favourite`
    pub async fn favourite_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::FavouriteStatus)?;
        self.status_action(id, "favourite").await
    }

    /// Undo a favourite.
    ///
    /// `POST /api/v1/statuses/{id}/unfavourite`
    pub async fn unfavourite_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::UnfavouriteStatus)?;
        self.status_action(id, "unfavourite").await
    }

    /// Bookmark a status.
    ///
    /// `POST /api/v1/statuses/{id}/bookmark`
    pub async fn bookmark_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::BookmarkStatus)?;
        self.status_action(id, "bookmark").await
    }

    /// Remove a bookmark.
    ///
    /// `POST /api/v1/statuses/{id}/unbookmark`
    pub async fn unbookmark_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::UnbookmarkStatus)?;
        self.status_action(id, "unbookmark").await
    }

    /// Fetch a poll by its own id.
    ///
    /// `GET /api/v1/polls/{id}`
    pub async fn get_poll(&self, id: &str) -> Result<Poll, Error> {
        self.gate(Operation::GetPoll)?;
        let p: native::Poll = self.get(&format!("/api/v1/polls/{id}"), &[]).await?;
        Ok(convert::poll(p))
    }

    /// Vote on a poll.
    ///
    /// `POST /api/v1/polls/{id}/votes`
    ///
    /// `status_id` is accepted for surface parity with the Misskey dialect,
    /// where the vote endpoint is addressed by note; this dialect ignores it.
    pub async fn vote_poll(
        &self,
        id: &str,
        choices: &[u32],
        _status_id: Option<&str>,
    ) -> Result<Poll, Error> {
        self.gate(Operation::VotePoll)?;
        debug!(id, "voting on poll");
        let p: native::Poll = self
            .post(
                &format!("/api/v1/polls/{id}/votes"),
                &json!({ "choices": choices }),
            )
            .await?;
        Ok(convert::poll(p))
    }

    async fn status_action(&self, id: &str, action: &str) -> Result<Status, Error> {
        debug!(id, action, "status interaction");
        let s: native::Status = self
            .post(&format!("/api/v1/statuses/{id}/{action}"), &json!({}))
            .await?;
        convert::status(s)
    }
}
