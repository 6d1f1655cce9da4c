// Misskey-dialect status operations
//
// Notes stand in for statuses. Reactions stand in for favourites: a
// favourite is a "⭐" reaction, and undoing it removes the caller's
// reaction whatever it was. Interactions that must return the resulting
// status re-fetch the note, because the mutation endpoints respond with
// nothing useful.

use serde_json::json;
use tracing::debug;

use super::client::Client;
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::{Poll, Status};
use crate::error::Error;
use crate::params::PostStatusParams;

/// Reaction used when the caller favourites a note.
const FAVOURITE_REACTION: &str = "⭐";

impl Client {
    /// Publish a note.
    ///
    /// `POST /api/notes/create`
    pub async fn post_status(
        &self,
        content: &str,
        params: &PostStatusParams,
    ) -> Result<Status, Error> {
        self.gate(Operation::PostStatus)?;
        debug!("posting note");

        let mut body = json!({ "text": content });
        let obj = body.as_object_mut().ok_or_else(|| Error::Argument {
            message: "note body must be an object".into(),
        })?;
        if let Some(ref reply) = params.in_reply_to_id {
            obj.insert("replyId".into(), json!(reply));
        }
        if let Some(visibility) = params.visibility {
            obj.insert(
                "visibility".into(),
                json!(convert::encode_visibility(visibility)),
            );
        }
        if let Some(ref spoiler) = params.spoiler_text {
            obj.insert("cw".into(), json!(spoiler));
        }
        if !params.media_ids.is_empty() {
            obj.insert("fileIds".into(), json!(params.media_ids));
        }
        if let Some(ref poll) = params.poll {
            let expires_at = i64::try_from(poll.expires_in_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .and_then(|d| chrono::Utc::now().checked_add_signed(d))
                .ok_or_else(|| Error::Argument {
                    message: "poll duration out of range".into(),
                })?;
            obj.insert(
                "poll".into(),
                json!({
                    "choices": poll.options,
                    "multiple": poll.multiple,
                    "expiresAt": expires_at.to_rfc3339(),
                }),
            );
        }
        // `sensitive` has no per-note equivalent here: sensitivity lives on
        // drive files and must be set at upload time.

        let created: native::CreatedNote = self.api("notes/create", body).await?;
        convert::status(created.created_note)
    }

    /// Fetch one note by id.
    ///
    /// `POST /api/notes/show`
    pub async fn get_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::GetStatus)?;
        let n: native::Note = self.api("notes/show", json!({ "noteId": id })).await?;
        convert::status(n)
    }

    /// Delete a note.
    ///
    /// `POST /api/notes/delete`
    pub async fn delete_status(&self, id: &str) -> Result<(), Error> {
        self.gate(Operation::DeleteStatus)?;
        debug!(id, "deleting note");
        self.api_unit("notes/delete", json!({ "noteId": id })).await
    }

    /// Renote a note.
    ///
    /// `POST /api/notes/create` with `renoteId`
    pub async fn reblog_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::ReblogStatus)?;
        debug!(id, "renoting");
        let created: native::CreatedNote = self
            .api("notes/create", json!({ "renoteId": id }))
            .await?;
        convert::status(created.created_note)
    }

    /// Undo a renote, then re-fetch the original note.
    ///
    /// `POST /api/notes/unrenote`, then `POST /api/notes/show`
    pub async fn unreblog_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::UnreblogStatus)?;
        debug!(id, "undoing renote");
        self.api_unit("notes/unrenote", json!({ "noteId": id }))
            .await?;
        self.get_status(id).await
    }

    /// React to a note with the favourite reaction, then re-fetch it.
    ///
    /// `POST /api/notes/reactions/create`, then `POST /api/notes/show`
    pub async fn favourite_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::FavouriteStatus)?;
        debug!(id, "favouriting note");
        self.api_unit(
            "notes/reactions/create",
            json!({ "noteId": id, "reaction": FAVOURITE_REACTION }),
        )
        .await?;
        self.get_status(id).await
    }

    /// Remove the caller's reaction, then re-fetch the note.
    ///
    /// `POST /api/notes/reactions/delete`, then `POST /api/notes/show`
    pub async fn unfavourite_status(&self, id: &str) -> Result<Status, Error> {
        self.gate(Operation::UnfavouriteStatus)?;
        debug!(id, "unfavouriting note");
        self.api_unit("notes/reactions/delete", json!({ "noteId": id }))
            .await?;
        self.get_status(id).await
    }

    /// Bookmarks have no equivalent concept on this dialect.
    pub async fn bookmark_status(&self, _id: &str) -> Result<Status, Error> {
        Self::unsupported(Operation::BookmarkStatus)
    }

    /// Bookmarks have no equivalent concept on this dialect.
    pub async fn unbookmark_status(&self, _id: &str) -> Result<Status, Error> {
        Self::unsupported(Operation::UnbookmarkStatus)
    }

    /// Fetch a poll. Polls are addressed through their owning note, whose id
    /// doubles as the unified poll id.
    ///
    /// `POST /api/notes/show`
    pub async fn get_poll(&self, id: &str) -> Result<Poll, Error> {
        self.gate(Operation::GetPoll)?;
        let n: native::Note = self.api("notes/show", json!({ "noteId": id })).await?;
        let note_id = n.id.clone();
        n.poll
            .map(|p| convert::poll(p, &note_id))
            .ok_or_else(|| Error::Argument {
                message: format!("note {note_id} carries no poll"),
            })
    }

    /// Vote on a poll.
    ///
    /// `POST /api/notes/polls/vote` (once per choice), then
    /// `POST /api/notes/show` for the updated tallies.
    ///
    /// The vote endpoint is addressed by note, not by poll, and returns no
    /// context to locate the poll afterwards — so `status_id` is required
    /// here. Omitting it is a caller contract violation
    /// ([`Error::Argument`]), not a capability gap.
    pub async fn vote_poll(
        &self,
        _id: &str,
        choices: &[u32],
        status_id: Option<&str>,
    ) -> Result<Poll, Error> {
        self.gate(Operation::VotePoll)?;
        let note_id = status_id.ok_or_else(|| Error::Argument {
            message: "voting on this dialect requires the owning status id".into(),
        })?;
        debug!(note_id, "voting on poll");

        for choice in choices {
            self.api_unit(
                "notes/polls/vote",
                json!({ "noteId": note_id, "choice": choice }),
            )
            .await?;
        }
        self.get_poll(note_id).await
    }
}
