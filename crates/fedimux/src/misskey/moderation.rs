// Misskey-dialect moderation and bookkeeping operations
//
// Only abuse reports exist on this dialect; filters, markers, scheduled
// statuses, bookmarks, and domain blocks are all in the capability table
// and reject before any network I/O.

use serde_json::json;
use tracing::debug;

use super::client::Client;
use crate::capability::Operation;
use crate::entities::{Filter, Marker, Report, ScheduledStatus, Status};
use crate::error::Error;
use crate::paging::Pagination;

impl Client {
    /// File an abuse report against an account.
    ///
    /// `POST /api/users/report-abuse`. The endpoint has no concept of
    /// per-status reports and returns no report object; status ids are
    /// appended to the comment and the returned [`Report`] carries neutral
    /// defaults.
    pub async fn report(
        &self,
        account_id: &str,
        comment: &str,
        status_ids: &[&str],
    ) -> Result<Report, Error> {
        self.gate(Operation::Report)?;
        debug!(account_id, "filing report");

        let mut text = comment.to_string();
        if !status_ids.is_empty() {
            text.push_str("\n\nStatuses: ");
            text.push_str(&status_ids.join(", "));
        }
        self.api_unit(
            "users/report-abuse",
            json!({ "userId": account_id, "comment": text }),
        )
        .await?;

        Ok(Report {
            id: String::new(),
            action_taken: false,
            comment: comment.to_string(),
            status_ids: status_ids.iter().map(ToString::to_string).collect(),
        })
    }

    /// No keyword filter API on this dialect; rejects before any I/O.
    pub async fn get_filters(&self) -> Result<Vec<Filter>, Error> {
        Self::unsupported(Operation::GetFilters)
    }

    /// No read-marker API on this dialect; rejects before any I/O.
    pub async fn get_markers(&self) -> Result<Marker, Error> {
        Self::unsupported(Operation::GetMarkers)
    }

    /// No read-marker API on this dialect; rejects before any I/O.
    pub async fn save_markers(
        &self,
        _home_last_read: Option<&str>,
        _notifications_last_read: Option<&str>,
    ) -> Result<Marker, Error> {
        Self::unsupported(Operation::SaveMarkers)
    }

    /// No scheduled-status API on this dialect; rejects before any I/O.
    pub async fn get_scheduled_statuses(
        &self,
        _page: &Pagination,
    ) -> Result<Vec<ScheduledStatus>, Error> {
        Self::unsupported(Operation::GetScheduledStatuses)
    }

    /// No bookmark API on this dialect; rejects before any I/O.
    pub async fn get_bookmarks(&self, _page: &Pagination) -> Result<Vec<Status>, Error> {
        Self::unsupported(Operation::GetBookmarks)
    }

    /// No user-level domain blocks on this dialect; rejects before any I/O.
    pub async fn get_domain_blocks(&self, _page: &Pagination) -> Result<Vec<String>, Error> {
        Self::unsupported(Operation::GetDomainBlocks)
    }

    /// No user-level domain blocks on this dialect; rejects before any I/O.
    pub async fn block_domain(&self, _domain: &str) -> Result<(), Error> {
        Self::unsupported(Operation::BlockDomain)
    }
}
