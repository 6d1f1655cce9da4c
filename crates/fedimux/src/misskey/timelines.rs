// Misskey-dialect timeline and notification operations

use serde_json::json;
use tracing::debug;

use super::client::{page_body, Client};
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::{Conversation, Notification, Status};
use crate::error::Error;
use crate::paging::Pagination;

impl Client {
    /// Home timeline of the authenticated account.
    ///
    /// `POST /api/notes/timeline`
    pub async fn get_home_timeline(&self, page: &Pagination) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetHomeTimeline)?;
        self.timeline("notes/timeline", json!({}), page).await
    }

    /// Public timeline; `local` restricts it to the home server.
    ///
    /// `POST /api/notes/local-timeline` or `POST /api/notes/global-timeline`
    pub async fn get_public_timeline(
        &self,
        local: bool,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetPublicTimeline)?;
        let endpoint = if local {
            "notes/local-timeline"
        } else {
            "notes/global-timeline"
        };
        self.timeline(endpoint, json!({}), page).await
    }

    /// Public statuses carrying a hashtag.
    ///
    /// `POST /api/notes/search-by-tag`
    pub async fn get_tag_timeline(
        &self,
        tag: &str,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetTagTimeline)?;
        self.timeline("notes/search-by-tag", json!({ "tag": tag }), page)
            .await
    }

    /// Statuses from the accounts in a list.
    ///
    /// `POST /api/notes/user-list-timeline`
    pub async fn get_list_timeline(
        &self,
        list_id: &str,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetListTimeline)?;
        self.timeline("notes/user-list-timeline", json!({ "listId": list_id }), page)
            .await
    }

    /// This dialect has no conversation grouping; rejects before any I/O.
    pub async fn get_conversation_timeline(
        &self,
        _page: &Pagination,
    ) -> Result<Vec<Conversation>, Error> {
        Self::unsupported(Operation::GetConversationTimeline)
    }

    /// Notifications for the authenticated account.
    ///
    /// `POST /api/i/notifications`
    pub async fn get_notifications(&self, page: &Pagination) -> Result<Vec<Notification>, Error> {
        self.gate(Operation::GetNotifications)?;
        let mut body = json!({});
        page_body(page, &mut body)?;
        let notifications: Vec<native::Notification> = self.api("i/notifications", body).await?;
        notifications
            .into_iter()
            .map(convert::notification)
            .collect()
    }

    /// Mark every notification read.
    ///
    /// `POST /api/notifications/mark-all-as-read`
    pub async fn dismiss_notifications(&self) -> Result<(), Error> {
        self.gate(Operation::DismissNotifications)?;
        debug!("marking all notifications read");
        self.api_unit("notifications/mark-all-as-read", json!({}))
            .await
    }

    async fn timeline(
        &self,
        endpoint: &str,
        mut body: serde_json::Value,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        page_body(page, &mut body)?;
        let notes: Vec<native::Note> = self.api(endpoint, body).await?;
        notes.into_iter().map(convert::status).collect()
    }
}
