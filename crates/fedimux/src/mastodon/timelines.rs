// Mastodon-dialect timeline and notification operations

use serde_json::json;
use tracing::debug;

use super::client::{page_query, Client};
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::{Conversation, Notification, Status};
use crate::error::Error;
use crate::paging::Pagination;

impl Client {
    /// Home timeline of the authenticated account.
    ///
    /// `GET /api/v1/timelines/home`
    pub async fn get_home_timeline(&self, page: &Pagination) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetHomeTimeline)?;
        self.timeline("/api/v1/timelines/home", Vec::new(), page)
            .await
    }

    /// Public timeline; `local` restricts it to the home server.
    ///
    /// `GET /api/v1/timelines/public[?local=true]`
    pub async fn get_public_timeline(
        &self,
        local: bool,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetPublicTimeline)?;
        let mut query = Vec::new();
        if local {
            query.push(("local", "true".to_string()));
        }
        self.timeline("/api/v1/timelines/public", query, page).await
    }

    /// Public statuses carrying a hashtag.
    ///
    /// `GET /api/v1/timelines/tag/{tag}`
    pub async fn get_tag_timeline(
        &self,
        tag: &str,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetTagTimeline)?;
        self.timeline(&format!("/api/v1/timelines/tag/{tag}"), Vec::new(), page)
            .await
    }

    /// Statuses from the accounts in a list.
    ///
    /// `GET /api/v1/timelines/list/{id}`
    pub async fn get_list_timeline(
        &self,
        list_id: &str,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetListTimeline)?;
        self.timeline(
            &format!("/api/v1/timelines/list/{list_id}"),
            Vec::new(),
            page,
        )
        .await
    }

    /// Direct-message conversations.
    ///
    /// `GET /api/v1/conversations`
    pub async fn get_conversation_timeline(
        &self,
        page: &Pagination,
    ) -> Result<Vec<Conversation>, Error> {
        self.gate(Operation::GetConversationTimeline)?;
        let mut query = Vec::new();
        page_query(page, &mut query);
        let conversations: Vec<native::Conversation> =
            self.get("/api/v1/conversations", &query).await?;
        conversations
            .into_iter()
            .map(convert::conversation)
            .collect()
    }

    /// Notifications for the authenticated account.
    ///
    /// `GET /api/v1/notifications`
    pub async fn get_notifications(&self, page: &Pagination) -> Result<Vec<Notification>, Error> {
        self.gate(Operation::GetNotifications)?;
        let mut query = Vec::new();
        page_query(page, &mut query);
        let notifications: Vec<native::Notification> =
            self.get("/api/v1/notifications", &query).await?;
        notifications
            .into_iter()
            .map(convert::notification)
            .collect()
    }

    /// Clear all notifications.
    ///
    /// `POST /api/v1/notifications/clear`
    pub async fn dismiss_notifications(&self) -> Result<(), Error> {
        self.gate(Operation::DismissNotifications)?;
        debug!("clearing notifications");
        self.post_unit("/api/v1/notifications/clear", &json!({}))
            .await
    }

    async fn timeline(
        &self,
        path: &str,
        mut query: Vec<(&'static str, String)>,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        page_query(page, &mut query);
        let statuses: Vec<native::Status> = self.get(path, &query).await?;
        statuses.into_iter().map(convert::status).collect()
    }
}
