// Mastodon-dialect moderation and bookkeeping operations
//
// Reports, keyword filters, read markers, scheduled statuses, bookmarks,
// and domain blocks. All of these exist only on this dialect; the Misskey-
// side capability table rejects them up front.

use serde_json::json;
use tracing::debug;

use super::client::{page_query, Client};
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::{Filter, Marker, Report, ScheduledStatus, Status};
use crate::error::Error;
use crate::paging::Pagination;

impl Client {
    /// File an abuse report against an account.
    ///
    /// `POST /api/v1/reports`
    pub async fn report(
        &self,
        account_id: &str,
        comment: &str,
        status_ids: &[&str],
    ) -> Result<Report, Error> {
        self.gate(Operation::Report)?;
        debug!(account_id, "filing report");

        let mut body = json!({ "account_id": account_id, "comment": comment });
        if !status_ids.is_empty() {
            // Caller may narrow the report to specific statuses.
            if let Some(obj) = body.as_object_mut() {
                obj.insert("status_ids".into(), json!(status_ids));
            }
        }

        let r: native::Report = self.post("/api/v1/reports", &body).await?;
        Ok(convert::report(r))
    }

    /// The caller's keyword filters.
    ///
    /// `GET /api/v1/filters`
    pub async fn get_filters(&self) -> Result<Vec<Filter>, Error> {
        self.gate(Operation::GetFilters)?;
        let filters: Vec<native::Filter> = self.get("/api/v1/filters", &[]).await?;
        Ok(filters.into_iter().map(convert::filter).collect())
    }

    /// Timeline read markers.
    ///
    /// `GET /api/v1/markers?timeline[]=home&timeline[]=notifications`
    pub async fn get_markers(&self) -> Result<Marker, Error> {
        self.gate(Operation::GetMarkers)?;
        let query = vec![
            ("timeline[]", "home".to_string()),
            ("timeline[]", "notifications".to_string()),
        ];
        let m: native::Marker = self.get("/api/v1/markers", &query).await?;
        Ok(convert::marker(m))
    }

    /// Save timeline read markers. Only supplied positions are sent.
    ///
    /// `POST /api/v1/markers`
    pub async fn save_markers(
        &self,
        home_last_read: Option<&str>,
        notifications_last_read: Option<&str>,
    ) -> Result<Marker, Error> {
        self.gate(Operation::SaveMarkers)?;

        let mut body = json!({});
        if let Some(obj) = body.as_object_mut() {
            if let Some(id) = home_last_read {
                obj.insert("home".into(), json!({ "last_read_id": id }));
            }
            if let Some(id) = notifications_last_read {
                obj.insert("notifications".into(), json!({ "last_read_id": id }));
            }
        }

        let m: native::Marker = self.post("/api/v1/markers", &body).await?;
        Ok(convert::marker(m))
    }

    /// Statuses queued for future publication.
    ///
    /// `GET /api/v1/scheduled_statuses`
    pub async fn get_scheduled_statuses(
        &self,
        page: &Pagination,
    ) -> Result<Vec<ScheduledStatus>, Error> {
        self.gate(Operation::GetScheduledStatuses)?;
        let mut query = Vec::new();
        page_query(page, &mut query);
        let scheduled: Vec<native::ScheduledStatus> =
            self.get("/api/v1/scheduled_statuses", &query).await?;
        scheduled
            .into_iter()
            .map(convert::scheduled_status)
            .collect()
    }

    /// The caller's bookmarked statuses.
    ///
    /// `GET /api/v1/bookmarks`
    pub async fn get_bookmarks(&self, page: &Pagination) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetBookmarks)?;
        let mut query = Vec::new();
        page_query(page, &mut query);
        let statuses: Vec<native::Status> = self.get("/api/v1/bookmarks", &query).await?;
        statuses.into_iter().map(convert::status).collect()
    }

    /// Domains the caller has blocked.
    ///
    /// `GET /api/v1/domain_blocks`
    pub async fn get_domain_blocks(&self, page: &Pagination) -> Result<Vec<String>, Error> {
        self.gate(Operation::GetDomainBlocks)?;
        let mut query = Vec::new();
        page_query(page, &mut query);
        self.get("/api/v1/domain_blocks", &query).await
    }

    /// Block a domain.
    ///
    /// `POST /api/v1/domain_blocks`
    pub async fn block_domain(&self, domain: &str) -> Result<(), Error> {
        self.gate(Operation::BlockDomain)?;
        debug!(domain, "blocking domain");
        self.post_unit("/api/v1/domain_blocks", &json!({ "domain": domain }))
            .await
    }
}
