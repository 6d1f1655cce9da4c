// Mastodon-dialect account operations
//
// Accounts, follow/block/mute state changes, and relationship lookups.
// Every mutation returns the resulting relationship in a single round trip
// on this dialect.

use serde_json::json;
use tracing::debug;

use super::client::{page_query, Client};
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::{Account, Relationship, Status};
use crate::error::Error;
use crate::paging::Pagination;

impl Client {
    /// Fetch the account that owns the access token.
    ///
    /// `GET /api/v1/accounts/verify_credentials`
    pub async fn verify_account_credentials(&self) -> Result<Account, Error> {
        self.gate(Operation::VerifyAccountCredentials)?;
        let a: native::Account = self
            .get("/api/v1/accounts/verify_credentials", &[])
            .await?;
        Ok(convert::account(a))
    }

    /// Fetch one account by id.
    ///
    /// `GET /api/v1/accounts/{id}`
    pub async fn get_account(&self, id: &str) -> Result<Account, Error> {
        self.gate(Operation::GetAccount)?;
        let a: native::Account = self.get(&format!("/api/v1/accounts/{id}"), &[]).await?;
        Ok(convert::account(a))
    }

    /// Fetch an account's statuses, newest first.
    ///
    /// `GET /api/v1/accounts/{id}/statuses`
    pub async fn get_account_statuses(
        &self,
        id: &str,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetAccountStatuses)?;
        let mut query = Vec::new();
        page_query(page, &mut query);
        let statuses: Vec<native::Status> = self
            .get(&format!("/api/v1/accounts/{id}/statuses"), &query)
            .await?;
        statuses.into_iter().map(convert::status).collect()
    }

    /// Follow an account.
    ///
    /// `POST /api/v1/accounts/{id}/follow`
    pub async fn follow_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::FollowAccount)?;
        debug!(id, "following account");
        self.relationship_action(id, "follow").await
    }

    /// Unfollow an account.
    ///
    /// `POST /api/v1/accounts/{id}/unfollow`
    pub async fn unfollow_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::UnfollowAccount)?;
        debug!(id, "unfollowing account");
        self.relationship_action(id, "unfollow").await
    }

    /// Block an account.
    ///
    /// `POST /api/v1/accounts/{id}/block`
    pub async fn block_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::BlockAccount)?;
        debug!(id, "blocking account");
        self.relationship_action(id, "block").await
    }

    /// Unblock an account.
    ///
    /// `POST /api/v1/accounts/{id}/unblock`
    pub async fn unblock_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::UnblockAccount)?;
        debug!(id, "unblocking account");
        self.relationship_action(id, "unblock").await
    }

    /// Mute an account.
    ///
    /// `POST /api/v1/accounts/{id}/mute`
    pub async fn mute_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::MuteAccount)?;
        debug!(id, "muting account");
        self.relationship_action(id, "mute").await
    }

    /// Unmute an account.
    ///
    /// `POST /api/v1/accounts/{id}/unmute`
    pub async fn unmute_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::UnmuteAccount)?;
        debug!(id, "unmuting account");
        self.relationship_action(id, "unmute").await
    }

    /// Fetch the caller's relationship to each given account.
    ///
    /// `GET /api/v1/accounts/relationships?id[]=..`
    pub async fn get_relationships(&self, ids: &[&str]) -> Result<Vec<Relationship>, Error> {
        self.gate(Operation::GetRelationships)?;
        let query: Vec<(&str, String)> =
            ids.iter().map(|id| ("id[]", (*id).to_string())).collect();
        let relationships: Vec<native::Relationship> = self
            .get("/api/v1/accounts/relationships", &query)
            .await?;
        Ok(relationships
            .into_iter()
            .map(convert::relationship)
            .collect())
    }

    async fn relationship_action(&self, id: &str, action: &str) -> Result<Relationship, Error> {
        let r: native::Relationship = self
            .post(&format!("/api/v1/accounts/{id}/{action}"), &json!({}))
            .await?;
        Ok(convert::relationship(r))
    }
}
