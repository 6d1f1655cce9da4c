// Misskey-dialect account operations
//
// Follow/block/mute are two-step on this dialect: the mutation endpoints do
// not return relationship state, so a second `users/relation` call fetches
// it. The two steps are serialized inside each method — if the first fails
// the second is never attempted; if the second fails the operation fails as
// a whole even though the side effect already happened. This at-least-once,
// non-atomic contract is safe to retry: the mutations are idempotent.

use serde_json::json;
use tracing::debug;

use super::client::{page_body, Client};
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::{Account, Relationship, Status};
use crate::error::Error;
use crate::paging::Pagination;

impl Client {
    /// Fetch the account that owns the access token.
    ///
    /// `POST /api/i`
    pub async fn verify_account_credentials(&self) -> Result<Account, Error> {
        self.gate(Operation::VerifyAccountCredentials)?;
        let u: native::User = self.api("i", json!({})).await?;
        Ok(convert::account(u))
    }

    /// Fetch one account by id.
    ///
    /// `POST /api/users/show`
    pub async fn get_account(&self, id: &str) -> Result<Account, Error> {
        self.gate(Operation::GetAccount)?;
        let u: native::User = self.api("users/show", json!({ "userId": id })).await?;
        Ok(convert::account(u))
    }

    /// Fetch an account's statuses, newest first.
    ///
    /// `POST /api/users/notes`
    pub async fn get_account_statuses(
        &self,
        id: &str,
        page: &Pagination,
    ) -> Result<Vec<Status>, Error> {
        self.gate(Operation::GetAccountStatuses)?;
        let mut body = json!({ "userId": id });
        page_body(page, &mut body)?;
        let notes: Vec<native::Note> = self.api("users/notes", body).await?;
        notes.into_iter().map(convert::status).collect()
    }

    /// Follow an account.
    ///
    /// `POST /api/following/create`, then `POST /api/users/relation`.
    pub async fn follow_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::FollowAccount)?;
        debug!(id, "following account");
        self.api_unit("following/create", json!({ "userId": id }))
            .await?;
        self.relation(id).await
    }

    /// Unfollow an account.
    ///
    /// `POST /api/following/delete`, then `POST /api/users/relation`.
    pub async fn unfollow_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::UnfollowAccount)?;
        debug!(id, "unfollowing account");
        self.api_unit("following/delete", json!({ "userId": id }))
            .await?;
        self.relation(id).await
    }

    /// Block an account.
    ///
    /// `POST /api/blocking/create`, then `POST /api/users/relation`.
    pub async fn block_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::BlockAccount)?;
        debug!(id, "blocking account");
        self.api_unit("blocking/create", json!({ "userId": id }))
            .await?;
        self.relation(id).await
    }

    /// Unblock an account.
    ///
    /// `POST /api/blocking/delete`, then `POST /api/users/relation`.
    pub async fn unblock_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::UnblockAccount)?;
        debug!(id, "unblocking account");
        self.api_unit("blocking/delete", json!({ "userId": id }))
            .await?;
        self.relation(id).await
    }

    /// Mute an account.
    ///
    /// `POST /api/mute/create`, then `POST /api/users/relation`.
    pub async fn mute_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::MuteAccount)?;
        debug!(id, "muting account");
        self.api_unit("mute/create", json!({ "userId": id })).await?;
        self.relation(id).await
    }

    /// Unmute an account.
    ///
    /// `POST /api/mute/delete`, then `POST /api/users/relation`.
    pub async fn unmute_account(&self, id: &str) -> Result<Relationship, Error> {
        self.gate(Operation::UnmuteAccount)?;
        debug!(id, "unmuting account");
        self.api_unit("mute/delete", json!({ "userId": id })).await?;
        self.relation(id).await
    }

    /// Fetch the caller's relationship to each given account.
    ///
    /// `POST /api/users/relation` (array form)
    pub async fn get_relationships(&self, ids: &[&str]) -> Result<Vec<Relationship>, Error> {
        self.gate(Operation::GetRelationships)?;
        let relations: Vec<native::Relation> = self
            .api("users/relation", json!({ "userId": ids }))
            .await?;
        Ok(relations.into_iter().map(convert::relationship).collect())
    }

    /// Relationship to a single account (step two of the two-step ops).
    async fn relation(&self, id: &str) -> Result<Relationship, Error> {
        let r: native::Relation = self.api("users/relation", json!({ "userId": id })).await?;
        Ok(convert::relationship(r))
    }
}
