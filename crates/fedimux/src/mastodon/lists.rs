// Mastodon-dialect list operations

use serde_json::json;
use tracing::debug;

use super::client::Client;
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::{Account, List};
use crate::error::Error;

impl Client {
    /// All lists owned by the authenticated account.
    ///
    /// `GET /api/v1/lists`
    pub async fn get_lists(&self) -> Result<Vec<List>, Error> {
        self.gate(Operation::GetLists)?;
        let lists: Vec<native::List> = self.get("/api/v1/lists", &[]).await?;
        Ok(lists.into_iter().map(convert::list).collect())
    }

    /// One list by id.
    ///
    /// `GET /api/v1/lists/{id}`
    pub async fn get_list(&self, id: &str) -> Result<List, Error> {
        self.gate(Operation::GetList)?;
        let l: native::List = self.get(&format!("/api/v1/lists/{id}"), &[]).await?;
        Ok(convert::list(l))
    }

    /// Create a list.
    ///
    /// `POST /api/v1/lists`
    pub async fn create_list(&self, title: &str) -> Result<List, Error> {
        self.gate(Operation::CreateList)?;
        debug!(title, "creating list");
        let l: native::List = self
            .post("/api/v1/lists", &json!({ "title": title }))
            .await?;
        Ok(convert::list(l))
    }

    /// Delete a list.
    ///
    /// `DELETE /api/v1/lists/{id}`
    pub async fn delete_list(&self, id: &str) -> Result<(), Error> {
        self.gate(Operation::DeleteList)?;
        debug!(id, "deleting list");
        self.delete_unit(&format!("/api/v1/lists/{id}"), None).await
    }

    /// Accounts in a list.
    ///
    /// `GET /api/v1/lists/{id}/accounts`
    pub async fn get_accounts_in_list(&self, id: &str) -> Result<Vec<Account>, Error> {
        self.gate(Operation::GetAccountsInList)?;
        let accounts: Vec<native::Account> = self
            .get(&format!("/api/v1/lists/{id}/accounts"), &[])
            .await?;
        Ok(accounts.into_iter().map(convert::account).collect())
    }

    /// Add accounts to a list.
    ///
    /// `POST /api/v1/lists/{id}/accounts`
    pub async fn add_accounts_to_list(
        &self,
        id: &str,
        account_ids: &[&str],
    ) -> Result<(), Error> {
        self.gate(Operation::AddAccountsToList)?;
        debug!(id, count = account_ids.len(), "adding accounts to list");
        self.post_unit(
            &format!("/api/v1/lists/{id}/accounts"),
            &json!({ "account_ids": account_ids }),
        )
        .await
    }

    /// Remove accounts from a list.
    ///
    /// `DELETE /api/v1/lists/{id}/accounts`
    pub async fn delete_accounts_from_list(
        &self,
        id: &str,
        account_ids: &[&str],
    ) -> Result<(), Error> {
        self.gate(Operation::DeleteAccountsFromList)?;
        debug!(id, count = account_ids.len(), "removing accounts from list");
        self.delete_unit(
            &format!("/api/v1/lists/{id}/accounts"),
            Some(&json!({ "account_ids": account_ids })),
        )
        .await
    }
}
