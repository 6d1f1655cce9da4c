// Misskey-dialect list operations
//
// The list endpoints return member ids, not member objects, so fetching the
// accounts in a list is two-step: `users/lists/show` for the ids, then
// `users/show` in array form to resolve them. An empty list short-circuits
// without the second call.

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
    /// `POST /api/users/lists/list`
    pub async fn get_lists(&self) -> Result<Vec<List>, Error> {
        self.gate(Operation::GetLists)?;
        let lists: Vec<native::UserList> = self.api("users/lists/list", json!({})).await?;
        Ok(lists.into_iter().map(convert::list).collect())
    }

    /// One list by id.
    ///
    /// `POST /api/users/lists/show`
    pub async fn get_list(&self, id: &str) -> Result<List, Error> {
        self.gate(Operation::GetList)?;
        let l: native::UserList = self.api("users/lists/show", json!({ "listId": id })).await?;
        Ok(convert::list(l))
    }

    /// Create a list.
    ///
    /// `POST /api/users/lists/create`
    pub async fn create_list(&self, title: &str) -> Result<List, Error> {
        self.gate(Operation::CreateList)?;
        debug!(title, "creating list");
        let l: native::UserList = self
            .api("users/lists/create", json!({ "name": title }))
            .await?;
        Ok(convert::list(l))
    }

    /// Delete a list.
    ///
    /// `POST /api/users/lists/delete`
    pub async fn delete_list(&self, id: &str) -> Result<(), Error> {
        self.gate(Operation::DeleteList)?;
        debug!(id, "deleting list");
        self.api_unit("users/lists/delete", json!({ "listId": id }))
            .await
    }

    /// Accounts in a list.
    ///
    /// `POST /api/users/lists/show`, then `POST /api/users/show`.
    pub async fn get_accounts_in_list(&self, id: &str) -> Result<Vec<Account>, Error> {
        self.gate(Operation::GetAccountsInList)?;
        let l: native::UserList = self.api("users/lists/show", json!({ "listId": id })).await?;
        if l.user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let users: Vec<native::User> = self
            .api("users/show", json!({ "userIds": l.user_ids }))
            .await?;
        Ok(users.into_iter().map(convert::account).collect())
    }

    /// Add accounts to a list.
    ///
    /// `POST /api/users/lists/push`, once per account.
    pub async fn add_accounts_to_list(&self, id: &str, account_ids: &[&str]) -> Result<(), Error> {
        self.gate(Operation::AddAccountsToList)?;
        debug!(id, count = account_ids.len(), "adding accounts to list");
        for account_id in account_ids {
            self.api_unit(
                "users/lists/push",
                json!({ "listId": id, "userId": account_id }),
            )
            .await?;
        }
        Ok(())
    }

    /// Remove accounts from a list.
    ///
    /// `POST /api/users/lists/pull`, once per account.
    pub async fn delete_accounts_from_list(
        &self,
        id: &str,
        account_ids: &[&str],
    ) -> Result<(), Error> {
        self.gate(Operation::DeleteAccountsFromList)?;
        debug!(id, count = account_ids.len(), "removing accounts from list");
        for account_id in account_ids {
            self.api_unit(
                "users/lists/pull",
                json!({ "listId": id, "userId": account_id }),
            )
            .await?;
        }
        Ok(())
    }
}
