use super::EntityStore;
use crate::{error::QueryResult, model::Account, types::AccountId};

impl EntityStore {
    // ── Account ───────────────────────────────────────────────────

    pub fn account(&self, account_id: &str) -> QueryResult<Option<Account>> {
        let inner = self.read()?;
        Ok(inner.account_idx.get(account_id).map(|&i| inner.accounts[i].clone()))
    }

    /// Accounts owned by `user_id`, in snapshot order. Empty is not an error.
    pub fn accounts_for_user(&self, user_id: &str) -> QueryResult<Vec<Account>> {
        let inner = self.read()?;
        Ok(inner
            .accounts_by_user
            .get(user_id)
            .map(|positions| positions.iter().map(|&i| inner.accounts[i].clone()).collect())
            .unwrap_or_default())
    }

    /// Ids of the accounts owned by `user_id`. This is the ownership set
    /// every transaction query is scoped to.
    pub fn account_ids_for_user(&self, user_id: &str) -> QueryResult<Vec<AccountId>> {
        let inner = self.read()?;
        Ok(inner
            .accounts_by_user
            .get(user_id)
            .map(|positions| positions.iter().map(|&i| inner.accounts[i].id.clone()).collect())
            .unwrap_or_default())
    }
}
