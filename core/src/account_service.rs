//! Account reads, shaped per request.
//!
//! One flag snapshot is taken per call and resolved into an `AccountView`
//! together with the caller's user record; every account in the response
//! is shaped from that same view.

use crate::{
    access::{ensure_owner, Caller},
    error::{QueryError, QueryResult},
    flags::FeatureFlags,
    shaping::{AccountResponse, AccountView},
    store::EntityStore,
    types::EntityKind,
};
use std::sync::Arc;

pub struct AccountService {
    store: Arc<EntityStore>,
    flags: Arc<FeatureFlags>,
}

impl AccountService {
    pub fn new(store: Arc<EntityStore>, flags: Arc<FeatureFlags>) -> Self {
        Self { store, flags }
    }

    pub fn list_for_caller(&self, caller: &Caller) -> QueryResult<Vec<AccountResponse>> {
        let view = self.view_for(caller)?;
        let accounts = self.store.accounts_for_user(&caller.user_id)?;
        log::debug!(
            "Listing accounts: user_id={} count={}",
            caller.user_id,
            accounts.len()
        );
        Ok(accounts.iter().map(|a| AccountResponse::shape(a, &view)).collect())
    }

    pub fn get_for_caller(&self, caller: &Caller, account_id: &str) -> QueryResult<AccountResponse> {
        let Some(account) = self.store.account(account_id)? else {
            log::warn!(
                "Account not found: user_id={} account_id={account_id}",
                caller.user_id
            );
            return Err(QueryError::not_found(EntityKind::Account, account_id));
        };
        ensure_owner(caller, &account.user_id, EntityKind::Account, account_id)?;

        let view = self.view_for(caller)?;
        Ok(AccountResponse::shape(&account, &view))
    }

    fn view_for(&self, caller: &Caller) -> QueryResult<AccountView> {
        let flags = self.flags.snapshot()?;
        let user = self.store.user(&caller.user_id)?;
        Ok(AccountView::resolve(&flags, user.as_ref()))
    }
}
