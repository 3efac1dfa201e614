//! Transaction queries scoped to the caller's accounts.
//!
//! RULE: a transaction is only ever returned from a list if it belongs to
//! one of the caller's accounts. Evaluation always runs per owned account
//! with the account pinned, never as an unscoped scan.

use crate::{
    access::Caller,
    error::{QueryError, QueryResult},
    filter::{FilterParams, TransactionFilter},
    flags::{FeatureFlags, Flag},
    model::Transaction,
    store::EntityStore,
    types::{AccountId, EntityKind},
};
use std::sync::Arc;

pub struct TransactionService {
    store: Arc<EntityStore>,
    flags: Arc<FeatureFlags>,
}

impl TransactionService {
    pub fn new(store: Arc<EntityStore>, flags: Arc<FeatureFlags>) -> Self {
        Self { store, flags }
    }

    /// Parse raw parameters, then list. Bad parameters fail before any
    /// repository access.
    pub fn list_with_params(
        &self,
        caller: &Caller,
        params: &FilterParams,
    ) -> QueryResult<Vec<Transaction>> {
        let filter = params.parse().inspect_err(|e| {
            log::warn!("Rejected transaction filter: user_id={} {e}", caller.user_id)
        })?;
        self.list_for_caller(caller, &filter)
    }

    /// Transactions across the caller's accounts matching `filter`,
    /// newest first. Equal dates keep account order, then snapshot order.
    pub fn list_for_caller(
        &self,
        caller: &Caller,
        filter: &TransactionFilter,
    ) -> QueryResult<Vec<Transaction>> {
        let flags = self.flags.snapshot()?;
        let filter = if !flags.is_enabled(Flag::AdvancedFilters) && filter.has_advanced() {
            log::info!(
                "Advanced filters disabled, applying account filter only: user_id={}",
                caller.user_id
            );
            filter.account_only()
        } else {
            filter.clone()
        };

        let owned = self.store.account_ids_for_user(&caller.user_id)?;
        if owned.is_empty() {
            log::warn!("No accounts for user: user_id={}", caller.user_id);
            return Ok(Vec::new());
        }

        let targets: Vec<&AccountId> = match filter.account_id.as_ref() {
            Some(requested) => owned.iter().filter(|id| *id == requested).collect(),
            None => owned.iter().collect(),
        };
        if targets.is_empty() {
            log::debug!(
                "Requested account not owned by caller: user_id={} account_id={}",
                caller.user_id,
                filter.account_id.as_deref().unwrap_or_default()
            );
        }

        let mut results = Vec::new();
        for account_id in targets {
            results.extend(self.store.transactions_matching(&filter.pinned_to(account_id))?);
        }
        results.sort_by(|a, b| b.date.cmp(&a.date));

        log::debug!(
            "Listed transactions: user_id={} accounts={} count={}",
            caller.user_id,
            owned.len(),
            results.len()
        );
        Ok(results)
    }

    /// Direct lookup by id. Existence is the only check applied.
    pub fn get(&self, caller: &Caller, txn_id: &str) -> QueryResult<Transaction> {
        match self.store.transaction(txn_id)? {
            Some(txn) => Ok(txn),
            None => {
                log::warn!(
                    "Transaction not found: user_id={} transaction_id={txn_id}",
                    caller.user_id
                );
                Err(QueryError::not_found(EntityKind::Transaction, txn_id))
            }
        }
    }
}
