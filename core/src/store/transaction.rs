use super::EntityStore;
use crate::{error::QueryResult, filter::TransactionFilter, model::Transaction};

impl EntityStore {
    // ── Transaction ───────────────────────────────────────────────

    pub fn transaction(&self, txn_id: &str) -> QueryResult<Option<Transaction>> {
        let inner = self.read()?;
        Ok(inner.txn_idx.get(txn_id).map(|&i| inner.transactions[i].clone()))
    }

    /// Transactions satisfying `filter`, in snapshot order.
    ///
    /// With an account pinned only that account's transactions are
    /// evaluated; otherwise the whole collection is scanned.
    pub fn transactions_matching(&self, filter: &TransactionFilter) -> QueryResult<Vec<Transaction>> {
        let inner = self.read()?;
        let matched = match filter.account_id.as_deref() {
            Some(account_id) => inner
                .txns_by_account
                .get(account_id)
                .map(|positions| {
                    positions
                        .iter()
                        .map(|&i| &inner.transactions[i])
                        .filter(|t| filter.matches(t))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
            None => inner
                .transactions
                .iter()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect(),
        };
        Ok(matched)
    }
}
