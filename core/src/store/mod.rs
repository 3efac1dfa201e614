//! In-memory entity repository.
//!
//! RULE: Only the store touches entity collections.
//! Services call store methods; they never hold the lock themselves.
//!
//! The store is populated once (`load`) and then gains its derived alerts
//! once (`derive_alerts`). Both take the exclusive lock. Every other
//! method is a read under the shared lock and returns owned copies, so no
//! guard ever outlives a call.
//!
//! Secondary indexes are built during `load` and keep snapshot order,
//! which makes every list result deterministic.

use crate::{
    error::{LoadError, LoadResult, QueryError, QueryResult},
    model::{Account, Alert, Entity, Insight, Transaction, User},
    snapshot::Snapshot,
    types::{AccountId, EntityId, EntityKind, UserId},
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

mod account;
mod insight;
mod transaction;
mod user;

pub use insight::derive_alerts;

#[derive(Debug, Default)]
pub struct EntityStore {
    inner: RwLock<StoreInner>,
}

/// Entity counts, reported by `health` and the runner summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub users:        usize,
    pub accounts:     usize,
    pub transactions: usize,
    pub insights:     usize,
    pub alerts:       usize,
}

#[derive(Debug, Default)]
struct StoreInner {
    loaded:         bool,
    alerts_derived: bool,

    users:          Vec<User>,
    user_idx:       HashMap<UserId, usize>,
    /// First user in snapshot order wins for a repeated email.
    email_idx:      HashMap<String, usize>,

    accounts:       Vec<Account>,
    account_idx:    HashMap<AccountId, usize>,
    accounts_by_user: HashMap<UserId, Vec<usize>>,

    transactions:   Vec<Transaction>,
    txn_idx:        HashMap<EntityId, usize>,
    txns_by_account: HashMap<AccountId, Vec<usize>>,

    insights:       Vec<Insight>,
    insight_idx:    HashMap<EntityId, usize>,
    insights_by_user: HashMap<UserId, Vec<usize>>,

    alerts:         Vec<Alert>,
    alert_idx:      HashMap<EntityId, usize>,
    alerts_by_user: HashMap<UserId, Vec<usize>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot and derive alerts in one go. The usual startup path.
    pub fn from_snapshot(snapshot: Snapshot) -> LoadResult<Self> {
        let store = Self::new();
        store.load(snapshot)?;
        store.derive_alerts()?;
        Ok(store)
    }

    /// Bulk-load a snapshot and build every secondary index.
    /// May run once; duplicate ids within a kind abort the load.
    pub fn load(&self, snapshot: Snapshot) -> LoadResult<StoreCounts> {
        let mut inner = self.inner.write().map_err(|_| LoadError::Poisoned)?;
        if inner.loaded {
            return Err(LoadError::AlreadyLoaded("loaded"));
        }

        let Snapshot { users, accounts, transactions, insights } = snapshot;

        let user_idx = index_by_id(&users, EntityKind::User, |u| &u.id)?;
        let account_idx = index_by_id(&accounts, EntityKind::Account, |a| &a.id)?;
        let txn_idx = index_by_id(&transactions, EntityKind::Transaction, |t| &t.id)?;
        let insight_idx = index_by_id(&insights, EntityKind::Insight, |i| &i.id)?;

        let mut email_idx = HashMap::new();
        for (pos, user) in users.iter().enumerate() {
            email_idx.entry(user.email.clone()).or_insert(pos);
        }

        inner.accounts_by_user = group_by(&accounts, |a| &a.user_id);
        inner.txns_by_account = group_by(&transactions, |t| &t.account_id);
        inner.insights_by_user = group_by(&insights, |i| &i.user_id);

        inner.users = users;
        inner.user_idx = user_idx;
        inner.email_idx = email_idx;
        inner.accounts = accounts;
        inner.account_idx = account_idx;
        inner.transactions = transactions;
        inner.txn_idx = txn_idx;
        inner.insights = insights;
        inner.insight_idx = insight_idx;
        inner.loaded = true;

        let counts = inner.counts();
        log::info!(
            "Repository loaded: {} users, {} accounts, {} transactions, {} insights",
            counts.users, counts.accounts, counts.transactions, counts.insights
        );
        Ok(counts)
    }

    /// Generic lookup by kind. `NotFound` is an ordinary outcome.
    pub fn get(&self, kind: EntityKind, id: &str) -> QueryResult<Entity> {
        let inner = self.read()?;
        let found = match kind {
            EntityKind::User        => inner.user_idx.get(id).map(|&i| Entity::User(inner.users[i].clone())),
            EntityKind::Account     => inner.account_idx.get(id).map(|&i| Entity::Account(inner.accounts[i].clone())),
            EntityKind::Transaction => inner.txn_idx.get(id).map(|&i| Entity::Transaction(inner.transactions[i].clone())),
            EntityKind::Insight     => inner.insight_idx.get(id).map(|&i| Entity::Insight(inner.insights[i].clone())),
            EntityKind::Alert       => inner.alert_idx.get(id).map(|&i| Entity::Alert(inner.alerts[i].clone())),
            EntityKind::Route       => None,
        };
        found.ok_or_else(|| QueryError::not_found(kind, id))
    }

    pub fn counts(&self) -> QueryResult<StoreCounts> {
        Ok(self.read()?.counts())
    }

    fn read(&self) -> QueryResult<RwLockReadGuard<'_, StoreInner>> {
        self.inner
            .read()
            .map_err(|_| QueryError::Internal("repository lock poisoned".into()))
    }

    fn write(&self) -> LoadResult<RwLockWriteGuard<'_, StoreInner>> {
        self.inner.write().map_err(|_| LoadError::Poisoned)
    }
}

impl StoreInner {
    fn counts(&self) -> StoreCounts {
        StoreCounts {
            users:        self.users.len(),
            accounts:     self.accounts.len(),
            transactions: self.transactions.len(),
            insights:     self.insights.len(),
            alerts:       self.alerts.len(),
        }
    }
}

fn index_by_id<T>(
    items: &[T],
    kind: EntityKind,
    id: impl Fn(&T) -> &String,
) -> LoadResult<HashMap<String, usize>> {
    let mut idx = HashMap::with_capacity(items.len());
    for (pos, item) in items.iter().enumerate() {
        if idx.insert(id(item).clone(), pos).is_some() {
            return Err(LoadError::DuplicateId { kind, id: id(item).clone() });
        }
    }
    Ok(idx)
}

/// Positions of `items` grouped by a foreign key, in snapshot order.
fn group_by<T>(items: &[T], key: impl Fn(&T) -> &String) -> HashMap<String, Vec<usize>> {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (pos, item) in items.iter().enumerate() {
        groups.entry(key(item).clone()).or_default().push(pos);
    }
    groups
}
