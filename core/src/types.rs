//! Shared primitive types used across the query layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, unique identifier for any entity in a snapshot.
pub type EntityId = String;

/// Identity of a user. Accounts and insights are owned by one.
pub type UserId = String;

/// Identity of an account. Transactions hang off one.
pub type AccountId = String;

/// Every kind of entity the repository can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Account,
    Transaction,
    Insight,
    Alert,
    /// Not stored; used when a request names an operation the deployed
    /// service does not expose.
    Route,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User        => "user",
            EntityKind::Account     => "account",
            EntityKind::Transaction => "transaction",
            EntityKind::Insight     => "insight",
            EntityKind::Alert       => "alert",
            EntityKind::Route       => "route",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
