use crate::{
    config::Service,
    filter::FilterParams,
    flags::{Flag, FlagSet},
    model::{Alert, Insight, Transaction, User},
    shaping::AccountResponse,
    store::StoreCounts,
    types::{AccountId, EntityId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every caller-facing operation.
/// Variants are never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Health,

    // ── Accounts service ──────────────────────────
    Me,
    ListAccounts,
    GetAccount { account_id: AccountId },

    // ── Transactions service ──────────────────────
    ListTransactions(FilterParams),
    GetTransaction { transaction_id: EntityId },

    // ── Insights service ──────────────────────────
    ListInsights,
    GetInsight { insight_id: EntityId },
    ListAlerts,
}

impl Request {
    pub fn op_name(&self) -> &'static str {
        match self {
            Request::Health                 => "health",
            Request::Me                     => "me",
            Request::ListAccounts           => "list_accounts",
            Request::GetAccount { .. }      => "get_account",
            Request::ListTransactions(_)    => "list_transactions",
            Request::GetTransaction { .. }  => "get_transaction",
            Request::ListInsights           => "list_insights",
            Request::GetInsight { .. }      => "get_insight",
            Request::ListAlerts             => "list_alerts",
        }
    }

    /// Entity id the request names, if any.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Request::GetAccount { account_id }         => Some(account_id),
            Request::GetTransaction { transaction_id } => Some(transaction_id),
            Request::GetInsight { insight_id }         => Some(insight_id),
            Request::ListTransactions(params)          => params.account_id.as_deref(),
            _ => None,
        }
    }
}

/// Operator commands against the running process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    /// `flag` accepts snake_case names and the dotted dashboard names.
    SetFlag { flag: String, enabled: bool },
    ReplaceFlags { flags: FlagSet },
    Flags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status:    &'static str,
    pub service:   Service,
    pub timestamp: DateTime<Utc>,
    pub counts:    StoreCounts,
}

/// A successful result, serialised as its bare payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Health(HealthReport),
    User(User),
    Accounts(Vec<AccountResponse>),
    Account(AccountResponse),
    Transactions(Vec<Transaction>),
    Transaction(Transaction),
    Insights(Vec<Insight>),
    Insight(Insight),
    Alerts(Vec<Alert>),
    Flags(BTreeMap<Flag, bool>),
}
