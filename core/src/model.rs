//! Stored entities, exactly as they arrive in a snapshot.
//!
//! Nothing in here is ever mutated after load. Caller-facing
//! representations are built in `shaping.rs` from borrowed copies.

use crate::types::{AccountId, EntityId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Soft-unique: lookups return the first match in snapshot order.
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// ISO 3166-1 alpha-2 (US, UK, FR, ...).
    pub country: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub account_number: String,
    pub account_type: String,   // checking | savings | credit | investment | loan
    pub account_name: String,
    pub balance: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    pub status: String,         // active | inactive | closed | frozen | suspended
    pub opened_date: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: EntityId,
    pub account_id: AccountId,
    pub date: DateTime<Utc>,
    pub description: String,
    /// Negative for debits.
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub merchant: String,
    pub status: String,
    #[serde(rename = "type")]
    pub txn_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: EntityId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub insight_type: String,
    pub category: String,
    pub title: String,
    pub description: String,
    /// Open vocabulary: info | warning | critical | low | medium | high.
    pub severity: String,
    pub created_at: DateTime<Utc>,
    pub actionable: bool,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl Priority {
    /// Fixed severity → priority table used when deriving alerts.
    pub fn from_severity(severity: &str) -> Self {
        match severity {
            "high"   => Priority::Critical,
            "medium" => Priority::High,
            _        => Priority::Medium,
        }
    }
}

/// Derived from an actionable insight at load time. Never authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: EntityId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

/// Any stored entity, for the generic `EntityStore::get`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    User(User),
    Account(Account),
    Transaction(Transaction),
    Insight(Insight),
    Alert(Alert),
}
