//! Snapshot ingestion: the entity set a service is built from.
//!
//! A snapshot is read once at startup from a data directory holding one
//! JSON array per entity kind. Anything unreadable or unparsable is fatal;
//! the process never starts serving on partial data.

use crate::{
    error::{LoadError, LoadResult},
    model::{Account, Insight, Transaction, User},
};
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One file of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Users,
    Accounts,
    Transactions,
    Insights,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Users,
        Dataset::Accounts,
        Dataset::Transactions,
        Dataset::Insights,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::Users        => "users.json",
            Dataset::Accounts     => "accounts.json",
            Dataset::Transactions => "transactions.json",
            Dataset::Insights     => "insights.json",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub users:        Vec<User>,
    pub accounts:     Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub insights:     Vec<Insight>,
}

impl Snapshot {
    /// Read the requested datasets from `data_dir`. Datasets not requested
    /// stay empty.
    pub fn load(data_dir: impl AsRef<Path>, datasets: &[Dataset]) -> LoadResult<Self> {
        let dir = data_dir.as_ref();
        let mut snapshot = Snapshot::default();
        for dataset in datasets {
            let path = dir.join(dataset.file_name());
            match dataset {
                Dataset::Users        => snapshot.users = read_array(&path)?,
                Dataset::Accounts     => snapshot.accounts = read_array(&path)?,
                Dataset::Transactions => snapshot.transactions = read_array(&path)?,
                Dataset::Insights     => snapshot.insights = read_array(&path)?,
            }
        }
        log::info!(
            "Loaded snapshot from {}: {} users, {} accounts, {} transactions, {} insights",
            dir.display(),
            snapshot.users.len(),
            snapshot.accounts.len(),
            snapshot.transactions.len(),
            snapshot.insights.len(),
        );
        Ok(snapshot)
    }

    /// Small, fully cross-referenced snapshot for tests.
    ///
    /// user-001 (US) owns acc-001 and acc-002; user-002 (UK) owns acc-003;
    /// user-003 (FR) owns nothing. Transactions txn-001..004 sit on acc-001,
    /// txn-005 on acc-002, txn-006/007 on acc-003. Three of the five
    /// insights are actionable with medium/high severity.
    pub fn default_test() -> Self {
        let users = vec![
            test_user("user-001", "john.doe@example.com", "John", "Doe", "US"),
            test_user("user-002", "jane.smith@example.co.uk", "Jane", "Smith", "UK"),
            test_user("user-003", "francois@example.fr", "François", "Dubois", "FR"),
        ];

        let accounts = vec![
            test_account("acc-001", "user-001", "checking", "Main Checking", 1500.50, None),
            test_account("acc-002", "user-001", "credit", "Rewards Card", -420.10, Some(5000.0)),
            test_account("acc-003", "user-002", "savings", "Rainy Day", 25000.0, None),
        ];

        let transactions = vec![
            test_txn("txn-001", "acc-001", day(2024, 12, 10), -50.0, "shopping", "Online Store"),
            test_txn("txn-002", "acc-001", day(2024, 12, 8), -12.5, "dining", "Corner Cafe"),
            test_txn("txn-003", "acc-001", day(2024, 12, 9), 2500.0, "income", "Employer Inc"),
            test_txn("txn-004", "acc-001", day(2024, 12, 9), -80.0, "groceries", "FreshMart"),
            test_txn("txn-005", "acc-002", day(2024, 12, 11), -199.99, "shopping", "Gadget Hub"),
            test_txn("txn-006", "acc-003", day(2024, 12, 12), -35.0, "shopping", "High Street"),
            test_txn("txn-007", "acc-003", day(2024, 12, 1), 100.0, "transfer", "Savings Sweep"),
        ];

        let insights = vec![
            test_insight("ins-001", "user-001", "spending", "high", true, "Dining Spend Spike"),
            test_insight("ins-002", "user-001", "saving", "low", true, "Round-up Opportunity"),
            test_insight("ins-003", "user-002", "budget", "medium", true, "Budget Nearly Reached"),
            test_insight("ins-004", "user-001", "trend", "high", false, "Income Trend"),
            test_insight("ins-005", "user-001", "recommendation", "medium", true, "Refinance Card Balance"),
        ];

        Self { users, accounts, transactions, insights }
    }
}

fn read_array<T: DeserializeOwned>(path: &Path) -> LoadResult<Vec<T>> {
    let shown = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: shown.clone(), source })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse { path: shown, source })
}

// ── Test fixture builders ──────────────────────────────────────────

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn test_user(id: &str, email: &str, first: &str, last: &str, country: &str) -> User {
    User {
        id: id.into(),
        email: email.into(),
        name: format!("{first} {last}"),
        first_name: first.into(),
        last_name: last.into(),
        country: country.into(),
        created_at: day(2023, 1, 15),
        last_login: Some(day(2024, 12, 12)),
    }
}

fn test_account(
    id: &str,
    user_id: &str,
    account_type: &str,
    name: &str,
    balance: f64,
    credit_limit: Option<f64>,
) -> Account {
    Account {
        id: id.into(),
        user_id: user_id.into(),
        account_number: format!("****{}", &id[id.len() - 3..]),
        account_type: account_type.into(),
        account_name: name.into(),
        balance,
        currency: "USD".into(),
        credit_limit,
        status: "active".into(),
        opened_date: day(2023, 2, 1),
        last_activity: day(2024, 12, 12),
    }
}

fn test_txn(
    id: &str,
    account_id: &str,
    date: DateTime<Utc>,
    amount: f64,
    category: &str,
    merchant: &str,
) -> Transaction {
    Transaction {
        id: id.into(),
        account_id: account_id.into(),
        date,
        description: format!("{merchant} {category}"),
        amount,
        category: category.into(),
        merchant: merchant.into(),
        status: "completed".into(),
        txn_type: if amount < 0.0 { "debit" } else { "credit" }.into(),
    }
}

fn test_insight(
    id: &str,
    user_id: &str,
    insight_type: &str,
    severity: &str,
    actionable: bool,
    title: &str,
) -> Insight {
    Insight {
        id: id.into(),
        user_id: user_id.into(),
        insight_type: insight_type.into(),
        category: "budget".into(),
        title: title.into(),
        description: format!("{title} for this month"),
        severity: severity.into(),
        created_at: day(2024, 12, 12),
        actionable,
        recommendation: actionable.then(|| "Review this in the app".to_string()),
    }
}
