//! Deployment configuration: which service this process is and where its
//! snapshot lives.
//!
//! Resolution order, last wins: built-in defaults, environment
//! (`DATA_PATH`, `SERVICE`), command-line (`--data-dir`, `--service`).
//! Feature flags come from `FEATURE_*` variables.

use crate::{
    flags::FlagSet,
    request::Request,
    snapshot::Dataset,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_PATH: &str = "./data/seed";

/// The deployable surfaces. `All` serves everything from one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Accounts,
    Transactions,
    Insights,
    All,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Accounts     => "accounts",
            Service::Transactions => "transactions",
            Service::Insights     => "insights",
            Service::All          => "all",
        }
    }

    /// Snapshot files this service needs at startup.
    pub fn datasets(&self) -> &'static [Dataset] {
        match self {
            Service::Accounts     => &[Dataset::Users, Dataset::Accounts],
            Service::Transactions => &[Dataset::Accounts, Dataset::Transactions],
            Service::Insights     => &[Dataset::Insights],
            Service::All          => &Dataset::ALL,
        }
    }

    pub fn serves(&self, request: &Request) -> bool {
        match request {
            Request::Health => true,
            Request::Me | Request::ListAccounts | Request::GetAccount { .. } => {
                matches!(self, Service::Accounts | Service::All)
            }
            Request::ListTransactions(_) | Request::GetTransaction { .. } => {
                matches!(self, Service::Transactions | Service::All)
            }
            Request::ListInsights | Request::GetInsight { .. } | Request::ListAlerts => {
                matches!(self, Service::Insights | Service::All)
            }
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accounts" | "accounts-service"         => Ok(Service::Accounts),
            "transactions" | "transactions-service" => Ok(Service::Transactions),
            "insights" | "insights-service"         => Ok(Service::Insights),
            "all" | ""                              => Ok(Service::All),
            other => Err(anyhow::anyhow!(
                "Unknown service '{other}' (expected accounts, transactions, insights or all)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub service:  Service,
    pub data_dir: PathBuf,
    pub flags:    FlagSet,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service:  Service::All,
            data_dir: PathBuf::from(DEFAULT_DATA_PATH),
            flags:    FlagSet::new(),
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup("DATA_PATH").filter(|p| !p.is_empty()) {
            config.data_dir = PathBuf::from(path);
        }
        if let Some(service) = lookup("SERVICE") {
            config.service = service
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SERVICE: {e}"))?;
        }
        config.flags.apply_env(&lookup);
        Ok(config)
    }

    /// Apply `--data-dir` and `--service` from a raw argument list.
    pub fn with_args(mut self, args: &[String]) -> anyhow::Result<Self> {
        if let Some(dir) = arg_value(args, "--data-dir") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(service) = arg_value(args, "--service") {
            self.service = service
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid --service: {e}"))?;
        }
        Ok(self)
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
