//! Feature flags: named boolean toggles shared by every service.
//!
//! RULE: one `FeatureFlags` is built at startup and handed to each service
//! behind an `Arc`. There is no global instance.
//!
//! Reads take the shared lock. Writes (administrative only) take the
//! exclusive lock, so a reader always sees a fully committed `FlagSet`.
//! Request handlers call `snapshot()` once and shape the whole response
//! from that copy.

use crate::error::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Replace balance and credit limit with a placeholder.
    MaskAmounts,
    /// Derive the response currency from the caller's country.
    LocalizedCurrency,
    /// Honour date, category and amount constraints on transaction lists.
    AdvancedFilters,
    /// Serve insights from the V2 algorithm.
    InsightsV2,
    /// Expose the alerts endpoint.
    AlertsEnabled,
}

impl Flag {
    pub const ALL: [Flag; 5] = [
        Flag::MaskAmounts,
        Flag::LocalizedCurrency,
        Flag::AdvancedFilters,
        Flag::InsightsV2,
        Flag::AlertsEnabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::MaskAmounts       => "mask_amounts",
            Flag::LocalizedCurrency => "localized_currency",
            Flag::AdvancedFilters   => "advanced_filters",
            Flag::InsightsV2        => "insights_v2",
            Flag::AlertsEnabled     => "alerts_enabled",
        }
    }

    /// Value a flag has until something sets it.
    pub fn default_value(&self) -> bool {
        match self {
            Flag::MaskAmounts       => false,
            Flag::LocalizedCurrency => true,
            Flag::AdvancedFilters   => false,
            Flag::InsightsV2        => false,
            Flag::AlertsEnabled     => true,
        }
    }

    /// Environment variable read once at startup.
    pub fn env_var(&self) -> &'static str {
        match self {
            Flag::MaskAmounts       => "FEATURE_MASK_AMOUNTS",
            Flag::LocalizedCurrency => "FEATURE_LOCALIZED_CURRENCY",
            Flag::AdvancedFilters   => "FEATURE_ADVANCED_FILTERS",
            Flag::InsightsV2        => "FEATURE_INSIGHTS_V2",
            Flag::AlertsEnabled     => "FEATURE_ALERTS_ENABLED",
        }
    }

    /// Human-readable capability name for error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Flag::MaskAmounts       => "Amount masking",
            Flag::LocalizedCurrency => "Localized currency",
            Flag::AdvancedFilters   => "Advanced filtering",
            Flag::InsightsV2        => "Insights V2",
            Flag::AlertsEnabled     => "Alerts feature",
        }
    }

    /// Name the flag was registered under in the flag dashboard.
    fn dashboard_name(&self) -> &'static str {
        match self {
            Flag::MaskAmounts       => "api.maskAmounts",
            Flag::LocalizedCurrency => "api.localizedCurrency",
            Flag::AdvancedFilters   => "api.advancedFilters",
            Flag::InsightsV2        => "api.insightsV2",
            Flag::AlertsEnabled     => "api.alertsEnabled",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flag::ALL
            .into_iter()
            .find(|f| f.as_str() == s || f.dashboard_name() == s)
            .ok_or_else(|| QueryError::invalid("flag", format!("unknown flag '{s}'")))
    }
}

/// A complete assignment of flags. Unset flags read as their default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet {
    values: BTreeMap<Flag, bool>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, flag: Flag) -> bool {
        self.values.get(&flag).copied().unwrap_or_else(|| flag.default_value())
    }

    pub fn set(&mut self, flag: Flag, enabled: bool) {
        self.values.insert(flag, enabled);
    }

    /// Builder form, mostly for tests and fixtures.
    pub fn with(mut self, flag: Flag, enabled: bool) -> Self {
        self.set(flag, enabled);
        self
    }

    /// Every flag with its effective value, defaults included.
    pub fn effective(&self) -> BTreeMap<Flag, bool> {
        Flag::ALL.into_iter().map(|f| (f, self.is_enabled(f))).collect()
    }

    /// Overlay values from `FEATURE_*` variables via `lookup`.
    /// Unparsable values are ignored and the flag keeps its current value.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for flag in Flag::ALL {
            let Some(raw) = lookup(flag.env_var()) else { continue };
            if raw.is_empty() {
                continue;
            }
            match parse_bool(&raw) {
                Some(v) => self.set(flag, v),
                None => log::warn!(
                    "Ignoring {}={raw:?}: not a boolean, keeping {}",
                    flag.env_var(),
                    self.is_enabled(flag)
                ),
            }
        }
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut set = FlagSet::new();
        set.apply_env(|key| std::env::var(key).ok());
        set
    }
}

/// Boolean spellings accepted in `FEATURE_*` variables.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Process-local flag store. Cheap to read, rarely written.
#[derive(Debug, Default)]
pub struct FeatureFlags {
    inner: RwLock<FlagSet>,
}

impl FeatureFlags {
    pub fn new(initial: FlagSet) -> Self {
        log::info!(
            "Feature flags initialized: {}",
            describe(&initial.effective())
        );
        Self { inner: RwLock::new(initial) }
    }

    pub fn from_env() -> Self {
        Self::new(FlagSet::from_env())
    }

    pub fn is_enabled(&self, flag: Flag) -> QueryResult<bool> {
        Ok(self.read()?.is_enabled(flag))
    }

    /// Consistent copy for the lifetime of one request.
    pub fn snapshot(&self) -> QueryResult<FlagSet> {
        Ok(self.read()?.clone())
    }

    pub fn set(&self, flag: Flag, enabled: bool) -> QueryResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| QueryError::Internal("flag store lock poisoned".into()))?;
        guard.set(flag, enabled);
        log::info!("Feature flag updated: {flag}={enabled}");
        Ok(())
    }

    /// Swap every flag in one critical section.
    pub fn replace(&self, flags: FlagSet) -> QueryResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| QueryError::Internal("flag store lock poisoned".into()))?;
        log::info!("Feature flags replaced: {}", describe(&flags.effective()));
        *guard = flags;
        Ok(())
    }

    fn read(&self) -> QueryResult<std::sync::RwLockReadGuard<'_, FlagSet>> {
        self.inner
            .read()
            .map_err(|_| QueryError::Internal("flag store lock poisoned".into()))
    }
}

fn describe(values: &BTreeMap<Flag, bool>) -> String {
    values
        .iter()
        .map(|(f, v)| format!("{f}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}
