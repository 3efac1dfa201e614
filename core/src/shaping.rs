//! Response shaping: stored entity in, caller-facing copy out.
//!
//! Every function here is pure in (entity, flag snapshot, caller). Stored
//! entities are only ever borrowed; nothing written here reaches the store.

use crate::{
    flags::{Flag, FlagSet},
    model::{Account, Insight, User},
    types::{AccountId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Placeholder shown instead of a masked monetary value.
pub const MASKED_PLACEHOLDER: &str = "***.**";

/// Suffix marking a title produced by the V2 insights algorithm.
pub const V2_TITLE_SUFFIX: &str = " (V2)";

/// A monetary field as presented to a caller.
///
/// Serialises as a bare number, or as the placeholder string when masked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Numeric(f64),
    Masked,
}

impl Amount {
    pub fn masked(self) -> Self {
        Amount::Masked
    }

    pub fn is_masked(&self) -> bool {
        matches!(self, Amount::Masked)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Amount::Numeric(v) => serializer.serialize_f64(*v),
            Amount::Masked => serializer.serialize_str(MASKED_PLACEHOLDER),
        }
    }
}

/// Per-request inputs to account shaping, resolved once from the flag
/// snapshot and the caller's user record.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountView {
    pub mask_amounts: bool,
    /// `None` keeps each account's stored currency.
    pub currency: Option<String>,
}

impl AccountView {
    pub fn resolve(flags: &FlagSet, caller: Option<&User>) -> Self {
        let currency = match caller {
            Some(user) if flags.is_enabled(Flag::LocalizedCurrency) => {
                Some(currency_for_country(&user.country).to_string())
            }
            _ => None,
        };
        Self { mask_amounts: flags.is_enabled(Flag::MaskAmounts), currency }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: AccountId,
    pub user_id: UserId,
    pub account_number: String,
    pub account_type: String,
    pub account_name: String,
    pub balance: Amount,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Amount>,
    pub status: String,
    pub opened_date: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl AccountResponse {
    pub fn shape(account: &Account, view: &AccountView) -> Self {
        let response = Self {
            id: account.id.clone(),
            user_id: account.user_id.clone(),
            account_number: account.account_number.clone(),
            account_type: account.account_type.clone(),
            account_name: account.account_name.clone(),
            balance: Amount::Numeric(account.balance),
            currency: view.currency.clone().unwrap_or_else(|| account.currency.clone()),
            credit_limit: account.credit_limit.map(Amount::Numeric),
            status: account.status.clone(),
            opened_date: account.opened_date,
            last_activity: account.last_activity,
        };
        if view.mask_amounts {
            response.mask()
        } else {
            response
        }
    }

    /// Hide every monetary field. Masking a masked response changes nothing.
    pub fn mask(self) -> Self {
        Self {
            balance: self.balance.masked(),
            credit_limit: self.credit_limit.map(Amount::masked),
            ..self
        }
    }
}

/// Display currency for a caller's country. Unknown countries get USD.
pub fn currency_for_country(country: &str) -> &'static str {
    match country.to_ascii_uppercase().as_str() {
        "US" => "USD",
        "UK" | "GB" => "GBP",
        "CA" => "CAD",
        "AU" => "AUD",
        "JP" => "JPY",
        "CH" => "CHF",
        "FR" | "DE" | "ES" | "IT" | "NL" | "IE" | "BE" | "PT" | "AT" | "FI" | "GR" | "LU" => "EUR",
        _ => "USD",
    }
}

/// Insight as served under the current flag snapshot.
pub fn shape_insight(insight: &Insight, flags: &FlagSet) -> Insight {
    let mut shaped = insight.clone();
    if flags.is_enabled(Flag::InsightsV2) {
        shaped.title.push_str(V2_TITLE_SUFFIX);
    }
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    fn fixture() -> Snapshot {
        Snapshot::default_test()
    }

    #[test]
    fn unmasked_account_keeps_numbers() {
        let snap = fixture();
        let view = AccountView { mask_amounts: false, currency: None };
        let resp = AccountResponse::shape(&snap.accounts[1], &view);
        assert_eq!(resp.balance, Amount::Numeric(-420.10));
        assert_eq!(resp.credit_limit, Some(Amount::Numeric(5000.0)));
        assert_eq!(resp.currency, "USD");

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["balance"], serde_json::json!(-420.10));
        assert_eq!(json["creditLimit"], serde_json::json!(5000.0));
    }

    #[test]
    fn masking_hides_balance_and_credit_limit_and_is_stable() {
        let snap = fixture();
        let view = AccountView { mask_amounts: true, currency: None };
        let once = AccountResponse::shape(&snap.accounts[1], &view);
        assert!(once.balance.is_masked());
        assert_eq!(once.credit_limit, Some(Amount::Masked));

        let twice = once.clone().mask();
        assert_eq!(once, twice);

        let json = serde_json::to_value(&twice).unwrap();
        assert_eq!(json["balance"], MASKED_PLACEHOLDER);
        assert_eq!(json["creditLimit"], MASKED_PLACEHOLDER);
        assert_eq!(snap.accounts[1].balance, -420.10);
    }

    #[test]
    fn missing_credit_limit_stays_absent_when_masked() {
        let snap = fixture();
        let view = AccountView { mask_amounts: true, currency: None };
        let resp = AccountResponse::shape(&snap.accounts[0], &view);
        assert_eq!(resp.credit_limit, None);
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("creditLimit").is_none());
    }

    #[test]
    fn currency_follows_caller_country_only_when_flag_on() {
        let snap = fixture();
        let uk_user = &snap.users[1];

        let on = AccountView::resolve(&FlagSet::new(), Some(uk_user));
        assert_eq!(on.currency.as_deref(), Some("GBP"));

        let off = AccountView::resolve(
            &FlagSet::new().with(Flag::LocalizedCurrency, false),
            Some(uk_user),
        );
        assert_eq!(off.currency, None);
        assert_eq!(AccountResponse::shape(&snap.accounts[2], &off).currency, "USD");

        let anonymous = AccountView::resolve(&FlagSet::new(), None);
        assert_eq!(anonymous.currency, None);
    }

    #[test]
    fn country_table() {
        assert_eq!(currency_for_country("fr"), "EUR");
        assert_eq!(currency_for_country("JP"), "JPY");
        assert_eq!(currency_for_country("GB"), "GBP");
        assert_eq!(currency_for_country("BR"), "USD");
    }

    #[test]
    fn v2_shaping_works_on_a_copy() {
        let snap = fixture();
        let stored = &snap.insights[0];
        let flags = FlagSet::new().with(Flag::InsightsV2, true);

        let first = shape_insight(stored, &flags);
        let second = shape_insight(stored, &flags);
        assert_eq!(first.title, "Dining Spend Spike (V2)");
        assert_eq!(first, second);
        assert_eq!(stored.title, "Dining Spend Spike");

        let plain = shape_insight(stored, &FlagSet::new());
        assert_eq!(&plain, stored);
    }
}
