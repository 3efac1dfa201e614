//! Transaction predicates and the parsing of raw filter parameters.
//!
//! A `TransactionFilter` is a conjunction of optional constraints. Absent
//! constraints are vacuously true; bounds are inclusive.
//!
//! Raw parameters arrive as strings (query-string style). They are parsed
//! into a filter before anything touches the repository, so a bad date or
//! amount is always `InvalidInput` and never a partial result.

use crate::{
    error::{QueryError, QueryResult},
    model::Transaction,
    types::AccountId,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub account_id: Option<AccountId>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date:   Option<DateTime<Utc>>,
    pub category:   Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(account_id) = &self.account_id {
            if &txn.account_id != account_id {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if txn.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if txn.date > end {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &txn.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if txn.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if txn.amount > max {
                return false;
            }
        }
        true
    }

    /// Same constraints, evaluated against one account only.
    pub fn pinned_to(&self, account_id: &str) -> Self {
        Self { account_id: Some(account_id.to_string()), ..self.clone() }
    }

    /// Only the account constraint survives. Used while advanced
    /// filtering is switched off.
    pub fn account_only(&self) -> Self {
        Self { account_id: self.account_id.clone(), ..Self::default() }
    }

    /// Any date, category or amount constraint present.
    pub fn has_advanced(&self) -> bool {
        self.start_date.is_some()
            || self.end_date.is_some()
            || self.category.is_some()
            || self.min_amount.is_some()
            || self.max_amount.is_some()
    }
}

/// Unparsed filter parameters, as received from a request.
/// Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date:   Option<String>,
    #[serde(default)]
    pub category:   Option<String>,
    #[serde(default)]
    pub min_amount: Option<String>,
    #[serde(default)]
    pub max_amount: Option<String>,
}

impl FilterParams {
    pub fn parse(&self) -> QueryResult<TransactionFilter> {
        Ok(TransactionFilter {
            account_id: non_empty(&self.account_id),
            start_date: non_empty(&self.start_date)
                .map(|s| parse_date_param("startDate", &s))
                .transpose()?,
            end_date: non_empty(&self.end_date)
                .map(|s| parse_date_param("endDate", &s))
                .transpose()?,
            category: non_empty(&self.category),
            min_amount: non_empty(&self.min_amount)
                .map(|s| parse_amount_param("minAmount", &s))
                .transpose()?,
            max_amount: non_empty(&self.max_amount)
                .map(|s| parse_amount_param("maxAmount", &s))
                .transpose()?,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_date_param(field: &str, raw: &str) -> QueryResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            QueryError::invalid(field, "use ISO 8601 (YYYY-MM-DD or RFC3339)")
        })
}

pub fn parse_amount_param(field: &str, raw: &str) -> QueryResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| QueryError::invalid(field, "must be a number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn txn(amount: f64, category: &str) -> Transaction {
        Transaction {
            id: "txn-x".into(),
            account_id: "acc-001".into(),
            date: Utc.with_ymd_and_hms(2024, 12, 9, 14, 30, 0).unwrap(),
            description: "test".into(),
            amount,
            category: category.into(),
            merchant: "Somewhere".into(),
            status: "completed".into(),
            txn_type: "debit".into(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = TransactionFilter::default();
        for (amount, category) in [(-50.0, "shopping"), (0.0, ""), (1e9, "income")] {
            assert!(filter.matches(&txn(amount, category)));
        }
    }

    #[test]
    fn amount_range_is_inclusive() {
        let t = txn(-50.0, "shopping");
        let within = TransactionFilter {
            min_amount: Some(-100.0),
            max_amount: Some(-10.0),
            ..Default::default()
        };
        assert!(within.matches(&t));

        let too_low = TransactionFilter { min_amount: Some(-40.0), ..Default::default() };
        assert!(!too_low.matches(&t));

        let edge = TransactionFilter {
            min_amount: Some(-50.0),
            max_amount: Some(-50.0),
            ..Default::default()
        };
        assert!(edge.matches(&t));
    }

    #[test]
    fn each_constraint_rejects_independently() {
        let t = txn(-50.0, "shopping");
        let cases = [
            TransactionFilter { account_id: Some("acc-999".into()), ..Default::default() },
            TransactionFilter { category: Some("dining".into()), ..Default::default() },
            TransactionFilter {
                start_date: Some(Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 0).unwrap()),
                ..Default::default()
            },
            TransactionFilter {
                end_date: Some(Utc.with_ymd_and_hms(2024, 12, 9, 0, 0, 0).unwrap()),
                ..Default::default()
            },
            TransactionFilter { max_amount: Some(-60.0), ..Default::default() },
        ];
        for filter in cases {
            assert!(!filter.matches(&t), "should reject: {filter:?}");
        }
    }

    #[test]
    fn params_parse_dates_and_amounts() {
        let params = FilterParams {
            start_date: Some("2024-12-01".into()),
            end_date: Some("2024-12-31T23:59:59Z".into()),
            min_amount: Some("-100".into()),
            category: Some("".into()),
            ..Default::default()
        };
        let filter = params.parse().unwrap();
        assert_eq!(filter.start_date, Some(Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()));
        assert_eq!(filter.end_date, Some(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()));
        assert_eq!(filter.min_amount, Some(-100.0));
        assert_eq!(filter.category, None);
    }

    #[test]
    fn bad_params_are_invalid_input() {
        let bad_date = FilterParams { start_date: Some("12/01/2024".into()), ..Default::default() };
        match bad_date.parse() {
            Err(QueryError::InvalidInput { field, .. }) => assert_eq!(field, "startDate"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        for raw in ["ten", "NaN", "inf"] {
            let bad_amount = FilterParams { max_amount: Some(raw.into()), ..Default::default() };
            assert_eq!(bad_amount.parse().unwrap_err().status_code(), 400, "{raw}");
        }
    }
}
