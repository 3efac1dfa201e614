//! Access-control gate: who is calling, may they see this, is the feature on.
//!
//! RULE: every service operation resolves a `Caller` before touching data.
//! Ownership mismatches are `Forbidden`; absent entities are `NotFound`.

use crate::{
    error::{QueryError, QueryResult},
    flags::{Flag, FlagSet},
    store::EntityStore,
    types::{EntityKind, UserId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Request headers with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct RequestHeaders {
    entries: HashMap<String, String>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Trimmed header value. Blank counts as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Headers identifying `user_id` directly.
    pub fn for_user(user_id: &str) -> Self {
        Self::new().with(USER_ID_HEADER, user_id)
    }
}

impl From<HashMap<String, String>> for RequestHeaders {
    fn from(raw: HashMap<String, String>) -> Self {
        let mut headers = Self::new();
        for (name, value) in raw {
            headers.insert(&name, value);
        }
        headers
    }
}

impl From<RequestHeaders> for HashMap<String, String> {
    fn from(headers: RequestHeaders) -> Self {
        headers.entries
    }
}

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
}

impl Caller {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self { user_id: user_id.into() }
    }
}

/// Resolves request headers into a caller.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &RequestHeaders) -> QueryResult<Caller>;
}

/// Trusts an upstream gateway that has already verified the caller and
/// forwards `X-User-ID`, or `X-User-Email` for deployments keyed by email.
pub struct HeaderAuthenticator {
    store: Arc<EntityStore>,
}

impl HeaderAuthenticator {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }
}

impl Authenticator for HeaderAuthenticator {
    fn authenticate(&self, headers: &RequestHeaders) -> QueryResult<Caller> {
        if let Some(user_id) = headers.get(USER_ID_HEADER) {
            return Ok(Caller::new(user_id));
        }
        if let Some(email) = headers.get(USER_EMAIL_HEADER) {
            return match self.store.user_by_email(email)? {
                Some(user) => Ok(Caller::new(user.id)),
                None => {
                    log::warn!("Authentication failed: no user for email={email}");
                    Err(QueryError::Unauthenticated)
                }
            };
        }
        Err(QueryError::Unauthenticated)
    }
}

/// `Forbidden` unless `owner_id` is the caller.
pub fn ensure_owner(caller: &Caller, owner_id: &str, kind: EntityKind, id: &str) -> QueryResult<()> {
    if caller.user_id == owner_id {
        return Ok(());
    }
    log::warn!(
        "Access denied: user_id={} {kind}_id={id} owner={owner_id}",
        caller.user_id
    );
    Err(QueryError::Forbidden { kind, id: id.to_string() })
}

/// `FeatureDisabled` unless `flag` is on in this request's snapshot.
pub fn require_feature(flags: &FlagSet, flag: Flag) -> QueryResult<()> {
    if flags.is_enabled(flag) {
        Ok(())
    } else {
        Err(QueryError::FeatureDisabled { flag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    fn authenticator() -> HeaderAuthenticator {
        let store = EntityStore::from_snapshot(Snapshot::default_test()).unwrap();
        HeaderAuthenticator::new(Arc::new(store))
    }

    #[test]
    fn user_id_header_is_case_insensitive() {
        let headers = RequestHeaders::new().with("X-User-ID", "user-002");
        let caller = authenticator().authenticate(&headers).unwrap();
        assert_eq!(caller.user_id, "user-002");
    }

    #[test]
    fn email_header_resolves_through_the_store() {
        let headers = RequestHeaders::new().with("X-USER-EMAIL", "john.doe@example.com");
        let caller = authenticator().authenticate(&headers).unwrap();
        assert_eq!(caller, Caller::new("user-001"));

        let unknown = RequestHeaders::new().with(USER_EMAIL_HEADER, "nobody@example.com");
        assert_eq!(
            authenticator().authenticate(&unknown),
            Err(QueryError::Unauthenticated)
        );
    }

    #[test]
    fn missing_or_blank_headers_are_unauthenticated() {
        let auth = authenticator();
        assert_eq!(auth.authenticate(&RequestHeaders::new()), Err(QueryError::Unauthenticated));
        let blank = RequestHeaders::new().with(USER_ID_HEADER, "   ");
        assert_eq!(auth.authenticate(&blank), Err(QueryError::Unauthenticated));
    }

    #[test]
    fn headers_deserialize_from_a_plain_map() {
        let headers: RequestHeaders =
            serde_json::from_str(r#"{"X-User-Id": "user-001"}"#).unwrap();
        assert_eq!(headers.get("x-user-id"), Some("user-001"));
    }

    #[test]
    fn ownership_and_feature_checks() {
        let caller = Caller::new("user-001");
        assert!(ensure_owner(&caller, "user-001", EntityKind::Account, "acc-001").is_ok());
        assert_eq!(
            ensure_owner(&caller, "user-002", EntityKind::Account, "acc-003"),
            Err(QueryError::Forbidden { kind: EntityKind::Account, id: "acc-003".into() })
        );

        let off = FlagSet::new().with(Flag::AlertsEnabled, false);
        assert_eq!(
            require_feature(&off, Flag::AlertsEnabled),
            Err(QueryError::FeatureDisabled { flag: Flag::AlertsEnabled })
        );
        assert!(require_feature(&FlagSet::new(), Flag::AlertsEnabled).is_ok());
    }
}
