//! Generic repository lookups and direct flag-store reads.

use finview_core::{
    error::QueryError,
    flags::{FeatureFlags, Flag, FlagSet},
    model::Entity,
    snapshot::Snapshot,
    store::EntityStore,
    types::EntityKind,
};

fn loaded_store() -> EntityStore {
    EntityStore::from_snapshot(Snapshot::default_test()).unwrap()
}

#[test]
fn get_returns_the_variant_for_each_kind() {
    let store = loaded_store();

    match store.get(EntityKind::User, "user-002").unwrap() {
        Entity::User(user) => assert_eq!(user.country, "UK"),
        other => panic!("expected user, got {other:?}"),
    }
    match store.get(EntityKind::Account, "acc-001").unwrap() {
        Entity::Account(account) => assert_eq!(account.user_id, "user-001"),
        other => panic!("expected account, got {other:?}"),
    }
    match store.get(EntityKind::Transaction, "txn-005").unwrap() {
        Entity::Transaction(txn) => assert_eq!(txn.account_id, "acc-002"),
        other => panic!("expected transaction, got {other:?}"),
    }
    match store.get(EntityKind::Insight, "ins-003").unwrap() {
        Entity::Insight(insight) => assert_eq!(insight.title, "Budget Nearly Reached"),
        other => panic!("expected insight, got {other:?}"),
    }
    match store.get(EntityKind::Alert, "alert-002").unwrap() {
        Entity::Alert(alert) => assert_eq!(alert.user_id, "user-002"),
        other => panic!("expected alert, got {other:?}"),
    }
}

#[test]
fn get_reports_absent_ids_as_not_found() {
    let store = loaded_store();

    let err = store.get(EntityKind::Insight, "ins-999").unwrap_err();
    assert_eq!(err, QueryError::not_found(EntityKind::Insight, "ins-999"));
    assert_eq!(err.status_code(), 404);

    // Ids are per kind: an account id is not a transaction.
    assert!(store.get(EntityKind::Transaction, "acc-001").is_err());

    let err = store.get(EntityKind::Route, "acc-001").unwrap_err();
    assert_eq!(err, QueryError::not_found(EntityKind::Route, "acc-001"));
}

#[test]
fn flag_reads_follow_set_and_replace() {
    let flags = FeatureFlags::new(FlagSet::new());
    for flag in Flag::ALL {
        assert_eq!(flags.is_enabled(flag).unwrap(), flag.default_value(), "{flag}");
    }

    flags.set(Flag::MaskAmounts, true).unwrap();
    assert!(flags.is_enabled(Flag::MaskAmounts).unwrap());

    flags
        .replace(FlagSet::new().with(Flag::AlertsEnabled, false))
        .unwrap();
    assert!(!flags.is_enabled(Flag::AlertsEnabled).unwrap());
    assert!(!flags.is_enabled(Flag::MaskAmounts).unwrap());
    assert!(flags.is_enabled(Flag::LocalizedCurrency).unwrap());
}
