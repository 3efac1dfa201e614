//! The bundled seed snapshot loads cleanly and is internally consistent.

use finview_core::{
    app::App,
    config::{Service, ServiceConfig},
    error::LoadError,
    flags::FlagSet,
    snapshot::{Dataset, Snapshot},
    store::EntityStore,
};
use std::path::PathBuf;

fn seed_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data/seed")
}

#[test]
fn seed_snapshot_loads_and_cross_references() {
    let _ = env_logger::builder().is_test(true).try_init();

    let snapshot = Snapshot::load(seed_dir(), &Dataset::ALL).unwrap();
    assert!(!snapshot.users.is_empty());

    for account in &snapshot.accounts {
        assert!(snapshot.users.iter().any(|u| u.id == account.user_id), "{}", account.id);
    }
    for txn in &snapshot.transactions {
        assert!(snapshot.accounts.iter().any(|a| a.id == txn.account_id), "{}", txn.id);
    }

    let store = EntityStore::from_snapshot(snapshot).unwrap();
    let counts = store.counts().unwrap();
    assert_eq!(counts.alerts, 3);
}

#[test]
fn each_service_loads_only_its_datasets() {
    let config = ServiceConfig {
        service: Service::Insights,
        data_dir: seed_dir(),
        flags: FlagSet::new(),
    };
    let app = App::build(&config).unwrap();
    let counts = app.store().counts().unwrap();
    assert_eq!(counts.users, 0);
    assert_eq!(counts.accounts, 0);
    assert!(counts.insights > 0);
}

#[test]
fn missing_directory_is_a_load_error() {
    let err = Snapshot::load("/definitely/not/here", &[Dataset::Users]).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn duplicate_ids_abort_the_load() {
    let mut snapshot = Snapshot::default_test();
    let dup = snapshot.accounts[0].clone();
    snapshot.accounts.push(dup);
    let err = EntityStore::from_snapshot(snapshot).unwrap_err();
    assert!(matches!(err, LoadError::DuplicateId { ref id, .. } if id == "acc-001"));
}
