//! finview-core: a read-only, multi-tenant query layer over a snapshot of
//! users, accounts, transactions and insights.
//!
//! Layering, bottom up:
//!   store      indexed in-memory repository, loaded once
//!   filter     transaction predicates and parameter parsing
//!   access     caller identity, ownership and feature gates
//!   shaping    per-request response transformation
//!   *_service  one per entity family, composing the above
//!   app        wiring, request dispatch, administrative commands

pub mod access;
pub mod account_service;
pub mod alert_service;
pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod flags;
pub mod insight_service;
pub mod model;
pub mod request;
pub mod shaping;
pub mod snapshot;
pub mod store;
pub mod transaction_service;
pub mod types;
pub mod user_service;
