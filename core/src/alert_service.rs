use crate::{
    access::{require_feature, Caller},
    error::QueryResult,
    flags::{FeatureFlags, Flag},
    model::Alert,
    store::EntityStore,
};
use std::sync::Arc;

pub struct AlertService {
    store: Arc<EntityStore>,
    flags: Arc<FeatureFlags>,
}

impl AlertService {
    pub fn new(store: Arc<EntityStore>, flags: Arc<FeatureFlags>) -> Self {
        Self { store, flags }
    }

    /// The caller's derived alerts. Gated on `alerts_enabled`, checked
    /// before the repository is read.
    pub fn list_for_caller(&self, caller: &Caller) -> QueryResult<Vec<Alert>> {
        let flags = self.flags.snapshot()?;
        require_feature(&flags, Flag::AlertsEnabled).inspect_err(|_| {
            log::warn!("Alerts requested while disabled: user_id={}", caller.user_id)
        })?;
        self.store.alerts_for_user(&caller.user_id)
    }
}
