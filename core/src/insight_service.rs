use crate::{
    access::{ensure_owner, Caller},
    error::{QueryError, QueryResult},
    flags::FeatureFlags,
    model::Insight,
    shaping::shape_insight,
    store::EntityStore,
    types::EntityKind,
};
use std::sync::Arc;

pub struct InsightService {
    store: Arc<EntityStore>,
    flags: Arc<FeatureFlags>,
}

impl InsightService {
    pub fn new(store: Arc<EntityStore>, flags: Arc<FeatureFlags>) -> Self {
        Self { store, flags }
    }

    pub fn list_for_caller(&self, caller: &Caller) -> QueryResult<Vec<Insight>> {
        let flags = self.flags.snapshot()?;
        let insights = self.store.insights_for_user(&caller.user_id)?;
        Ok(insights.iter().map(|i| shape_insight(i, &flags)).collect())
    }

    pub fn get_for_caller(&self, caller: &Caller, insight_id: &str) -> QueryResult<Insight> {
        let Some(insight) = self.store.insight(insight_id)? else {
            log::warn!(
                "Insight not found: user_id={} insight_id={insight_id}",
                caller.user_id
            );
            return Err(QueryError::not_found(EntityKind::Insight, insight_id));
        };
        ensure_owner(caller, &insight.user_id, EntityKind::Insight, insight_id)?;

        let flags = self.flags.snapshot()?;
        Ok(shape_insight(&insight, &flags))
    }
}
