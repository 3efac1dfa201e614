use super::{group_by, index_by_id, EntityStore};
use crate::{
    error::{LoadError, LoadResult, QueryResult},
    model::{Alert, Insight, Priority},
    types::EntityKind,
};

/// Severities that raise an alert when the insight is actionable.
const ALERTING_SEVERITIES: [&str; 2] = ["medium", "high"];

/// Build the alert set for `insights`.
///
/// One alert per actionable insight with medium or high severity. Ids are
/// `alert-001`, `alert-002`, ... in the order the insights are given, so the
/// same insight slice always yields the same alerts.
pub fn derive_alerts(insights: &[Insight]) -> Vec<Alert> {
    insights
        .iter()
        .filter(|i| i.actionable && ALERTING_SEVERITIES.contains(&i.severity.as_str()))
        .enumerate()
        .map(|(n, insight)| Alert {
            id: format!("alert-{:03}", n + 1),
            user_id: insight.user_id.clone(),
            alert_type: insight.insight_type.clone(),
            title: insight.title.clone(),
            message: insight.description.clone(),
            priority: Priority::from_severity(&insight.severity),
            created_at: insight.created_at,
            read: false,
            action_url: None,
        })
        .collect()
}

impl EntityStore {
    // ── Insight ───────────────────────────────────────────────────

    pub fn insight(&self, insight_id: &str) -> QueryResult<Option<Insight>> {
        let inner = self.read()?;
        Ok(inner.insight_idx.get(insight_id).map(|&i| inner.insights[i].clone()))
    }

    pub fn insights_for_user(&self, user_id: &str) -> QueryResult<Vec<Insight>> {
        let inner = self.read()?;
        Ok(inner
            .insights_by_user
            .get(user_id)
            .map(|positions| positions.iter().map(|&i| inner.insights[i].clone()).collect())
            .unwrap_or_default())
    }

    // ── Alert ─────────────────────────────────────────────────────

    /// One-time generation of derived alerts from the loaded insights.
    /// Returns the number of alerts created. Must follow `load`.
    pub fn derive_alerts(&self) -> LoadResult<usize> {
        let mut inner = self.write()?;
        if !inner.loaded {
            return Err(LoadError::NotLoaded);
        }
        if inner.alerts_derived {
            return Err(LoadError::AlreadyLoaded("holds derived alerts"));
        }

        let alerts = derive_alerts(&inner.insights);
        inner.alert_idx = index_by_id(&alerts, EntityKind::Alert, |a| &a.id)?;
        inner.alerts_by_user = group_by(&alerts, |a| &a.user_id);
        inner.alerts = alerts;
        inner.alerts_derived = true;

        log::info!(
            "Generated {} alerts from {} insights",
            inner.alerts.len(),
            inner.insights.len()
        );
        Ok(inner.alerts.len())
    }

    pub fn alerts_for_user(&self, user_id: &str) -> QueryResult<Vec<Alert>> {
        let inner = self.read()?;
        Ok(inner
            .alerts_by_user
            .get(user_id)
            .map(|positions| positions.iter().map(|&i| inner.alerts[i].clone()).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    #[test]
    fn only_actionable_medium_and_high_insights_alert() {
        let insights = Snapshot::default_test().insights;
        let alerts = derive_alerts(&insights);

        let sources: Vec<&str> = alerts.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            sources,
            ["Dining Spend Spike", "Budget Nearly Reached", "Refinance Card Balance"]
        );
        assert_eq!(alerts[0].id, "alert-001");
        assert_eq!(alerts[2].id, "alert-003");
        assert!(alerts.iter().all(|a| !a.read && a.action_url.is_none()));
    }

    #[test]
    fn severity_maps_to_priority() {
        assert_eq!(Priority::from_severity("high"), Priority::Critical);
        assert_eq!(Priority::from_severity("medium"), Priority::High);
        assert_eq!(Priority::from_severity("warning"), Priority::Medium);
    }
}
