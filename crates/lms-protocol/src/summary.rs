//! Display-only aggregates over a feed

use crate::time::TimeDisplay;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use lms_types::{ActionKind, NormalizedActivity, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Counts shown above an activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Number of activities
    pub total: usize,
    /// Count per action kind, every kind present in declaration order
    pub by_kind: IndexMap<ActionKind, usize>,
    /// Count per severity, every severity present in declaration order
    pub by_severity: IndexMap<Severity, usize>,
    /// Activities on the viewer's current calendar day
    pub today: usize,
    /// Number of distinct actors
    pub distinct_actors: usize,
}

impl ActivitySummary {
    /// Aggregate `activities` as seen at `now`
    #[must_use]
    pub fn from_activities(
        activities: &[NormalizedActivity],
        display: &TimeDisplay,
        now: DateTime<Utc>,
    ) -> Self {
        let mut by_kind: IndexMap<ActionKind, usize> =
            ActionKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        let mut by_severity: IndexMap<Severity, usize> =
            Severity::ALL.iter().map(|severity| (*severity, 0)).collect();
        let mut actors = HashSet::new();
        let mut today = 0;

        for activity in activities {
            *by_kind.entry(activity.action_kind).or_default() += 1;
            *by_severity.entry(activity.severity).or_default() += 1;
            actors.insert(activity.actor.as_str());
            if display.is_same_day(activity.occurred_at, now) {
                today += 1;
            }
        }

        Self {
            total: activities.len(),
            by_kind,
            by_severity,
            today,
            distinct_actors: actors.len(),
        }
    }

    /// Count for one severity
    #[must_use]
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or_default()
    }

    /// Count for one action kind
    #[must_use]
    pub fn kind_count(&self, kind: ActionKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or_default()
    }
}
