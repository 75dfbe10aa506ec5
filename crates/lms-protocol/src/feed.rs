//! Sorting, filtering, grouping and merging of normalized activities

use indexmap::IndexMap;
use lms_types::{ActionKind, NormalizedActivity, Severity, TypesError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Either every value passes, or only one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterChoice<T> {
    /// No restriction
    All,
    /// Only this value passes
    Only(T),
}

impl<T> Default for FilterChoice<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> FilterChoice<T> {
    /// Whether `value` passes this choice
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr<Err = TypesError>> FromStr for FilterChoice<T> {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Action-kind filter
pub type KindFilter = FilterChoice<ActionKind>;

/// Severity filter
pub type SeverityFilter = FilterChoice<Severity>;

/// Conjunctive predicate applied before grouping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
    /// Case-insensitive substring matched against actor, subject and id
    #[serde(default)]
    pub search: String,

    /// Restrict to one action kind
    #[serde(default)]
    pub action_kind: KindFilter,

    /// Restrict to one severity
    #[serde(default)]
    pub severity: SeverityFilter,

    /// Restrict to one actor (case-insensitive exact match)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl ActivityFilter {
    /// Filter that lets everything through
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Set the search text
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Restrict to one action kind
    #[must_use]
    pub const fn with_action_kind(mut self, kind: KindFilter) -> Self {
        self.action_kind = kind;
        self
    }

    /// Restrict to one severity
    #[must_use]
    pub const fn with_severity(mut self, severity: SeverityFilter) -> Self {
        self.severity = severity;
        self
    }

    /// Restrict to one actor
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Whether `activity` satisfies every clause
    #[must_use]
    pub fn matches(&self, activity: &NormalizedActivity) -> bool {
        self.matches_search(activity)
            && self.action_kind.matches(&activity.action_kind)
            && self.severity.matches(&activity.severity)
            && self
                .actor
                .as_deref()
                .is_none_or(|actor| actor.eq_ignore_ascii_case(&activity.actor))
    }

    fn matches_search(&self, activity: &NormalizedActivity) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&activity.actor, &activity.subject_label, &activity.id]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Stable sort, newest first; ties keep their existing order
pub fn sort_by_recency(activities: &mut [NormalizedActivity]) {
    activities.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
}

/// Filter, sort newest-first, then group by `key_fn`
///
/// Groups iterate in first-seen key order, which for date buckets means
/// today, then yesterday, then older days.
pub fn filter_and_group<F>(
    activities: &[NormalizedActivity],
    filter: &ActivityFilter,
    key_fn: F,
) -> IndexMap<String, Vec<NormalizedActivity>>
where
    F: Fn(&NormalizedActivity) -> String,
{
    let mut visible: Vec<NormalizedActivity> = activities
        .iter()
        .filter(|activity| filter.matches(activity))
        .cloned()
        .collect();
    sort_by_recency(&mut visible);

    let mut groups: IndexMap<String, Vec<NormalizedActivity>> = IndexMap::new();
    for activity in visible {
        groups.entry(key_fn(&activity)).or_default().push(activity);
    }
    groups
}

/// [`filter_and_group`] keyed by each activity's date bucket
pub fn filter_and_group_by_date(
    activities: &[NormalizedActivity],
    filter: &ActivityFilter,
) -> IndexMap<String, Vec<NormalizedActivity>> {
    filter_and_group(activities, filter, |activity| activity.date_bucket.clone())
}

/// Concatenate groups in iteration order
#[must_use]
pub fn flatten_groups(groups: IndexMap<String, Vec<NormalizedActivity>>) -> Vec<NormalizedActivity> {
    groups.into_values().flatten().collect()
}

/// Merge a freshly fetched batch into the held list
///
/// Records are deduplicated on `id`, with the incoming copy replacing the
/// held one, and the result is re-sorted newest-first.
#[must_use]
pub fn merge_batch(
    existing: Vec<NormalizedActivity>,
    incoming: Vec<NormalizedActivity>,
) -> Vec<NormalizedActivity> {
    let mut by_id: IndexMap<String, NormalizedActivity> =
        IndexMap::with_capacity(existing.len() + incoming.len());
    for activity in existing.into_iter().chain(incoming) {
        by_id.insert(activity.id.clone(), activity);
    }

    let mut merged: Vec<NormalizedActivity> = by_id.into_values().collect();
    sort_by_recency(&mut merged);
    merged
}
