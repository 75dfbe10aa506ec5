//! Page state containers with pure reducer transitions
//!
//! Every page holds one [`FeedState`]. All changes go through
//! [`FeedState::reduce`], which consumes the old state and returns the next
//! one; the derived views ([`FeedState::visible`], [`FeedState::grouped`])
//! are recomputed from it on demand.

use indexmap::IndexMap;
use lms_protocol::{
    ActivityFilter, KindFilter, SeverityFilter, filter_and_group_by_date, flatten_groups,
    merge_batch, sort_by_recency,
};
use lms_types::{NormalizedActivity, SourceKind};
use serde::Serialize;

/// How prominently a notification is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Part of the page failed to load
    Warning,
    /// Nothing could be loaded
    Error,
}

/// Non-blocking message surfaced to the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Identifier used for dismissal
    pub id: u64,
    /// Severity of the message
    pub level: NotificationLevel,
    /// Human-readable message
    pub message: String,
}

/// Transitions a page can go through
#[derive(Debug, Clone, PartialEq)]
pub enum FeedAction {
    /// A fetch was issued
    FetchStarted,
    /// A fetch completed; replaces the held list
    FetchSucceeded(Vec<NormalizedActivity>),
    /// One source failed while others may still have loaded
    SourceFailed {
        /// The failed source
        source: SourceKind,
        /// Failure description
        message: String,
    },
    /// The whole fetch failed; the list is cleared
    FetchFailed(String),
    /// Every source failed during a poll; the held list is kept
    PollFailed(String),
    /// A poll produced a batch to merge into the held list
    BatchMerged(Vec<NormalizedActivity>),
    /// Search text changed
    SearchChanged(String),
    /// Action-kind filter changed
    KindFilterChanged(KindFilter),
    /// Severity filter changed
    SeverityFilterChanged(SeverityFilter),
    /// Actor filter changed; `None` clears it
    ActorFilterChanged(Option<String>),
    /// An activity was opened for detail view
    Selected(String),
    /// Detail view closed
    SelectionCleared,
    /// A notification was dismissed
    NotificationDismissed(u64),
}

/// State of one feed page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    activities: Vec<NormalizedActivity>,
    filter: ActivityFilter,
    loading: bool,
    selected: Option<String>,
    notifications: Vec<Notification>,
    next_notification_id: u64,
    limit: Option<usize>,
}

impl FeedState {
    /// Empty state with an initial filter
    #[must_use]
    pub fn with_filter(filter: ActivityFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Keep at most `limit` activities, newest first
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply `action`, producing the next state
    #[must_use]
    pub fn reduce(mut self, action: FeedAction) -> Self {
        match action {
            FeedAction::FetchStarted => {
                self.loading = true;
            }
            FeedAction::FetchSucceeded(mut activities) => {
                sort_by_recency(&mut activities);
                self.activities = activities;
                self.apply_limit();
                self.loading = false;
                self.retain_selection();
            }
            FeedAction::SourceFailed { source, message } => {
                self.push_notification(
                    NotificationLevel::Warning,
                    format!("Gagal memuat data {source}: {message}"),
                );
            }
            FeedAction::FetchFailed(message) => {
                self.activities.clear();
                self.loading = false;
                self.selected = None;
                self.push_notification(NotificationLevel::Error, message);
            }
            FeedAction::PollFailed(message) => {
                self.push_notification(NotificationLevel::Error, message);
            }
            FeedAction::BatchMerged(incoming) => {
                self.activities = merge_batch(std::mem::take(&mut self.activities), incoming);
                self.apply_limit();
                self.retain_selection();
            }
            FeedAction::SearchChanged(search) => {
                self.filter.search = search;
            }
            FeedAction::KindFilterChanged(kind) => {
                self.filter.action_kind = kind;
            }
            FeedAction::SeverityFilterChanged(severity) => {
                self.filter.severity = severity;
            }
            FeedAction::ActorFilterChanged(actor) => {
                self.filter.actor = actor.filter(|actor| !actor.trim().is_empty());
            }
            FeedAction::Selected(id) => {
                if self.activities.iter().any(|activity| activity.id == id) {
                    self.selected = Some(id);
                }
            }
            FeedAction::SelectionCleared => {
                self.selected = None;
            }
            FeedAction::NotificationDismissed(id) => {
                self.notifications.retain(|notification| notification.id != id);
            }
        }
        self
    }

    /// Every held activity, newest first, ignoring the filter
    #[must_use]
    pub fn activities(&self) -> &[NormalizedActivity] {
        &self.activities
    }

    /// Mutable access for display refreshes that keep order and ids
    pub fn activities_mut(&mut self) -> &mut [NormalizedActivity] {
        &mut self.activities
    }

    /// Current filter
    #[must_use]
    pub const fn filter(&self) -> &ActivityFilter {
        &self.filter
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Pending notifications, oldest first
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// The activity open in detail view
    #[must_use]
    pub fn selected(&self) -> Option<&NormalizedActivity> {
        let id = self.selected.as_deref()?;
        self.activities.iter().find(|activity| activity.id == id)
    }

    /// Filtered activities grouped by date bucket
    #[must_use]
    pub fn grouped(&self) -> IndexMap<String, Vec<NormalizedActivity>> {
        filter_and_group_by_date(&self.activities, &self.filter)
    }

    /// Filtered activities as one list, in display order
    #[must_use]
    pub fn visible(&self) -> Vec<NormalizedActivity> {
        flatten_groups(self.grouped())
    }

    /// Queue a notification unless an identical one is still pending
    fn push_notification(&mut self, level: NotificationLevel, message: String) {
        if self
            .notifications
            .iter()
            .any(|pending| pending.level == level && pending.message == message)
        {
            return;
        }
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id: self.next_notification_id,
            level,
            message,
        });
    }

    fn apply_limit(&mut self) {
        if let Some(limit) = self.limit {
            self.activities.truncate(limit);
        }
    }

    fn retain_selection(&mut self) {
        if let Some(ref id) = self.selected
            && !self.activities.iter().any(|activity| &activity.id == id)
        {
            self.selected = None;
        }
    }
}
