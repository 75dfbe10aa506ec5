//! Loading a page's sources into its state container

use super::PageKind;
use crate::api_client::{ActivityFetcher, ListQuery};
use crate::state::{FeedAction, FeedState};
use chrono::{DateTime, Utc};
use lms_core::{Error, Result};
use lms_protocol::{ActivityFilter, ActivitySummary, Clock, Normalizer, SystemClock};
use lms_types::{NormalizedActivity, SourceKind};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of one refresh or poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Activities received across all sources
    pub loaded: usize,
    /// Sources that failed
    pub failed: Vec<SourceKind>,
}

impl RefreshOutcome {
    /// Whether at least one source loaded
    #[must_use]
    pub fn any_loaded(&self, page: PageKind) -> bool {
        self.failed.len() < page.sources().len()
    }
}

/// Drives one page: fetches its sources, normalizes and feeds [`FeedState`]
///
/// State lives behind a lock so a poller task and a renderer can share it.
/// The lock is never held across a fetch.
pub struct PageController<C: Clock = SystemClock> {
    kind: PageKind,
    fetcher: Arc<dyn ActivityFetcher>,
    normalizer: Normalizer<C>,
    query: ListQuery,
    state: Arc<RwLock<FeedState>>,
}

impl<C: Clock> PageController<C> {
    /// Create a controller for `kind`
    pub fn new(kind: PageKind, fetcher: Arc<dyn ActivityFetcher>, normalizer: Normalizer<C>) -> Self {
        Self {
            kind,
            fetcher,
            normalizer,
            query: ListQuery::default(),
            state: Arc::new(RwLock::new(FeedState::with_filter(kind.default_filter(None)))),
        }
    }

    /// Query parameters sent with every fetch
    #[must_use]
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }

    /// Replace the page's filter
    #[must_use]
    pub fn with_filter(self, filter: ActivityFilter) -> Self {
        {
            let mut state = self.state.write();
            let current = std::mem::take(&mut *state);
            *state = current
                .reduce(FeedAction::SearchChanged(filter.search))
                .reduce(FeedAction::KindFilterChanged(filter.action_kind))
                .reduce(FeedAction::SeverityFilterChanged(filter.severity))
                .reduce(FeedAction::ActorFilterChanged(filter.actor));
        }
        self
    }

    /// Keep only the newest `limit` activities (recent-activity page only)
    #[must_use]
    pub fn with_recent_limit(self, limit: usize) -> Self {
        if self.kind.is_truncated() {
            let mut state = self.state.write();
            let current = std::mem::take(&mut *state);
            *state = current.with_limit(limit);
        }
        self
    }

    /// Which page this is
    #[must_use]
    pub const fn kind(&self) -> PageKind {
        self.kind
    }

    /// Current instant according to the injected clock
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.normalizer.clock().now()
    }

    /// Shared handle to the page state
    #[must_use]
    pub fn state(&self) -> Arc<RwLock<FeedState>> {
        Arc::clone(&self.state)
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> FeedState {
        self.state.read().clone()
    }

    /// Apply one transition to the page state
    pub fn dispatch(&self, action: FeedAction) {
        let mut state = self.state.write();
        let current = std::mem::take(&mut *state);
        *state = current.reduce(action);
    }

    /// Summary for the page header, if this page shows one
    #[must_use]
    pub fn summary(&self) -> Option<ActivitySummary> {
        if !self.kind.shows_summary() {
            return None;
        }
        let state = self.state.read();
        Some(ActivitySummary::from_activities(
            state.activities(),
            &self.normalizer.display(),
            self.now(),
        ))
    }

    /// Replace the page contents with a fresh load of every source
    ///
    /// A failing source becomes a warning notification while the others
    /// still load; if every source fails the list is cleared with an error
    /// notification.
    #[instrument(skip(self), fields(page = %self.kind))]
    pub async fn refresh(&self) -> RefreshOutcome {
        self.dispatch(FeedAction::FetchStarted);

        let (activities, failures) = self.load_sources().await;
        let outcome = RefreshOutcome {
            loaded: activities.len(),
            failed: failures.iter().map(|(source, _)| *source).collect(),
        };

        if outcome.any_loaded(self.kind) {
            for (source, error) in failures {
                self.dispatch(FeedAction::SourceFailed {
                    source,
                    message: error.to_string(),
                });
            }
            self.dispatch(FeedAction::FetchSucceeded(activities));
        } else {
            self.dispatch(FeedAction::FetchFailed(format!(
                "Gagal memuat {}: {}",
                self.kind.title(),
                describe_failures(&failures)
            )));
        }

        info!(
            loaded = outcome.loaded,
            failed = outcome.failed.len(),
            "Page refreshed"
        );
        outcome
    }

    /// Fetch every source again and merge into the held list by id
    ///
    /// Relative times and buckets of held activities are recomputed so
    /// older entries do not show stale labels. Failed sources become
    /// notifications exactly as on [`Self::refresh`].
    ///
    /// # Errors
    ///
    /// Returns the last source error if every source failed; nothing is
    /// merged in that case, the held list is left intact and an error
    /// notification is queued.
    pub async fn poll_once(&self) -> Result<RefreshOutcome> {
        let (activities, mut failures) = self.load_sources().await;
        let outcome = RefreshOutcome {
            loaded: activities.len(),
            failed: failures.iter().map(|(source, _)| *source).collect(),
        };

        if !outcome.any_loaded(self.kind) {
            self.dispatch(FeedAction::PollFailed(format!(
                "Gagal memperbarui {}: {}",
                self.kind.title(),
                describe_failures(&failures)
            )));
            return Err(failures
                .pop()
                .map_or_else(|| Error::Other("no sources configured".to_string()), |(_, error)| error));
        }

        for (source, error) in failures {
            self.dispatch(FeedAction::SourceFailed {
                source,
                message: error.to_string(),
            });
        }
        self.dispatch(FeedAction::BatchMerged(activities));
        let mut state = self.state.write();
        self.normalizer.refresh_display(state.activities_mut());
        drop(state);

        Ok(outcome)
    }

    async fn load_sources(&self) -> (Vec<NormalizedActivity>, Vec<(SourceKind, Error)>) {
        let mut activities = Vec::new();
        let mut failures = Vec::new();

        for &source in self.kind.sources() {
            match self.load_source(source).await {
                Ok(batch) => activities.extend(batch),
                Err(error) => {
                    warn!(source = %source, error = %error, "Source failed to load");
                    failures.push((source, error));
                }
            }
        }

        (activities, failures)
    }

    async fn load_source(&self, source: SourceKind) -> Result<Vec<NormalizedActivity>> {
        let raw = self.fetcher.fetch(source, &self.query).await?;
        Ok(self.normalizer.normalize(&raw, source)?)
    }
}

fn describe_failures(failures: &[(SourceKind, Error)]) -> String {
    failures
        .iter()
        .map(|(source, error)| format!("{source}: {error}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl<C: Clock> std::fmt::Debug for PageController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("kind", &self.kind)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
