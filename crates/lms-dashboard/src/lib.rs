//! LMS admin activity dashboard
//!
//! Fetches audit-log, enrollment and completion lists from the LMS backend,
//! normalizes them through [`lms_protocol`] and keeps one reducer-driven
//! [`state::FeedState`] per page. Pages can be rendered to the terminal,
//! polled in the background or exported as CSV/JSON.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod export;
pub mod pages;
pub mod poller;
pub mod render;
pub mod state;

pub use api_client::{ActivityFetcher, ApiClient, ListQuery};
pub use export::ExportFormat;
pub use pages::{PageController, PageKind, RefreshOutcome};
pub use poller::{Poller, PollerStats};
pub use state::{FeedAction, FeedState, Notification, NotificationLevel};

use lms_core::Config;
use lms_protocol::{Normalizer, SystemClock};
use std::sync::Arc;

/// Build a controller for `page` from configuration
///
/// On the user-activity page `actor` filters the feed by display name and
/// `user_id` is sent to the backend so it can pre-filter. Other pages ignore
/// both.
#[must_use]
pub fn controller_for(
    page: PageKind,
    config: &Config,
    fetcher: Arc<dyn ActivityFetcher>,
    actor: Option<&str>,
    user_id: Option<&str>,
) -> PageController<SystemClock> {
    let normalizer = Normalizer::new(SystemClock, config.time_display());
    let mut query = ListQuery::with_limit(config.feed.page_size);
    if let (PageKind::UserActivityLog, Some(user_id)) = (page, user_id) {
        query = query.for_user(user_id);
    }

    PageController::new(page, fetcher, normalizer)
        .with_query(query)
        .with_filter(page.default_filter(actor))
        .with_recent_limit(config.feed.recent_limit)
}
