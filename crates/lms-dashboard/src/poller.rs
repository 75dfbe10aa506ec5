//! Background polling of a page

use crate::pages::PageController;
use chrono::{DateTime, Utc};
use lms_protocol::Clock;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::broadcast, task::JoinHandle, time::interval};
use tracing::{debug, error, info, warn};

/// Shortest period a poller accepts
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Counters kept by a running poller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollerStats {
    /// Polls that merged at least one source
    pub polls: u64,
    /// Polls where every source failed
    pub failures: u64,
    /// Completion time of the last poll, read from the page's clock
    pub last_poll: Option<DateTime<Utc>>,
    /// Message of the last failure
    pub last_error: Option<String>,
}

/// Re-fetches a page on a fixed interval until stopped
///
/// Each tick merges the fetched batch into the page state by id. A tick that
/// fails entirely is counted and leaves an error notification on the page;
/// the held list stays as it was.
#[derive(Debug)]
pub struct Poller<C: Clock + 'static> {
    controller: Arc<PageController<C>>,
    period: Duration,
    stats: Arc<RwLock<PollerStats>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl<C: Clock + 'static> Poller<C> {
    /// Create a poller for `controller` ticking every `period`
    ///
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    #[must_use]
    pub fn new(controller: Arc<PageController<C>>, period: Duration) -> Self {
        if period < MIN_PERIOD {
            warn!(requested = ?period, "Poll period too short, using minimum");
        }
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            controller,
            period: period.max(MIN_PERIOD),
            stats: Arc::new(RwLock::new(PollerStats::default())),
            shutdown_tx,
        }
    }

    /// Effective tick period
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> PollerStats {
        self.stats.read().clone()
    }

    /// Spawn the polling task; the first poll happens immediately
    pub fn start(&self) -> JoinHandle<()> {
        let controller = Arc::clone(&self.controller);
        let stats = Arc::clone(&self.stats);
        let period = self.period;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!(page = %controller.kind(), period_secs = period.as_secs(), "Starting poller");

        tokio::spawn(async move {
            let mut interval = interval(period);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let result = controller.poll_once().await;
                        let mut s = stats.write();
                        s.last_poll = Some(controller.now());
                        match result {
                            Ok(outcome) => {
                                s.polls += 1;
                                debug!(loaded = outcome.loaded, failed = outcome.failed.len(), "Poll merged");
                            }
                            Err(e) => {
                                s.failures += 1;
                                error!(error = %e, "Poll failed");
                                s.last_error = Some(e.to_string());
                            }
                        }
                        drop(s);
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Poller shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Signal the polling task to stop
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
