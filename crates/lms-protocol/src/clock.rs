//! Injected source of "now"
//!
//! The normalizer never reads the wall clock directly; it asks a [`Clock`].
//! Production code passes [`SystemClock`], tests pass a [`FixedClock`].

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Capability that yields the current instant
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Freeze time at `instant`
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).single();
        let clock = FixedClock::new(instant.unwrap_or_default());
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_shared_clock_delegates() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).single().unwrap_or_default();
        let shared: Arc<dyn Clock> = Arc::new(FixedClock::new(instant));
        assert_eq!(shared.now(), instant);
        assert_eq!((&shared).now(), instant);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let first = SystemClock.now();
        let second = SystemClock.now();
        assert!(second >= first);
    }
}
