//! Time sources for deadline-bounded triggers.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A readable clock. Reading may fail; callers treat failure as "time unknown".
pub trait Clock {
    type Instant: PartialOrd;

    fn now(&self) -> Option<Self::Instant>;

    /// Time left from `now` until `deadline`; zero once it has passed.
    fn remaining(&self, now: &Self::Instant, deadline: &Self::Instant) -> Duration;
}

/// Monotonic process clock backed by [`std::time::Instant`]. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    type Instant = Instant;

    fn now(&self) -> Option<Instant> {
        Some(Instant::now())
    }

    fn remaining(&self, now: &Instant, deadline: &Instant) -> Duration {
        deadline.saturating_duration_since(*now)
    }
}

/// Wall clock in UTC.
///
/// Unavailable when the system time is set before the Unix epoch or beyond
/// what `chrono` can represent.
#[derive(Clone, Copy, Debug, Default)]
pub struct WallClock;

impl Clock for WallClock {
    type Instant = DateTime<Utc>;

    fn now(&self) -> Option<DateTime<Utc>> {
        let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        let secs = i64::try_from(since_epoch.as_secs()).ok()?;
        DateTime::from_timestamp(secs, since_epoch.subsec_nanos())
    }

    fn remaining(&self, now: &DateTime<Utc>, deadline: &DateTime<Utc>) -> Duration {
        deadline
            .signed_duration_since(*now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
