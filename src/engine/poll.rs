//! How the blocking triggers wait between evaluations.
//!
//! Waiting is always cooperative: the calling thread re-evaluates the
//! predicates itself, there is no notification mechanism. The strategy only
//! decides how much CPU is given up between attempts.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wait policy between two evaluations of a blocking or timed trigger.
///
/// Deserializable so it can live in the embedding application's config:
///
/// ```rust
/// use pollfsm::engine::PollStrategy;
///
/// let strategy: PollStrategy =
///     serde_json::from_str(r#"{"kind": "backoff", "initial_us": 50, "max_us": 5000}"#).unwrap();
/// assert_eq!(
///     strategy,
///     PollStrategy::Backoff { initial_us: 50, max_us: 5000 }
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollStrategy {
    /// Give up the rest of the time slice
    #[default]
    Yield,

    /// Busy-wait with a spin-loop hint
    Spin,

    /// Sleep a fixed interval
    Sleep { interval_us: u64 },

    /// Sleep, doubling the interval after every miss up to `max_us`.
    ///
    /// The first sleep is `initial_us` clamped to `1..=max_us`, so a zero
    /// initial interval still grows.
    Backoff { initial_us: u64, max_us: u64 },
}

impl PollStrategy {
    pub fn sleep(interval: Duration) -> Self {
        Self::Sleep {
            interval_us: duration_to_micros(interval),
        }
    }

    pub fn backoff(initial: Duration, max: Duration) -> Self {
        Self::Backoff {
            initial_us: duration_to_micros(initial),
            max_us: duration_to_micros(max),
        }
    }

    /// Fresh wait state for one blocking call.
    pub fn poller(&self) -> Poller {
        Poller {
            strategy: *self,
            next_delay: match *self {
                Self::Sleep { interval_us } => Duration::from_micros(interval_us),
                Self::Backoff { initial_us, max_us } => {
                    Duration::from_micros(initial_us.max(1).min(max_us))
                }
                Self::Yield | Self::Spin => Duration::ZERO,
            },
            waits: 0,
        }
    }
}

fn duration_to_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Per-call wait state derived from a [`PollStrategy`].
#[derive(Clone, Debug)]
pub struct Poller {
    strategy: PollStrategy,
    next_delay: Duration,
    waits: usize,
}

impl Poller {
    /// Block the current thread according to the strategy.
    pub fn wait(&mut self) {
        self.wait_at_most(Duration::MAX);
    }

    /// Like [`wait`](Self::wait), but never sleeps longer than `limit`.
    ///
    /// Backoff still advances as if the full interval had been slept.
    pub fn wait_at_most(&mut self, limit: Duration) {
        self.waits += 1;
        match self.strategy {
            PollStrategy::Yield => std::thread::yield_now(),
            PollStrategy::Spin => std::hint::spin_loop(),
            PollStrategy::Sleep { .. } => std::thread::sleep(self.next_delay.min(limit)),
            PollStrategy::Backoff { max_us, .. } => {
                std::thread::sleep(self.next_delay.min(limit));
                let max = Duration::from_micros(max_us);
                self.next_delay = self.next_delay.saturating_mul(2).min(max);
            }
        }
    }

    /// Delay the next `wait` will sleep for; zero for yield and spin.
    pub fn next_delay(&self) -> Duration {
        self.next_delay
    }

    pub fn waits(&self) -> usize {
        self.waits
    }
}
