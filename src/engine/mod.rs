//! The polling state machine engine.
//!
//! # Key Concepts
//!
//! - **Registration**: edges `source -> target` guarded by a predicate
//! - **Evaluation**: [`StateMachine::try_trigger`] checks the current state's
//!   predicates once and moves only when exactly one holds
//! - **Waiting**: `trigger` and `timed_trigger` repeat that evaluation,
//!   pausing between attempts according to a [`PollStrategy`]

mod clock;
mod error;
mod machine;
mod poll;
mod transition;

pub use clock::{Clock, MonotonicClock, WallClock};
pub use error::{RegistrationError, TriggerError, TriggerResult};
pub use machine::{StateMachine, DEFAULT_HISTORY_LIMIT};
pub use poll::{PollStrategy, Poller};
pub use transition::{Edge, StepResult, TimedOutcome};
