//! Errors reported by registration and trigger evaluation.

use std::fmt::Debug;
use thiserror::Error;

/// Why a transition registration was refused.
///
/// Rejection is an ordinary outcome: the table is left untouched and the
/// caller decides whether it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Source and target are the same state")]
    SelfLoop,

    #[error("A transition between these states is already registered")]
    Duplicate,
}

/// Configuration errors found while evaluating the current state.
///
/// Neither goes away by polling again, so the blocking and timed triggers
/// return them immediately instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError<S: Debug> {
    /// The machine was triggered before `set_state` was ever called.
    #[error("State machine has no current state; call set_state first")]
    Uninitialized,

    /// The current state has no outgoing edges and is not a known terminal.
    #[error("Current state {state:?} has no registered transitions")]
    InvalidState { state: S },

    /// Two or more predicates of the current state were satisfied at once.
    #[error("Ambiguous transition from {state:?}: predicates for {targets:?} all hold")]
    AmbiguousTransition { state: S, targets: Vec<S> },
}

pub type TriggerResult<T, S> = Result<T, TriggerError<S>>;
