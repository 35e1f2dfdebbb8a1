//! Outgoing edges and the results a single evaluation can produce.

use crate::core::{Predicate, State};

/// An outgoing edge: the target state and the predicate guarding it.
///
/// The source is implied by which list the edge lives in.
#[derive(Debug)]
pub struct Edge<S: State> {
    pub to: S,
    pub predicate: Predicate,
}

impl<S: State> Edge<S> {
    pub fn new(to: S, predicate: Predicate) -> Self {
        Self { to, predicate }
    }

    /// Check if this edge may fire right now
    pub fn is_enabled(&self) -> bool {
        self.predicate.check()
    }
}

/// Result of one non-blocking evaluation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult<S: State> {
    /// The machine is now in `to`. For a terminal state `from == to`.
    Transitioned { from: S, to: S },

    /// No predicate held; the state is unchanged
    Unchanged,
}

impl<S: State> StepResult<S> {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }

    pub fn into_change(self) -> Option<(S, S)> {
        match self {
            Self::Transitioned { from, to } => Some((from, to)),
            Self::Unchanged => None,
        }
    }
}

/// Result of a deadline-bounded trigger
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimedOutcome<S: State> {
    Transitioned { from: S, to: S },

    /// The deadline passed without a change
    TimedOut,

    /// The clock could not be read, so elapsed time is unknown
    ClockUnavailable,
}

impl<S: State> TimedOutcome<S> {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }
}
