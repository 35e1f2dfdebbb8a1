//! State transition history tracking.
//!
//! The machine appends one record per real state change made by a trigger.
//! Terminal fixed-point reports and `set_state` calls are not recorded.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use pollfsm::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "pending",
///     to: "running",
///     timestamp: Some(Utc::now()),
///     attempt: 4,
/// };
/// assert_eq!(transition.attempt, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred; `None` if the wall clock was unreadable
    pub timestamp: Option<DateTime<Utc>>,
    /// How many evaluations it took, counted since the previous change
    pub attempt: usize,
}

/// Ordered history of state transitions.
///
/// # Example
///
/// ```rust
/// use pollfsm::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::new();
/// history.record(StateTransition {
///     from: 'a',
///     to: 'b',
///     timestamp: Some(Utc::now()),
///     attempt: 1,
/// });
/// history.record(StateTransition {
///     from: 'b',
///     to: 'c',
///     timestamp: Some(Utc::now()),
///     attempt: 1,
/// });
///
/// assert_eq!(history.get_path(), vec![&'a', &'b', &'c']);
///
/// history.retain_last(1);
/// assert_eq!(history.get_path(), vec![&'b', &'c']);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateHistory<S: State> {
    transitions: VecDeque<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: VecDeque::new(),
        }
    }

    /// Append a transition.
    pub fn record(&mut self, transition: StateTransition<S>) {
        self.transitions.push_back(transition);
    }

    /// Drop the oldest records until at most `limit` remain.
    pub fn retain_last(&mut self, limit: usize) {
        while self.transitions.len() > limit {
            self.transitions.pop_front();
        }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first transition, then the `to`
    /// state of each transition in order. Empty when nothing was recorded.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` if there are no transitions, if either end has no
    /// timestamp, or if the wall clock moved backwards between them.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.front()?.timestamp?;
        let last = self.transitions.back()?.timestamp?;
        last.signed_duration_since(first).to_std().ok()
    }

    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    /// Get all transitions in the order they happened.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
