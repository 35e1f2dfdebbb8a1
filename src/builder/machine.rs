//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{Predicate, State};
use crate::engine::{PollStrategy, StateMachine};

/// Builder for constructing state machines with a fluent API.
///
/// Registration is checked as each transition is added, so a rejected edge
/// is reported at the call that introduced it.
pub struct StateMachineBuilder<S: State> {
    machine: StateMachine<S>,
    initial: Option<S>,
}

impl<S: State> StateMachineBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new(),
            initial: None,
        }
    }

    /// Set the initial state. Optional: `set_state` can be called later.
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Add a guarded transition.
    pub fn transition<P>(mut self, from: S, to: S, predicate: P) -> Result<Self, BuildError>
    where
        P: Into<Predicate>,
    {
        self.machine.register_transition(from, to, predicate)?;
        Ok(self)
    }

    /// Add a transition that fires as soon as its source is current.
    pub fn always(self, from: S, to: S) -> Result<Self, BuildError> {
        self.transition(from, to, Predicate::always())
    }

    /// Set how blocking triggers wait between attempts.
    pub fn poll(mut self, strategy: PollStrategy) -> Self {
        self.machine.set_poll_strategy(strategy);
        self
    }

    /// Cap how many transitions the history keeps. Zero disables recording.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.machine.set_history_limit(limit);
        self
    }

    /// Build the state machine.
    pub fn build(self) -> Result<StateMachine<S>, BuildError> {
        if self.machine.transition_count() == 0 {
            return Err(BuildError::NoTransitions);
        }

        let mut machine = self.machine;
        if let Some(initial) = self.initial {
            machine.set_state(initial);
        }
        Ok(machine)
    }
}

impl<S: State> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
