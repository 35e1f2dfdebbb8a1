//! Edge-count summary of the transition graph.
//!
//! Terminal states are derived from this summary rather than flagged by the
//! caller: a state is terminal exactly when it is known and nothing leaves it.

use super::state::State;
use std::collections::HashMap;

/// Number of registered edges entering and leaving a state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Degree {
    pub incoming: usize,
    pub outgoing: usize,
}

impl Degree {
    pub fn is_terminal(&self) -> bool {
        self.outgoing == 0
    }
}

/// In/out degree of every state that appears on at least one edge.
///
/// The summary is only updated through [`Topology::add_edge`], so it mirrors
/// the accepted edge set exactly.
#[derive(Clone, Debug)]
pub struct Topology<S: State> {
    degrees: HashMap<S, Degree>,
}

impl<S: State> Default for Topology<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Topology<S> {
    pub fn new() -> Self {
        Self {
            degrees: HashMap::new(),
        }
    }

    /// Account for an accepted `source -> target` edge.
    pub fn add_edge(&mut self, source: &S, target: &S) {
        self.degrees.entry(source.clone()).or_default().outgoing += 1;
        self.degrees.entry(target.clone()).or_default().incoming += 1;
    }

    pub fn degree(&self, state: &S) -> Option<Degree> {
        self.degrees.get(state).copied()
    }

    /// Known and without outgoing edges. Unknown states are not terminal.
    pub fn is_terminal(&self, state: &S) -> bool {
        self.degrees
            .get(state)
            .is_some_and(|degree| degree.is_terminal())
    }

    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.degrees.keys()
    }

    pub fn terminal_states(&self) -> impl Iterator<Item = &S> {
        self.degrees
            .iter()
            .filter(|(_, degree)| degree.is_terminal())
            .map(|(state, _)| state)
    }

    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }
}
