//! Core state machine types.
//!
//! This module contains the building blocks the engine is assembled from:
//! - State identity via the `State` trait
//! - Zero-argument transition predicates
//! - The in/out degree summary used for terminal detection
//! - Transition history

mod history;
mod predicate;
mod state;
mod topology;

pub use history::{StateHistory, StateTransition};
pub use predicate::Predicate;
pub use state::State;
pub use topology::{Degree, Topology};
